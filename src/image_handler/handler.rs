//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageHandler` 只负责流程编排与配置管理。单次粘贴的处理链路固定为：
//! 1. 读取配置快照
//! 2. 异步解码 Data URL
//! 3. 按图片原始尺寸新建绘图表面
//! 4. 恒等变换得到原图副本，再按配置的灰度策略得到灰度图
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<ImageConfig>>` 支持运行时更新（监听模式下每次粘贴前重读设置文件）。
//! - 单次请求内使用“同一配置快照”，避免处理中途配置漂移。
//! - 记录 `decode/transform/total` 阶段耗时，便于性能诊断。

use std::sync::{Arc, RwLock};
use std::time::Instant;

use chrono::Local;

use super::source::RenderedPaste;
use super::surface::{DrawingSurface, get_transformed_data_url};
use super::transform::transform_identity;
use super::{GrayscaleStrategy, ImageConfig, ImageError};

/// 图片处理器。
#[derive(Clone)]
pub struct ImageHandler {
    config: Arc<RwLock<ImageConfig>>,
}

impl ImageHandler {
    /// 根据初始配置创建处理器。
    ///
    /// # 示例
    /// ```rust
    /// use paste_luma::image_handler::{ImageConfig, ImageHandler};
    ///
    /// let handler = ImageHandler::new(ImageConfig::default());
    /// let _strategy = handler.grayscale_strategy()?;
    /// # Ok::<(), paste_luma::image_handler::ImageError>(())
    /// ```
    pub fn new(config: ImageConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// 获取配置快照，保证单次请求链路使用一致参数。
    pub fn config_snapshot(&self) -> Result<ImageConfig, ImageError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| ImageError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    /// 替换整份配置，下一次粘贴起生效；返回配置是否发生变化。
    pub fn update_config(&self, config: ImageConfig) -> Result<bool, ImageError> {
        let mut current = self
            .config
            .write()
            .map_err(|_| ImageError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        if *current == config {
            return Ok(false);
        }

        log::info!(
            "⚙️ 图片配置已更新：strategy={} maxFileSize={} maxDecodedPixels={}",
            config.grayscale_strategy.as_str(),
            config.max_file_size,
            config.max_decoded_pixels
        );
        *current = config;
        Ok(true)
    }

    /// 获取当前生效的灰度策略。
    pub fn grayscale_strategy(&self) -> Result<GrayscaleStrategy, ImageError> {
        Ok(self.config_snapshot()?.grayscale_strategy)
    }

    /// 处理主入口：解码 Data URL 并生成原图副本与灰度图。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use paste_luma::image_handler::{ImageConfig, ImageHandler};
    ///
    /// # async fn demo(data_url: String) -> Result<(), paste_luma::image_handler::ImageError> {
    /// let handler = ImageHandler::new(ImageConfig::default());
    /// let rendered = handler.render_data_url(data_url).await?;
    /// println!("{}x{}", rendered.width, rendered.height);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn render_data_url(&self, data_url: String) -> Result<RenderedPaste, ImageError> {
        let config = self.config_snapshot()?;
        let strategy = config.grayscale_strategy;
        let total_start = Instant::now();

        let decode_start = Instant::now();
        let image = Self::decode_data_url(data_url, config).await?;
        let decode_elapsed = decode_start.elapsed();

        let transform_start = Instant::now();
        let (width, height) = image.dimensions();
        let mut surface = DrawingSurface::new(width, height)?;
        let original_data_url = get_transformed_data_url(&mut surface, &image, transform_identity)?;
        let grayscale_data_url = get_transformed_data_url(&mut surface, &image, strategy.transform())?;
        let transform_elapsed = transform_start.elapsed();

        log::info!(
            "✅ 图片处理完成 - {}x{} strategy={} decode={}ms transform={}ms total={}ms",
            width,
            height,
            strategy.as_str(),
            decode_elapsed.as_millis(),
            transform_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(RenderedPaste {
            width,
            height,
            original_data_url,
            grayscale_data_url,
            strategy,
            created_at: Local::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_handler::encode_data_url;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_data_url(image: &RgbaImage) -> String {
        let mut cursor = Cursor::new(Vec::new());
        image
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("failed to encode test image");
        encode_data_url("image/png", cursor.get_ref())
    }

    #[tokio::test]
    async fn render_produces_two_distinct_outputs() {
        let handler = ImageHandler::new(ImageConfig::default());
        let image = RgbaImage::from_pixel(3, 2, Rgba([255, 0, 0, 255]));

        let rendered = handler
            .render_data_url(png_data_url(&image))
            .await
            .expect("render should succeed");

        assert_eq!((rendered.width, rendered.height), (3, 2));
        assert_eq!(rendered.strategy, GrayscaleStrategy::StandardLuma);
        assert_eq!(rendered.original_data_url, png_data_url(&image));
        assert_ne!(rendered.original_data_url, rendered.grayscale_data_url);
    }

    #[tokio::test]
    async fn render_rejects_garbage() {
        let handler = ImageHandler::new(ImageConfig::default());
        let result = handler.render_data_url("data:image/png;base64,SGVsbG8=".to_string()).await;

        assert!(matches!(result, Err(ImageError::InvalidFormat(_))));
    }

    #[test]
    fn config_update_is_visible_in_snapshot() {
        let handler = ImageHandler::new(ImageConfig::default());
        let updated = ImageConfig {
            grayscale_strategy: GrayscaleStrategy::CieLightness,
            ..ImageConfig::default()
        };

        assert!(handler.update_config(updated.clone()).expect("update failed"));
        assert!(!handler.update_config(updated).expect("update failed"));
        assert_eq!(
            handler.grayscale_strategy().expect("read failed"),
            GrayscaleStrategy::CieLightness
        );
    }

    #[tokio::test]
    async fn updated_limits_apply_to_next_render() {
        let handler = ImageHandler::new(ImageConfig::default());
        let image = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        handler
            .update_config(ImageConfig {
                max_decoded_pixels: 8,
                ..ImageConfig::default()
            })
            .expect("update failed");

        let result = handler.render_data_url(png_data_url(&image)).await;
        assert!(matches!(result, Err(ImageError::ResourceLimit(_))));
    }
}
