//! # 解码流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 图像 → RGBA”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先做尺寸检查，再进行完整解码，降低恶意输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸
//! 2. 按像素上限、内存上限快速拒绝
//! 3. 完整解码并转换 RGBA
//! 4. 校验字节长度一致性
//!
//! 解码是 CPU 密集操作，异步入口通过 `spawn_blocking` 放到阻塞线程池执行，
//! 调用方 `await` 得到明确的成功或失败结果。

use image::{GenericImageView, ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;

use super::source::RawImageData;
use super::transform::BYTES_PER_PIXEL;
use super::{ImageConfig, ImageError, ImageHandler};

impl ImageHandler {
    /// 异步解码 Data URL，得到原始尺寸的 RGBA 图像。
    pub(crate) async fn decode_data_url(
        data_url: String,
        config: ImageConfig,
    ) -> Result<RgbaImage, ImageError> {
        tokio::task::spawn_blocking(move || {
            let raw = Self::load_from_data_url(&data_url, &config)?;
            Self::decode_to_rgba(raw, &config)
        })
        .await
        .map_err(|e| ImageError::Task(format!("解码任务异常结束：{}", e)))?
    }

    /// 将原始字节解码为 RGBA 图像。
    pub(crate) fn decode_to_rgba(
        raw: RawImageData,
        config: &ImageConfig,
    ) -> Result<RgbaImage, ImageError> {
        let format: ImageFormat = image::guess_format(&raw.bytes)
            .map_err(|e| ImageError::InvalidFormat(format!("不支持的图片格式：{}", e)))?;

        let (header_width, header_height) = Self::inspect_dimensions_from_memory(&raw.bytes)?;
        Self::validate_pixel_limits(config, header_width, header_height)?;
        Self::validate_decoded_memory_limits(config, header_width, header_height)?;

        let decoded = image::load_from_memory_with_format(&raw.bytes, format)
            .map_err(|e| ImageError::Decode(format!("图片解码失败：{}", e)))?;

        let (width, height) = decoded.dimensions();
        Self::validate_pixel_limits(config, width, height)?;
        Self::validate_decoded_memory_limits(config, width, height)?;

        let rgba = decoded.to_rgba8();
        let expected_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL))
            .ok_or_else(|| ImageError::ResourceLimit("图片尺寸导致内存溢出风险".to_string()))?;

        if rgba.as_raw().len() != expected_len {
            return Err(ImageError::Decode("解码后像素数据长度异常".to_string()));
        }

        log::info!(
            "✅ 图片解码成功 - mime: {} 格式: {:?} 尺寸: {}x{}",
            raw.mime,
            format,
            width,
            height
        );

        Ok(rgba)
    }

    /// 仅通过内存中的图片头信息读取宽高。
    fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImageError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

        reader
            .into_dimensions()
            .map_err(|e| ImageError::InvalidFormat(format!("无法读取图片尺寸：{}", e)))
    }

    /// 校验像素数量是否超过配置上限。
    fn validate_pixel_limits(config: &ImageConfig, width: u32, height: u32) -> Result<(), ImageError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| ImageError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > config.max_decoded_pixels {
            return Err(ImageError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, config.max_decoded_pixels
            )));
        }

        Ok(())
    }

    fn validate_decoded_memory_limits(
        config: &ImageConfig,
        width: u32,
        height: u32,
    ) -> Result<(), ImageError> {
        let estimated = (width as u64)
            .checked_mul(height as u64)
            .and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL as u64))
            .ok_or_else(|| ImageError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

        if estimated > config.max_decoded_bytes {
            return Err(ImageError::ResourceLimit(format!(
                "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                config.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }
}
