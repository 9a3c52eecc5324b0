//! 粘贴会话
//!
//! # 设计思路
//!
//! `PasteSession` 把接入层、图片处理与页面串起来，一次处理一个粘贴事件：
//! 1. `clipboard::ingest` 校验事件并读出每个文件的 Data URL
//! 2. `ImageHandler::render_data_url` 生成原图副本与灰度图
//! 3. 成功的结果插到页面 `content` 最前面
//!
//! 事件本身无效（无条目、无文件）时直接返回错误，页面不做任何改动；
//! 单个文件失败只记入 `PasteReport::failures`，不影响同一事件里的其他文件。

use std::time::Instant;

use crate::clipboard::{self, PasteEvent};
use crate::error::AppError;
use crate::image_handler::ImageHandler;
use crate::page::{Page, ResultContainer};
use crate::settings::AppSettings;

/// 一次粘贴的处理结果。
#[derive(Debug, Default)]
pub struct PasteReport {
    /// 成功追加到页面的结果数。
    pub rendered: usize,
    /// 读取或渲染失败的文件。
    pub failures: Vec<AppError>,
}

pub struct PasteSession {
    handler: ImageHandler,
    page: Page,
}

impl PasteSession {
    pub fn new(handler: ImageHandler, page: Page) -> Self {
        Self { handler, page }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 应用新设置：剪贴板节流间隔立即生效，图片配置从下一次粘贴起生效。
    ///
    /// 设置无效时返回 `AppError::Settings`，当前配置保持不变。
    pub fn apply_settings(&self, settings: &AppSettings) -> Result<bool, AppError> {
        let config = settings.image_config()?;
        clipboard::listener::apply_event_min_interval(settings.clipboard_event_min_interval_ms);
        Ok(self.handler.update_config(config)?)
    }

    /// 处理一次粘贴事件。
    pub async fn handle_paste(&mut self, event: PasteEvent) -> Result<PasteReport, AppError> {
        let start = Instant::now();
        let reads = clipboard::ingest(&event).await?;
        log::info!("📥 收到粘贴：{} 个文件类条目", reads.len());

        let mut report = PasteReport::default();
        for read in reads {
            let data_url = match read {
                Ok(data_url) => data_url,
                Err(err) => {
                    report.failures.push(err.into());
                    continue;
                }
            };

            match self.handler.render_data_url(data_url).await {
                Ok(rendered) => {
                    self.page.prepend(ResultContainer::from(rendered));
                    report.rendered += 1;
                }
                Err(err) => {
                    log::error!("❌ 图片处理失败 [{}]: {}", err.code(), err);
                    report.failures.push(err.into());
                }
            }
        }

        log::info!(
            "📄 粘贴处理结束 - 成功 {} 个，失败 {} 个，耗时 {}ms",
            report.rendered,
            report.failures.len(),
            start.elapsed().as_millis()
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::{Blob, ClipboardItem, PasteError};
    use crate::image_handler::{GrayscaleStrategy, ImageConfig};
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn session() -> PasteSession {
        PasteSession::new(ImageHandler::new(ImageConfig::default()), Page::new("test"))
    }

    fn png_item(color: [u8; 4]) -> ClipboardItem {
        let image = RgbaImage::from_pixel(2, 2, Rgba(color));
        let mut cursor = Cursor::new(Vec::new());
        image
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("failed to encode test image");
        ClipboardItem::file("image/png", Some(Blob::Bytes(cursor.into_inner())))
    }

    #[tokio::test]
    async fn missing_items_leave_page_untouched() {
        let mut session = session();
        let result = session.handle_paste(PasteEvent::default()).await;

        assert!(matches!(result, Err(AppError::Paste(PasteError::NoItemsFound))));
        assert!(session.page().is_empty());
    }

    #[tokio::test]
    async fn each_file_gets_its_own_container() {
        let mut session = session();
        let event = PasteEvent::new(vec![
            png_item([255, 0, 0, 255]),
            ClipboardItem::text("caption"),
            png_item([0, 0, 255, 255]),
        ]);

        let report = session.handle_paste(event).await.expect("paste should succeed");

        assert_eq!(report.rendered, 2);
        assert!(report.failures.is_empty());
        assert_eq!(session.page().len(), 2);
    }

    #[tokio::test]
    async fn failing_file_does_not_block_others() {
        let mut session = session();
        let event = PasteEvent::new(vec![
            ClipboardItem::file("image/png", Some(Blob::Bytes(b"not an image".to_vec()))),
            png_item([0, 255, 0, 255]),
            ClipboardItem::file("image/png", None),
        ]);

        let report = session.handle_paste(event).await.expect("event is valid");

        assert_eq!(report.rendered, 1);
        assert_eq!(report.failures.len(), 2);
        assert!(matches!(report.failures[0], AppError::Image(_)));
        assert!(matches!(report.failures[1], AppError::Paste(PasteError::BlobMissing)));
        assert_eq!(session.page().len(), 1);
    }

    #[tokio::test]
    async fn applied_settings_change_next_paste() {
        let mut session = session();
        let settings = AppSettings {
            grayscale_strategy: "quick".to_string(),
            ..AppSettings::default()
        };

        assert!(session.apply_settings(&settings).expect("settings are valid"));
        session
            .handle_paste(PasteEvent::new(vec![png_item([255, 0, 0, 255])]))
            .await
            .expect("paste should succeed");

        let container = session.page().containers().next().expect("container expected");
        assert_eq!(container.strategy, GrayscaleStrategy::QuickLightness);
    }

    #[tokio::test]
    async fn invalid_settings_keep_current_config() {
        let mut session = session();
        let settings = AppSettings {
            grayscale_strategy: "sepia".to_string(),
            ..AppSettings::default()
        };

        assert!(matches!(
            session.apply_settings(&settings),
            Err(AppError::Settings(_))
        ));
        session
            .handle_paste(PasteEvent::new(vec![png_item([255, 0, 0, 255])]))
            .await
            .expect("paste should succeed");

        let container = session.page().containers().next().expect("container expected");
        assert_eq!(container.strategy, GrayscaleStrategy::StandardLuma);
    }
}
