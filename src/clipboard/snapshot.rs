//! 系统剪贴板快照
//!
//! # 设计思路
//!
//! 监听器收到“剪贴板变化”后调用 `capture_paste_event`，用 `arboard` 读取当前内容并转成 `PasteEvent`：
//! - 位图 → 文件类条目（RGBA 像素先编码为 PNG）
//! - 文本 → 字符串类条目
//! - 文本中的 `file://` 行（文件管理器复制文件时常见）→ 指向本地路径的文件类条目
//!
//! 无法打开剪贴板时返回不带条目列表的事件，由接入层报告 `NoItemsFound`。

use std::io::Cursor;
use std::path::PathBuf;

use image::{ImageFormat, RgbaImage};

use super::{Blob, ClipboardItem, PasteEvent};
use crate::image_handler::ImageError;

const FILE_URI_PREFIX: &str = "file://";

/// 读取系统剪贴板，生成一次粘贴事件。
pub fn capture_paste_event() -> PasteEvent {
    let mut clipboard = match arboard::Clipboard::new() {
        Ok(clipboard) => clipboard,
        Err(err) => {
            log::error!("打开系统剪贴板失败：{}", err);
            return PasteEvent { items: None };
        }
    };

    let mut items = Vec::new();

    match clipboard.get_image() {
        Ok(image_data) => match encode_clipboard_image(image_data) {
            Ok(png) => items.push(ClipboardItem::file("image/png", Some(Blob::Bytes(png)))),
            Err(err) => log::warn!("⚠️ 剪贴板位图编码失败：{}", err),
        },
        Err(arboard::Error::ContentNotAvailable) => {}
        Err(err) => log::debug!("读取剪贴板位图失败：{}", err),
    }

    if let Ok(text) = clipboard.get_text() {
        items.extend(file_uri_items(&text));
        items.push(ClipboardItem::text(text));
    }

    log::debug!("📸 剪贴板快照包含 {} 个条目", items.len());
    PasteEvent::new(items)
}

/// 将剪贴板中的 RGBA 位图编码为 PNG 字节。
fn encode_clipboard_image(image_data: arboard::ImageData<'_>) -> Result<Vec<u8>, ImageError> {
    let width = image_data.width as u32;
    let height = image_data.height as u32;
    let image = RgbaImage::from_raw(width, height, image_data.bytes.into_owned())
        .ok_or_else(|| ImageError::InvalidFormat("创建图像缓冲区失败".to_string()))?;

    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| ImageError::Encode(format!("剪贴板位图编码失败：{}", e)))?;

    Ok(cursor.into_inner())
}

/// 从文本中提取 `file://` 行，每行生成一个文件类条目。
///
/// 无法还原为本地绝对路径的行（`file://` 后为空、`file://localhost/...` 等）
/// 没有可用的文件引用，对应条目的 blob 为 `None`。
pub fn file_uri_items(text: &str) -> Vec<ClipboardItem> {
    text.lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix(FILE_URI_PREFIX))
        .map(|path| ClipboardItem::file("", normalize_local_path(path).map(Blob::Path)))
        .collect()
}

fn normalize_local_path(raw: &str) -> Option<PathBuf> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    // file:///C:/a.png -> C:/a.png
    #[cfg(target_os = "windows")]
    let value = if value.starts_with('/') && value.chars().nth(2) == Some(':') {
        value.trim_start_matches('/')
    } else {
        value
    };

    let path = PathBuf::from(value);
    path.is_absolute().then_some(path)
}
