//! 剪贴板文件读取
//!
//! 把文件引用读成字节，再尽量编码为 Data URL。
//! 能确定 MIME 时得到 `ReadResult::DataUrl`；内容为空或无法确定 MIME 时
//! 只能得到原始字节 `ReadResult::ArrayBuffer`，接入层不接受这种结果。

use super::{Blob, ClipboardItem, PasteError};
use crate::image_handler::encode_data_url;

const GENERIC_MIME: &str = "application/octet-stream";

/// 一次读取的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadResult {
    DataUrl(String),
    ArrayBuffer(Vec<u8>),
}

/// 读取文件引用。
///
/// `declared_mime` 为空或为通用二进制类型时，按文件签名推断 MIME。
pub async fn read_blob(blob: &Blob, declared_mime: &str) -> Result<ReadResult, PasteError> {
    let bytes = match blob {
        Blob::Bytes(bytes) => bytes.clone(),
        Blob::Path(path) => tokio::fs::read(path)
            .await
            .map_err(|e| PasteError::ReadFailed(format!("{}：{}", path.display(), e)))?,
    };

    if bytes.is_empty() {
        return Ok(ReadResult::ArrayBuffer(bytes));
    }

    match resolve_mime(declared_mime, &bytes) {
        Some(mime) => Ok(ReadResult::DataUrl(encode_data_url(&mime, &bytes))),
        None => Ok(ReadResult::ArrayBuffer(bytes)),
    }
}

/// 将文件类条目读成 Data URL 字符串。
pub async fn read_as_data_url(item: &ClipboardItem) -> Result<String, PasteError> {
    let blob = item.get_as_file().ok_or(PasteError::BlobMissing)?;

    match read_blob(blob, &item.mime).await? {
        ReadResult::DataUrl(url) => Ok(url),
        ReadResult::ArrayBuffer(bytes) => Err(PasteError::UnsupportedResultType(format!(
            "仅得到 {} 字节的二进制数组，无法编码为字符串",
            bytes.len()
        ))),
    }
}

fn resolve_mime(declared: &str, bytes: &[u8]) -> Option<String> {
    let declared = declared.trim();
    if !declared.is_empty() && !declared.eq_ignore_ascii_case(GENERIC_MIME) {
        return Some(declared.to_string());
    }

    infer::get(bytes).map(|kind| kind.mime_type().to_string())
}
