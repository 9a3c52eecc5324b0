//! 剪贴板粘贴接入模块
//!
//! # 设计思路
//!
//! 一次“粘贴”被建模为 `PasteEvent`：它携带剪贴板条目列表（可能缺失），
//! 每个条目分为文件类（`ItemKind::File`）与字符串类（`ItemKind::String`）。
//! 接入层只做一件事：找出所有文件类条目，逐个读成 Data URL 字符串。
//!
//! # 实现思路
//!
//! - 校验类错误（无条目列表、无文件类条目）在读取任何内容之前返回，调用方据此放弃整次粘贴。
//! - 每个文件类条目独立读取，单个条目失败不影响其他条目。
//! - 所有失败都是 `PasteError` 的某个分支，交由调用方决定如何处理。
//! - 子模块按职责拆分：读取归 `reader`，系统剪贴板快照归 `snapshot`，监听归 `listener`。

pub mod listener;
mod reader;
pub mod snapshot;

use std::path::PathBuf;

pub use reader::{ReadResult, read_as_data_url, read_blob};

/// 粘贴接入错误。
#[derive(Debug, thiserror::Error)]
pub enum PasteError {
    /// 粘贴事件没有携带条目列表
    #[error("粘贴事件中没有剪贴板条目")]
    NoItemsFound,

    /// 条目列表中没有文件类条目
    #[error("剪贴板中没有文件类条目（共 {0} 个条目）")]
    NoFileItemFound(usize),

    /// 读取结果无法表示为字符串（只能得到二进制数组）
    #[error("不支持的读取结果：{0}")]
    UnsupportedResultType(String),

    /// 底层读取失败
    #[error("读取文件失败：{0}")]
    ReadFailed(String),

    /// 文件类条目没有对应的文件引用
    #[error("剪贴板条目缺少文件引用")]
    BlobMissing,
}

/// 条目类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    File,
    String,
}

/// 文件引用：内存中的字节，或磁盘上的路径。
#[derive(Debug, Clone)]
pub enum Blob {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// 单个剪贴板条目。
#[derive(Debug, Clone)]
pub struct ClipboardItem {
    pub kind: ItemKind,
    /// 声明的 MIME，可能为空。
    pub mime: String,
    blob: Option<Blob>,
    text: Option<String>,
}

impl ClipboardItem {
    /// 文件类条目。`blob` 为 `None` 表示系统声明了文件但拿不到引用。
    pub fn file(mime: impl Into<String>, blob: Option<Blob>) -> Self {
        Self {
            kind: ItemKind::File,
            mime: mime.into(),
            blob,
            text: None,
        }
    }

    /// 字符串类条目。
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::String,
            mime: "text/plain".to_string(),
            blob: None,
            text: Some(text.into()),
        }
    }

    /// 取得文件引用；字符串类条目总是返回 `None`。
    pub fn get_as_file(&self) -> Option<&Blob> {
        match self.kind {
            ItemKind::File => self.blob.as_ref(),
            ItemKind::String => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// 一次粘贴事件。
#[derive(Debug, Clone, Default)]
pub struct PasteEvent {
    /// `None` 表示平台没有提供条目列表。
    pub items: Option<Vec<ClipboardItem>>,
}

impl PasteEvent {
    pub fn new(items: Vec<ClipboardItem>) -> Self {
        Self { items: Some(items) }
    }

    /// 由本地文件路径构造粘贴事件，每个路径对应一个文件类条目。
    pub fn from_paths<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        Self::new(
            paths
                .into_iter()
                .map(|path| ClipboardItem::file("", Some(Blob::Path(path))))
                .collect(),
        )
    }
}

/// 找出事件中的全部文件类条目。
///
/// # 返回
/// - `Err(PasteError::NoItemsFound)` — 事件没有条目列表
/// - `Err(PasteError::NoFileItemFound)` — 所有条目都不是文件类
pub fn file_items(event: &PasteEvent) -> Result<Vec<&ClipboardItem>, PasteError> {
    let items = event.items.as_ref().ok_or(PasteError::NoItemsFound)?;
    log::debug!("📋 粘贴事件包含 {} 个条目", items.len());

    let files: Vec<&ClipboardItem> = items
        .iter()
        .filter(|item| item.kind == ItemKind::File)
        .collect();

    if files.is_empty() {
        return Err(PasteError::NoFileItemFound(items.len()));
    }

    Ok(files)
}

/// 接入一次粘贴：校验事件，然后把每个文件类条目读成 Data URL。
///
/// 外层 `Err` 表示整次粘贴无效；内层每个元素对应一个文件类条目的读取结果。
pub async fn ingest(event: &PasteEvent) -> Result<Vec<Result<String, PasteError>>, PasteError> {
    let files = file_items(event)?;

    let mut results = Vec::with_capacity(files.len());
    for item in files {
        let result = read_as_data_url(item).await;
        if let Err(err) = &result {
            log::warn!("⚠️ 剪贴板条目读取失败 - mime: {:?} 错误: {}", item.mime, err);
        }
        results.push(result);
    }

    Ok(results)
}
