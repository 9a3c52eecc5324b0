//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，会话层与入口统一返回 `Result<T, AppError>`。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `PasteError`、`ImageError`、`std::io::Error` 提供 `From` 转换，无需手动 map。

use crate::clipboard::PasteError;
use crate::image_handler::ImageError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 粘贴接入失败（无条目 / 无文件 / 读取失败等）
    #[error("{0}")]
    Paste(#[from] PasteError),

    /// 图片处理流水线错误（解码 / 变换 / 编码）
    #[error("{0}")]
    Image(#[from] ImageError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 设置文件无法解析或取值非法
    #[error("设置无效: {0}")]
    Settings(String),

    /// 页面输出位置不可用
    #[error("输出位置不可用: {0}")]
    Storage(String),
}
