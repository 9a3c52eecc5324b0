//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载“解码 → 绘制 → 变换 → 编码”链路中的所有错误来源，
//! 避免字符串拼接式错误处理。通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。

/// 图片处理统一错误类型。
///
/// 该类型会在会话层被上转为 `AppError`。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("解码错误：{0}")]
    Decode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("绘图表面不可用：{0}")]
    Surface(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("后台任务失败：{0}")]
    Task(String),
}

impl ImageError {
    /// 稳定的错误码，便于日志检索。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::InvalidFormat(_) => "invalid_format",
            Self::Encode(_) => "encode",
            Self::Surface(_) => "surface",
            Self::ResourceLimit(_) => "resource_limit",
            Self::Task(_) => "task",
        }
    }
}
