//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入”和“流水线中间结果”解耦：
//! - `RawImageData` 表示已从 Data URL 解出但未解码的字节
//! - `ImageData` 表示从绘图表面读回的 RGBA 像素
//! - `RenderedPaste` 表示一次粘贴的两张输出图

use chrono::{DateTime, Local};

use super::GrayscaleStrategy;

/// 加载阶段输出：原始字节与声明的 MIME。
pub(crate) struct RawImageData {
    /// 原始图片字节。
    pub(crate) bytes: Vec<u8>,
    /// Data URL 中声明的 MIME（用于日志与诊断）。
    pub(crate) mime: String,
}

/// 绘图表面读回的像素数据。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    /// RGBA 字节数组（`width * height * 4`），行优先。
    pub data: Vec<u8>,
}

/// 一次粘贴的渲染结果：原图副本 + 灰度图，均为自包含的 PNG Data URL。
#[derive(Debug, Clone)]
pub struct RenderedPaste {
    pub width: u32,
    pub height: u32,
    pub original_data_url: String,
    pub grayscale_data_url: String,
    pub strategy: GrayscaleStrategy,
    pub created_at: DateTime<Local>,
}
