//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `ImageConfig`，保证运行时行为可观测、可调整、可测试。
//! 资源上限在解码前后两次生效；灰度策略决定第二张输出图使用哪种变换。

use super::GrayscaleStrategy;

/// 图片处理配置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageConfig {
    /// 单个粘贴文件允许的最大体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 灰度输出使用的变换策略。
    pub grayscale_strategy: GrayscaleStrategy,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            grayscale_strategy: GrayscaleStrategy::StandardLuma,
        }
    }
}
