//! # 色彩空间工具
//!
//! ## 设计思路
//!
//! 提供 CIE 意义下“感知明度”所需的三个纯函数：
//! sRGB 伽马值 → 线性光、线性 RGB → 亮度 Y、亮度 Y → L*。
//! 默认灰度路径不使用它们（直接按 luma 加权），
//! 仅在选择 `GrayscaleStrategy::CieLightness` 时参与计算。

/// sRGB 分段函数的线性段阈值。
pub const SRGB_LINEAR_THRESHOLD: f64 = 0.04045;
/// L* 分段函数的线性段阈值（CIE 的 216/24389 近似值）。
pub const LSTAR_LINEAR_THRESHOLD: f64 = 0.008856;

/// 将 [0, 1] 区间的 sRGB 伽马编码通道值转换为线性光。
pub fn srgb_to_linear(channel: f64) -> f64 {
    if channel <= SRGB_LINEAR_THRESHOLD {
        channel / 12.92
    } else {
        ((channel + 0.055) / 1.055).powf(2.4)
    }
}

/// 由 [0, 1] 区间的 sRGB 通道值计算相对亮度 Y（Rec.709 系数）。
pub fn rgb_to_luminance(r: f64, g: f64, b: f64) -> f64 {
    0.2126 * srgb_to_linear(r) + 0.7152 * srgb_to_linear(g) + 0.0722 * srgb_to_linear(b)
}

/// 将相对亮度 Y 转换为感知明度 L*（0 ~ 100）。
pub fn luminance_to_lstar(y: f64) -> f64 {
    if y <= LSTAR_LINEAR_THRESHOLD {
        y * 903.3
    } else {
        y.cbrt() * 116.0 - 16.0
    }
}
