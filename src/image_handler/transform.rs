//! # 像素变换模块
//!
//! ## 设计思路
//!
//! 变换函数只接收 RGBA 像素缓冲（`&mut [u8]`），原地修改、无状态、无返回值。
//! 每个像素独立计算，互不依赖；Alpha 通道始终保持不变。
//!
//! 写回规则与 8 位“钳制数组”一致：先钳制到 [0, 255]，再四舍六入五成双，NaN 写为 0。
//!
//! ## 灰度策略
//!
//! | 策略 | 公式 | 说明 |
//! |------|------|------|
//! | `luma` | `0.299·R + 0.587·G + 0.114·B`（归一化后计算） | 默认策略 |
//! | `quick` | `0.2126·R + 0.7152·G + 0.0722·B`（直接用 0~255） | 快速近似感知亮度 |
//! | `lightness` | `L*(Y(linear(R, G, B))) · 255 / 100` | CIE 感知明度 |

use super::color::{luminance_to_lstar, rgb_to_luminance};
use super::ImageError;

/// 每像素字节数（RGBA）。
pub const BYTES_PER_PIXEL: usize = 4;

/// 灰度变换策略。
///
/// 三种策略都保留为可选项，由配置决定使用哪一种。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrayscaleStrategy {
    #[default]
    StandardLuma,
    QuickLightness,
    CieLightness,
}

impl GrayscaleStrategy {
    /// 从外部字符串解析策略。
    ///
    /// # 示例
    /// ```rust
    /// use paste_luma::image_handler::GrayscaleStrategy;
    ///
    /// let s = GrayscaleStrategy::from_str("Quick")?;
    /// assert_eq!(s, GrayscaleStrategy::QuickLightness);
    /// # Ok::<(), paste_luma::image_handler::ImageError>(())
    /// ```
    pub fn from_str(strategy: &str) -> Result<Self, ImageError> {
        match strategy.trim().to_lowercase().as_str() {
            "luma" => Ok(Self::StandardLuma),
            "quick" => Ok(Self::QuickLightness),
            "lightness" => Ok(Self::CieLightness),
            other => Err(ImageError::InvalidFormat(format!(
                "未知灰度策略：{}（可选：luma / quick / lightness）",
                other
            ))),
        }
    }

    /// 输出稳定字符串，用于日志与页面标注。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StandardLuma => "luma",
            Self::QuickLightness => "quick",
            Self::CieLightness => "lightness",
        }
    }

    /// 取得该策略对应的变换函数。
    pub fn transform(self) -> fn(&mut [u8]) {
        match self {
            Self::StandardLuma => transform_standard_luma,
            Self::QuickLightness => transform_quick_lightness,
            Self::CieLightness => transform_cie_lightness,
        }
    }
}

/// 按 8 位钳制数组的规则把浮点值写回为字节。
pub(crate) fn clamp_to_u8(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0).round_ties_even() as u8
}

/// 逐像素把同一个灰度值写入 R、G、B，Alpha 不动。
fn map_gray<F>(data: &mut [u8], gray_of: F)
where
    F: Fn(u8, u8, u8) -> f64,
{
    for px in data.chunks_exact_mut(BYTES_PER_PIXEL) {
        let gray = clamp_to_u8(gray_of(px[0], px[1], px[2]));
        px[0] = gray;
        px[1] = gray;
        px[2] = gray;
    }
}

/// 恒等变换：不修改任何像素，用于生成原图副本。
pub fn transform_identity(_data: &mut [u8]) {}

/// 标准 luma：通道归一化到 [0, 1] 后加权求和，再放大回 [0, 255]。
pub fn transform_standard_luma(data: &mut [u8]) {
    map_gray(data, |r, g, b| {
        let r = r as f64 / 255.0;
        let g = g as f64 / 255.0;
        let b = b as f64 / 255.0;
        let luma = 0.299 * r + 0.587 * g + 0.114 * b;
        luma * 255.0
    });
}

/// 快速感知亮度：直接在 0~255 原始值上按 Rec.709 系数加权。
pub fn transform_quick_lightness(data: &mut [u8]) {
    map_gray(data, |r, g, b| {
        0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64
    });
}

/// CIE 感知明度：线性化 → 亮度 Y → L*，再把 0~100 映射到 0~255。
pub fn transform_cie_lightness(data: &mut [u8]) {
    map_gray(data, |r, g, b| {
        let y = rgb_to_luminance(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0);
        luminance_to_lstar(y) * 255.0 / 100.0
    });
}
