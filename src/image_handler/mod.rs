//! # 图片处理模块（image_handler）
//!
//! ## 设计思路
//!
//! 该模块将“Data URL 解析 → 解码 → 绘制 → 像素变换 → 编码”按职责拆分为多个子模块：
//!
//! - `handler`：编排整条处理流水线
//! - `loader`：Data URL 解析、体积与签名校验
//! - `pipeline`：解码、像素/内存上限
//! - `surface`：离屏绘图表面与通用变换流程
//! - `transform`：逐像素灰度变换与策略选择
//! - `color`：sRGB 线性化与 CIE L*
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! session.rs（一次粘贴）
//!    ↓
//! handler.rs（配置快照 + 阶段耗时日志）
//!    ├─ loader.rs + pipeline.rs（spawn_blocking 中解码）
//!    └─ surface.rs（identity / grayscale 两次变换）
//!          └─ transform.rs（像素公式）
//!    ↓
//! RenderedPaste（两张 PNG Data URL）
//! ```

pub mod color;
mod config;
mod error;
mod handler;
mod loader;
mod pipeline;
mod source;
mod surface;
mod transform;

pub use config::ImageConfig;
pub use error::ImageError;
pub use handler::ImageHandler;
pub use loader::encode_data_url;
pub use source::{ImageData, RenderedPaste};
pub use surface::{DrawingSurface, get_transformed_data_url};
pub use transform::{
    GrayscaleStrategy,
    transform_cie_lightness,
    transform_identity,
    transform_quick_lightness,
    transform_standard_luma,
};
