//! # 绘图表面模块
//!
//! ## 设计思路
//!
//! `DrawingSurface` 是一块离屏 RGBA 画布，提供“绘制 → 读回 → 写回 → 编码”四个动作，
//! 变换流水线只依赖这四个动作，因此恒等变换与灰度变换走完全相同的路径。
//!
//! ## 实现思路
//!
//! - 每次渲染粘贴时新建一块表面，表面不在粘贴之间共享。
//! - `draw_image` 以替换方式写入像素（不做 source-over 混合），
//!   同一区域重复绘制时旧内容被完整覆盖。
//! - `to_data_url` 固定输出 PNG，保证像素无损往返。

use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

use super::source::ImageData;
use super::transform::BYTES_PER_PIXEL;
use super::{ImageError, encode_data_url};

const PNG_MIME: &str = "image/png";

/// 离屏绘图表面。
pub struct DrawingSurface {
    pixels: RgbaImage,
}

impl DrawingSurface {
    /// 创建指定尺寸的透明表面。
    ///
    /// 宽或高为 0、或像素字节数溢出时返回 `ImageError::Surface`。
    pub fn new(width: u32, height: u32) -> Result<Self, ImageError> {
        Self::validate_dimensions(width, height)?;
        Ok(Self {
            pixels: RgbaImage::new(width, height),
        })
    }

    /// 调整尺寸，同时清空全部像素。
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), ImageError> {
        Self::validate_dimensions(width, height)?;
        self.pixels = RgbaImage::new(width, height);
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// 在 (0, 0) 按原始尺寸绘制图片，超出表面的部分被裁掉。
    pub fn draw_image(&mut self, image: &RgbaImage) {
        image::imageops::replace(&mut self.pixels, image, 0, 0);
    }

    /// 读回整块表面的像素。
    pub fn get_image_data(&self) -> ImageData {
        ImageData {
            width: self.width(),
            height: self.height(),
            data: self.pixels.as_raw().clone(),
        }
    }

    /// 将像素数据写回表面 (0, 0) 处。
    pub fn put_image_data(&mut self, image_data: &ImageData) -> Result<(), ImageError> {
        let patch = RgbaImage::from_raw(image_data.width, image_data.height, image_data.data.clone())
            .ok_or_else(|| {
                ImageError::InvalidFormat(format!(
                    "像素数据长度与尺寸不符：{} 字节 / {}x{}",
                    image_data.data.len(),
                    image_data.width,
                    image_data.height
                ))
            })?;

        image::imageops::replace(&mut self.pixels, &patch, 0, 0);
        Ok(())
    }

    /// 将表面编码为 PNG Data URL。
    pub fn to_data_url(&self) -> Result<String, ImageError> {
        let mut cursor = Cursor::new(Vec::new());
        self.pixels
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| ImageError::Encode(format!("PNG 编码失败：{}", e)))?;

        Ok(encode_data_url(PNG_MIME, cursor.get_ref()))
    }

    fn validate_dimensions(width: u32, height: u32) -> Result<(), ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::Surface(format!("表面尺寸无效：{}x{}", width, height)));
        }

        (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL))
            .filter(|len| *len <= isize::MAX as usize)
            .map(|_| ())
            .ok_or_else(|| ImageError::Surface(format!("表面尺寸过大：{}x{}", width, height)))
    }
}

/// 在表面上绘制图片并套用像素变换，返回编码后的 Data URL。
///
/// 顺序固定为：绘制原图 → 读回像素 → 原地变换 → 写回 → 编码。
/// 源图片不会被修改；表面内容每次都被完整覆盖。
pub fn get_transformed_data_url<F>(
    surface: &mut DrawingSurface,
    image: &RgbaImage,
    transform: F,
) -> Result<String, ImageError>
where
    F: FnOnce(&mut [u8]),
{
    surface.draw_image(image);
    let mut image_data = surface.get_image_data();

    transform(&mut image_data.data);

    surface.put_image_data(&image_data)?;
    surface.to_data_url()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_handler::{transform_identity, transform_standard_luma};
    use base64::{Engine as _, engine::general_purpose};
    use image::Rgba;

    fn decode_data_url(url: &str) -> RgbaImage {
        let payload = url
            .strip_prefix("data:image/png;base64,")
            .expect("png data url expected");
        let bytes = general_purpose::STANDARD
            .decode(payload)
            .expect("base64 decode failed");
        image::load_from_memory_with_format(&bytes, ImageFormat::Png)
            .expect("png decode failed")
            .to_rgba8()
    }

    #[test]
    fn new_rejects_zero_dimensions() {
        assert!(matches!(DrawingSurface::new(0, 10), Err(ImageError::Surface(_))));
        assert!(matches!(DrawingSurface::new(10, 0), Err(ImageError::Surface(_))));
    }

    #[test]
    fn resize_clears_previous_pixels() {
        let mut surface = DrawingSurface::new(2, 2).expect("surface init failed");
        surface.draw_image(&RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 255])));

        surface.resize(3, 1).expect("resize failed");

        let data = surface.get_image_data();
        assert_eq!((data.width, data.height), (3, 1));
        assert!(data.data.iter().all(|b| *b == 0));
    }

    #[test]
    fn draw_replaces_instead_of_blending() {
        let mut surface = DrawingSurface::new(1, 1).expect("surface init failed");
        surface.draw_image(&RgbaImage::from_pixel(1, 1, Rgba([200, 10, 10, 255])));
        surface.draw_image(&RgbaImage::from_pixel(1, 1, Rgba([0, 0, 200, 64])));

        assert_eq!(surface.get_image_data().data, vec![0, 0, 200, 64]);
    }

    #[test]
    fn put_rejects_mismatched_length() {
        let mut surface = DrawingSurface::new(2, 2).expect("surface init failed");
        let bad = ImageData {
            width: 2,
            height: 2,
            data: vec![0; 15],
        };

        assert!(matches!(surface.put_image_data(&bad), Err(ImageError::InvalidFormat(_))));
    }

    #[test]
    fn identity_round_trip_is_lossless() {
        let source = RgbaImage::from_fn(5, 3, |x, y| {
            Rgba([(x * 50) as u8, (y * 80) as u8, 7, (255 - x * 30) as u8])
        });
        let mut surface = DrawingSurface::new(5, 3).expect("surface init failed");

        let url = get_transformed_data_url(&mut surface, &source, transform_identity)
            .expect("transform failed");

        assert_eq!(decode_data_url(&url), source);
    }

    #[test]
    fn transform_does_not_touch_source() {
        let source = RgbaImage::from_pixel(2, 1, Rgba([255, 0, 0, 255]));
        let mut surface = DrawingSurface::new(2, 1).expect("surface init failed");

        let url = get_transformed_data_url(&mut surface, &source, transform_standard_luma)
            .expect("transform failed");

        assert_eq!(source.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(decode_data_url(&url).get_pixel(1, 0).0, [76, 76, 76, 255]);
    }

    #[test]
    fn second_render_fully_overwrites_first() {
        let source = RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 128]));
        let mut surface = DrawingSurface::new(2, 2).expect("surface init failed");

        get_transformed_data_url(&mut surface, &source, transform_standard_luma)
            .expect("grayscale render failed");
        let url = get_transformed_data_url(&mut surface, &source, transform_identity)
            .expect("identity render failed");

        assert_eq!(decode_data_url(&url), source);
    }
}
