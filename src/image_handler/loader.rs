//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 粘贴得到的是 `data:<mime>;base64,<payload>` 形式的 Data URL。
//! 本模块负责把它还原为原始字节，并在“尽可能早”的阶段执行输入校验：
//! 先按 Base64 长度估算解码体积，再解码，最后用文件签名确认确实是图片。

use base64::{Engine as _, engine::general_purpose};

use super::source::RawImageData;
use super::{ImageConfig, ImageError, ImageHandler};

const DATA_URL_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// 将字节编码为 Base64 Data URL。
///
/// # 示例
/// ```rust
/// use paste_luma::image_handler::encode_data_url;
///
/// assert_eq!(encode_data_url("image/png", b"hi"), "data:image/png;base64,aGk=");
/// ```
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!(
        "{}{}{}{}",
        DATA_URL_PREFIX,
        mime,
        BASE64_MARKER,
        general_purpose::STANDARD.encode(bytes)
    )
}

impl ImageHandler {
    /// 从 Data URL 加载图片原始字节。
    pub(super) fn load_from_data_url(
        data_url: &str,
        config: &ImageConfig,
    ) -> Result<RawImageData, ImageError> {
        let (mime, payload) = Self::split_data_url(data_url)?;
        log::debug!("📝 开始解析 Data URL - mime: {} 长度: {}", mime, payload.len());

        let estimated_len = Self::estimate_base64_decoded_upper_bound_len(payload)?;
        if estimated_len > config.max_file_size {
            return Err(ImageError::ResourceLimit(format!(
                "预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
                estimated_len as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        let bytes = general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| ImageError::Decode(format!("Base64 解码失败：{}", e)))?;
        Self::validate_image_signature(&bytes)?;

        Ok(RawImageData {
            bytes,
            mime: mime.to_string(),
        })
    }

    /// 拆分 Data URL，返回 `(mime, base64 负载)`。
    fn split_data_url(data_url: &str) -> Result<(&str, &str), ImageError> {
        let normalized = data_url.trim();
        let rest = normalized
            .strip_prefix(DATA_URL_PREFIX)
            .ok_or_else(|| ImageError::InvalidFormat("不是 Data URL".to_string()))?;
        let marker = rest
            .find(BASE64_MARKER)
            .ok_or_else(|| ImageError::InvalidFormat("缺少 base64 标记".to_string()))?;

        Ok((&rest[..marker], &rest[marker + BASE64_MARKER.len()..]))
    }

    fn estimate_base64_decoded_upper_bound_len(base64_data: &str) -> Result<u64, ImageError> {
        let len = base64_data.trim().len() as u64;
        let groups = len
            .checked_add(3)
            .ok_or_else(|| ImageError::ResourceLimit("Base64 输入长度溢出".to_string()))?
            / 4;

        groups
            .checked_mul(3)
            .ok_or_else(|| ImageError::ResourceLimit("Base64 解码体积估算溢出".to_string()))
    }

    fn validate_image_signature(bytes: &[u8]) -> Result<(), ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::InvalidFormat("图片内容为空".to_string()));
        }

        let kind = infer::get(bytes)
            .ok_or_else(|| ImageError::InvalidFormat("无法识别图片类型".to_string()))?;

        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(ImageError::InvalidFormat(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }

        Ok(())
    }
}
