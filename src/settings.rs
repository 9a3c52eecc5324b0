//! 应用设置
//!
//! 设置文件为 JSON（camelCase 字段），路径取自环境变量 `PASTE_LUMA_SETTINGS`，
//! 未设置时使用当前目录下的 `paste-luma.json`。文件不存在时使用默认值，缺省字段同样回落到默认值。

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::clipboard::listener::CLIPBOARD_EVENT_MIN_INTERVAL_DEFAULT_MS;
use crate::error::AppError;
use crate::image_handler::{GrayscaleStrategy, ImageConfig};

pub const SETTINGS_PATH_ENV: &str = "PASTE_LUMA_SETTINGS";
pub const DEFAULT_SETTINGS_FILE: &str = "paste-luma.json";
pub const DEFAULT_OUTPUT_FILE: &str = "paste-luma.html";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// 页面快照输出路径。
    pub output_path: PathBuf,
    /// 灰度策略：`luma` / `quick` / `lightness`。
    pub grayscale_strategy: String,
    /// 剪贴板变化的最小处理间隔（毫秒）。
    pub clipboard_event_min_interval_ms: u64,
    /// 单个粘贴文件的体积上限（MB）。
    pub max_file_size_mb: u64,
    /// 解码后像素上限。
    pub max_decoded_pixels: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        let image = ImageConfig::default();
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            grayscale_strategy: image.grayscale_strategy.as_str().to_string(),
            clipboard_event_min_interval_ms: CLIPBOARD_EVENT_MIN_INTERVAL_DEFAULT_MS,
            max_file_size_mb: image.max_file_size / 1024 / 1024,
            max_decoded_pixels: image.max_decoded_pixels,
        }
    }
}

impl AppSettings {
    /// 转换为图片处理配置，灰度策略非法时返回 `AppError::Settings`。
    pub fn image_config(&self) -> Result<ImageConfig, AppError> {
        let grayscale_strategy = GrayscaleStrategy::from_str(&self.grayscale_strategy)
            .map_err(|e| AppError::Settings(e.to_string()))?;

        if self.max_file_size_mb == 0 {
            return Err(AppError::Settings("maxFileSizeMb 必须大于 0".to_string()));
        }
        if self.max_decoded_pixels == 0 {
            return Err(AppError::Settings("maxDecodedPixels 必须大于 0".to_string()));
        }

        let defaults = ImageConfig::default();
        Ok(ImageConfig {
            max_file_size: self.max_file_size_mb.saturating_mul(1024 * 1024),
            max_decoded_pixels: self.max_decoded_pixels,
            max_decoded_bytes: defaults
                .max_decoded_bytes
                .max(self.max_decoded_pixels.saturating_mul(4)),
            grayscale_strategy,
        })
    }
}

/// 设置文件路径：环境变量优先，否则为当前目录下的默认文件。
pub fn settings_file_path() -> PathBuf {
    std::env::var_os(SETTINGS_PATH_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
}

/// 从指定路径读取设置；文件不存在时返回默认设置。
pub fn load_settings_from(path: &Path) -> Result<AppSettings, AppError> {
    if !path.exists() {
        log::debug!("⚙️ 未找到设置文件 {}，使用默认设置", path.display());
        return Ok(AppSettings::default());
    }

    let content = fs::read_to_string(path)?;
    let settings = serde_json::from_str::<AppSettings>(&content)
        .map_err(|e| AppError::Settings(format!("解析设置文件 {} 失败: {}", path.display(), e)))?;

    log::info!("⚙️ 已加载设置文件 {}", path.display());
    Ok(settings)
}

pub fn load_app_settings() -> Result<AppSettings, AppError> {
    load_settings_from(&settings_file_path())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_settings_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "paste-luma-settings-{}-{}.json",
            name,
            std::process::id()
        ));
        fs::write(&path, content).expect("write settings failed");
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = PathBuf::from("/definitely/not/here/paste-luma.json");
        let settings = load_settings_from(&path).expect("defaults expected");
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn partial_file_falls_back_per_field() {
        let path = temp_settings_file("partial", r#"{ "grayscaleStrategy": "lightness" }"#);
        let settings = load_settings_from(&path).expect("load failed");
        let _ = fs::remove_file(&path);

        assert_eq!(settings.grayscale_strategy, "lightness");
        assert_eq!(settings.output_path, PathBuf::from(DEFAULT_OUTPUT_FILE));

        let config = settings.image_config().expect("config failed");
        assert_eq!(config.grayscale_strategy, GrayscaleStrategy::CieLightness);
    }

    #[test]
    fn malformed_file_is_a_settings_error() {
        let path = temp_settings_file("malformed", "{ not json");
        let result = load_settings_from(&path);
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(AppError::Settings(_))));
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let settings = AppSettings {
            grayscale_strategy: "sepia".to_string(),
            ..AppSettings::default()
        };
        assert!(matches!(settings.image_config(), Err(AppError::Settings(_))));
    }

    #[test]
    fn default_settings_match_default_image_config() {
        let config = AppSettings::default().image_config().expect("config failed");
        let defaults = ImageConfig::default();

        assert_eq!(config.max_file_size, defaults.max_file_size);
        assert_eq!(config.max_decoded_pixels, defaults.max_decoded_pixels);
        assert_eq!(config.max_decoded_bytes, defaults.max_decoded_bytes);
        assert_eq!(config.grayscale_strategy, defaults.grayscale_strategy);
    }
}
