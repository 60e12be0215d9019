use crate::error::ConfigError;
use derivative::Derivative;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_GALLERY_URL: &str = "http://localhost:3000/gallery?uploaded=true";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const DEFAULT_MAX_FILES: usize = 10;

#[derive(Clone, Derivative)]
#[derivative(Debug, Default)]
pub struct AppConfig {
    #[derivative(Default(value = "DEFAULT_API_URL.to_string()"))]
    pub api_url: String,
    #[derivative(Debug = "ignore")]
    pub token: Option<String>,
    #[derivative(Default(value = "DEFAULT_GALLERY_URL.to_string()"))]
    pub gallery_url: String,
    #[derivative(Default(value = "DEFAULT_TIMEOUT_SECS"))]
    pub timeout_secs: u64,
    #[derivative(Default(value = "DEFAULT_MAX_FILE_SIZE"))]
    pub max_file_size: u64,
    #[derivative(Default(value = "DEFAULT_MAX_FILES"))]
    pub max_files: usize,
    pub ignore_patterns: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads every `IMAGE_UPLOADER_*` setting through `lookup`, keeping defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = lookup("IMAGE_UPLOADER_API_URL") {
            config.api_url = url.trim().to_string();
        }
        config.token = lookup("IMAGE_UPLOADER_TOKEN");
        if let Some(url) = lookup("IMAGE_UPLOADER_GALLERY_URL") {
            config.gallery_url = url.trim().to_string();
        }
        if let Some(value) = lookup("IMAGE_UPLOADER_TIMEOUT_SECS") {
            config.timeout_secs = parse_number("IMAGE_UPLOADER_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = lookup("IMAGE_UPLOADER_MAX_FILE_SIZE") {
            config.max_file_size = parse_number("IMAGE_UPLOADER_MAX_FILE_SIZE", &value)?;
        }
        if let Some(value) = lookup("IMAGE_UPLOADER_MAX_FILES") {
            config.max_files = parse_number("IMAGE_UPLOADER_MAX_FILES", &value)?;
        }
        if let Some(value) = lookup("IMAGE_UPLOADER_IGNORE") {
            config.ignore_patterns = value
                .split(',')
                .map(str::trim)
                .filter(|pattern| !pattern.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_number<T: FromStr + PartialOrd + Default>(
    key: &'static str,
    value: &str,
) -> Result<T, ConfigError> {
    match value.trim().parse::<T>() {
        Ok(number) if number > T::default() => Ok(number),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}
