//! Configuration resolution for moodlens-ai
//!
//! Settings come from command-line arguments, environment variables and the TOML file.
//! Per setting, the first source that provides a valid value wins.

use moodlens_common::config::{RootFolderInitializer, TomlConfig};
use moodlens_common::{Error, Result, ThematicConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::services::album_source::GRAPH_API_BASE_URL;
use crate::services::photo_pipeline::DEFAULT_MAX_CONCURRENT_PHOTOS;
use crate::services::vision_client::VISION_ENDPOINT;

pub const VISION_API_KEY_ENV: &str = "MOODLENS_VISION_API_KEY";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Fully resolved service settings
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub root_folder: PathBuf,
    pub database_path: PathBuf,
    pub temp_dir: PathBuf,
    pub media_dir: PathBuf,
    /// Base of durable photo URLs handed to the vision service
    pub public_base_url: String,
    pub graph_api_base_url: String,
    pub vision_endpoint: String,
    pub vision_api_key: String,
    pub max_concurrent_photos: usize,
    pub http_timeout: Duration,
    pub thematic: ThematicConfig,
}

impl ServiceConfig {
    /// Combine the resolved root folder, port and TOML settings
    pub fn resolve(root_folder: PathBuf, port: u16, toml_config: &TomlConfig) -> Result<Self> {
        let initializer = RootFolderInitializer::new(root_folder.clone());

        let public_base_url = toml_config
            .public_base_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", port));

        let max_concurrent_photos = match toml_config.max_concurrent_photos {
            Some(0) => {
                warn!("max_concurrent_photos = 0 is not usable, using 1");
                1
            }
            Some(n) => n,
            None => DEFAULT_MAX_CONCURRENT_PHOTOS,
        };

        let thematic = toml_config.thematic_config();
        if thematic.is_empty() {
            warn!("No thematic categories configured; every photo will be Uncategorized");
        }

        Ok(Self {
            port,
            database_path: initializer.database_path(),
            temp_dir: toml_config
                .temp_dir
                .clone()
                .unwrap_or_else(|| initializer.temp_dir()),
            media_dir: initializer.media_dir(),
            root_folder,
            public_base_url,
            graph_api_base_url: toml_config
                .graph_api_base_url
                .clone()
                .unwrap_or_else(|| GRAPH_API_BASE_URL.to_string()),
            vision_endpoint: toml_config
                .vision_endpoint
                .clone()
                .unwrap_or_else(|| VISION_ENDPOINT.to_string()),
            vision_api_key: resolve_vision_api_key(toml_config)?,
            max_concurrent_photos,
            http_timeout: Duration::from_secs(
                toml_config
                    .http_timeout_secs
                    .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            ),
            thematic,
        })
    }
}

/// Resolve the vision API key
///
/// **Priority:** ENV → TOML
pub fn resolve_vision_api_key(toml_config: &TomlConfig) -> Result<String> {
    let env_key = std::env::var(VISION_API_KEY_ENV).ok();
    let toml_key = toml_config.vision_api_key.as_ref();

    let env_valid = env_key.as_deref().is_some_and(is_valid_key);
    let toml_valid = toml_key.is_some_and(|k| is_valid_key(k));

    if env_valid && toml_valid {
        warn!("Vision API key found in environment and TOML. Using environment (highest priority).");
    }

    if let Some(key) = env_key.filter(|k| is_valid_key(k)) {
        info!("Vision API key loaded from environment variable");
        return Ok(key);
    }

    if let Some(key) = toml_key.filter(|k| is_valid_key(k)) {
        info!("Vision API key loaded from TOML config");
        return Ok(key.clone());
    }

    Err(Error::Config(format!(
        "Vision API key not configured. Please configure using one of:\n\
         1. Environment: {}=your-key-here\n\
         2. TOML config: ~/.config/moodlens/config.toml (vision_api_key = \"your-key\")",
        VISION_API_KEY_ENV
    )))
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("abc"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
    }

    #[test]
    fn test_resolve_applies_defaults() {
        // Key from TOML so the test does not depend on the environment
        let toml = TomlConfig {
            vision_api_key: Some("toml-key".to_string()),
            ..Default::default()
        };

        let config = ServiceConfig::resolve(PathBuf::from("/srv/moodlens"), 3001, &toml).unwrap();

        assert_eq!(config.database_path, PathBuf::from("/srv/moodlens/moodlens.db"));
        assert_eq!(config.temp_dir, PathBuf::from("/srv/moodlens/tmp"));
        assert_eq!(config.media_dir, PathBuf::from("/srv/moodlens/media"));
        assert_eq!(config.public_base_url, "http://localhost:3001");
        assert_eq!(config.graph_api_base_url, GRAPH_API_BASE_URL);
        assert_eq!(config.max_concurrent_photos, DEFAULT_MAX_CONCURRENT_PHOTOS);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.thematic, ThematicConfig::default());
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let toml = TomlConfig {
            vision_api_key: Some("toml-key".to_string()),
            max_concurrent_photos: Some(0),
            ..Default::default()
        };

        let config = ServiceConfig::resolve(PathBuf::from("/srv/moodlens"), 3001, &toml).unwrap();

        assert_eq!(config.max_concurrent_photos, 1);
    }
}
