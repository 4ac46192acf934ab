//! Configuration loading and root folder resolution

use crate::thematic::{ThematicCategory, ThematicConfig};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "MOODLENS_ROOT_FOLDER";

/// Database file created inside the root folder
pub const DATABASE_FILE_NAME: &str = "moodlens.db";

/// Logging section of the TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `MOODLENS_LOG` is not set ("error" .. "trace")
    pub level: Option<String>,
}

/// On-disk TOML configuration
///
/// Every field is optional; a missing file is equivalent to an empty one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    /// Base URL under which staged photos are reachable (e.g. `http://localhost:3001`)
    pub public_base_url: Option<String>,
    /// Directory for transient downloads; defaults to `<root>/tmp`
    pub temp_dir: Option<PathBuf>,
    pub max_concurrent_photos: Option<usize>,
    pub http_timeout_secs: Option<u64>,
    pub graph_api_base_url: Option<String>,
    pub vision_endpoint: Option<String>,
    pub vision_api_key: Option<String>,
    pub logging: LoggingConfig,
    pub thematic_categories: Option<Vec<ThematicCategory>>,
}

impl TomlConfig {
    /// Configured categories in file order, or the built-in dictionary
    pub fn thematic_config(&self) -> ThematicConfig {
        match &self.thematic_categories {
            Some(categories) => ThematicConfig::new(categories.clone()),
            None => ThematicConfig::default(),
        }
    }

    /// `[logging] level`, falling back to the compiled default
    pub fn log_level(&self, defaults: &CompiledDefaults) -> String {
        self.logging
            .level
            .as_deref()
            .map(str::trim)
            .filter(|level| !level.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| defaults.log_level.clone())
    }
}

/// Platform fallbacks used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    /// Used when neither `MOODLENS_LOG` nor `[logging] level` is set
    pub log_level: String,
    /// Used when neither `--port` nor `MOODLENS_PORT` is given
    pub port: u16,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = dirs::data_local_dir()
            .map(|d| d.join("moodlens"))
            .unwrap_or_else(|| PathBuf::from("./moodlens_data"));

        Self {
            root_folder,
            log_level: "info".to_string(),
            port: 3001,
        }
    }
}

/// Root folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. `MOODLENS_ROOT_FOLDER` environment variable
/// 3. TOML `root_folder`
/// 4. Compiled platform default
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            cli_arg: None,
            toml_root: None,
        }
    }

    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn with_toml_config(mut self, config: &TomlConfig) -> Self {
        self.toml_root = config.root_folder.clone();
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            info!(module = %self.module_name, "Root folder from command line: {}", path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                info!(module = %self.module_name, "Root folder from {}: {}", ROOT_FOLDER_ENV, path);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_root {
            info!(module = %self.module_name, "Root folder from TOML config: {}", path.display());
            return path.clone();
        }

        let default = CompiledDefaults::for_current_platform().root_folder;
        info!(module = %self.module_name, "Root folder from compiled default: {}", default.display());
        default
    }
}

/// Creates the root folder layout on startup
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        ensure_directory(&self.root_folder)
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    /// Default location for transient downloads
    pub fn temp_dir(&self) -> PathBuf {
        self.root_folder.join("tmp")
    }

    /// Local object store for staged photos
    pub fn media_dir(&self) -> PathBuf {
        self.root_folder.join("media")
    }
}

/// Create `path` (and parents) if missing; an existing non-directory is an error
pub fn ensure_directory(path: &Path) -> Result<()> {
    if path.exists() {
        if path.is_dir() {
            return Ok(());
        }
        return Err(Error::Config(format!(
            "Path exists but is not a directory: {}",
            path.display()
        )));
    }

    std::fs::create_dir_all(path)?;
    info!("Created directory: {}", path.display());
    Ok(())
}

/// `~/.config/moodlens/config.toml` (platform equivalent elsewhere)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("moodlens").join("config.toml"))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
}

/// Load the config file if present
///
/// A missing file only warns and yields defaults. A file that exists but does not parse
/// is still an error.
pub fn load_toml_config_or_default(path: Option<&Path>) -> Result<TomlConfig> {
    let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => path,
        None => {
            warn!("Could not determine config directory, using defaults");
            return Ok(TomlConfig::default());
        }
    };

    if !path.exists() {
        warn!("Config file not found: {}, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let config = load_toml_config(&path)?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}
