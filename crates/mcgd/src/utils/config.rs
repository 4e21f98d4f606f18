//! Application configuration management utilities.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;

const APP_DIR: &str = "MC Generated data";

/// Application-wide configuration stored in config.toml.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Where downloads and generator runs live, one directory per version.
    pub cache_dir: Option<Utf8PathBuf>,
    /// Parent of the default output directories.
    pub output_dir: Option<Utf8PathBuf>,
    /// Java runtime used for the data generator.
    pub java: Option<String>,
    /// Local version catalog.
    pub catalog_path: Option<Utf8PathBuf>,
}

impl AppConfig {
    pub fn cache_dir(&self) -> Utf8PathBuf {
        if let Some(dir) = &self.cache_dir {
            return dir.clone();
        }
        directories_next::ProjectDirs::from("", "", APP_DIR)
            .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.cache_dir().to_path_buf()).ok())
            .unwrap_or_else(|| temp_dir().join(APP_DIR))
    }

    pub fn output_dir(&self) -> Utf8PathBuf {
        self.output_dir.clone().unwrap_or_else(|| Utf8PathBuf::from("."))
    }

    pub fn java(&self) -> &str {
        self.java.as_deref().unwrap_or("java")
    }

    pub fn catalog_path(&self) -> Utf8PathBuf {
        self.catalog_path
            .clone()
            .unwrap_or_else(|| self.cache_dir().join("version_manifest.json"))
    }
}

fn temp_dir() -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(env::temp_dir()).unwrap_or_else(|_| Utf8PathBuf::from("."))
}

/// Returns the directory where the current executable resides.
pub fn install_dir() -> Option<Utf8PathBuf> {
    let exe = env::current_exe().ok()?;
    let parent = exe.parent()?;
    Utf8PathBuf::from_path_buf(parent.to_path_buf()).ok()
}

/// Returns the default configuration file path (config.toml next to the executable).
pub fn default_config_path() -> Option<Utf8PathBuf> {
    install_dir().map(|dir| dir.join("config.toml"))
}

/// Loads the application configuration from config.toml.
/// Returns default configuration if file doesn't exist or cannot be parsed.
pub fn load_config() -> AppConfig {
    default_config_path()
        .and_then(|path| fs::read_to_string(path.as_std_path()).ok())
        .map(|content| parse_config(&content))
        .unwrap_or_default()
}

fn parse_config(content: &str) -> AppConfig {
    match toml::from_str(content) {
        Ok(cfg) => cfg,
        Err(err) => {
            tracing::warn!("Ignoring invalid config.toml: {}", err);
            AppConfig::default()
        }
    }
}
