use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overrides the database path from the config file
pub const DATABASE_ENV: &str = "TIMEKEEPER_DB";

/// Overrides the config file location
pub const CONFIG_ENV: &str = "TIMEKEEPER_CONFIG";

/// Global configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub colors: ColorSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            list_limit: default_list_limit(),
        }
    }
}

fn default_database_path() -> String {
    "~/.timekeeper/db.json".to_string()
}

fn default_list_limit() -> usize {
    15
}

/// 256-color palette indices for each output role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSettings {
    #[serde(default = "default_muted")]
    pub muted: u8,
    #[serde(default = "default_heading")]
    pub heading: u8,
    #[serde(default = "default_accent")]
    pub accent: u8,
    #[serde(default = "default_positive")]
    pub positive: u8,
    #[serde(default = "default_negative")]
    pub negative: u8,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            muted: default_muted(),
            heading: default_heading(),
            accent: default_accent(),
            positive: default_positive(),
            negative: default_negative(),
        }
    }
}

fn default_muted() -> u8 {
    246
}

fn default_heading() -> u8 {
    15
}

fn default_accent() -> u8 {
    14
}

fn default_positive() -> u8 {
    10
}

fn default_negative() -> u8 {
    9
}

/// Configuration after environment overrides and path expansion
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub database_path: PathBuf,
    pub list_limit: usize,
    pub colors: ColorSettings,
}

impl EffectiveConfig {
    pub fn load() -> Result<Self> {
        let global = load_global_config()?;
        Self::from_global(global, std::env::var(DATABASE_ENV).ok())
    }

    fn from_global(global: GlobalConfig, database_override: Option<String>) -> Result<Self> {
        let database_path = match database_override.filter(|p| !p.is_empty()) {
            Some(path) => {
                debug!("Using database path from {}", DATABASE_ENV);
                expand_path(&path)?
            }
            None => expand_path(&global.settings.database_path)?,
        };

        Ok(Self {
            database_path,
            list_limit: global.settings.list_limit,
            colors: global.colors,
        })
    }
}

/// Get the global config file path
pub fn global_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.is_empty() {
            return expand_path(&path);
        }
    }

    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("timekeeper");
    Ok(config_dir.join("config.toml"))
}

/// Load the global configuration, falling back to defaults when the file is absent
pub fn load_global_config() -> Result<GlobalConfig> {
    let config_path = global_config_path()?;
    read_config(&config_path)
}

fn read_config(config_path: &Path) -> Result<GlobalConfig> {
    if !config_path.exists() {
        debug!("No config at {}, using defaults", config_path.display());
        return Ok(GlobalConfig::default());
    }

    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

    let config: GlobalConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

    Ok(config)
}

/// Create the config file with defaults if it does not exist yet
pub fn init_global_config() -> Result<PathBuf> {
    let config_path = global_config_path()?;
    write_default_config(&config_path)?;
    Ok(config_path)
}

fn write_default_config(config_path: &Path) -> Result<()> {
    if let Some(config_dir) = config_path.parent() {
        std::fs::create_dir_all(config_dir).with_context(|| {
            format!("Failed to create config directory: {}", config_dir.display())
        })?;
    }

    if !config_path.exists() {
        let content = toml::to_string_pretty(&GlobalConfig::default())
            .context("Failed to serialize default config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;
    }

    Ok(())
}

/// Expand ~ and environment variables in path
pub fn expand_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path)
        .with_context(|| format!("Failed to expand path: {}", path))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = GlobalConfig::default();
        assert_eq!(config.settings.list_limit, 15);
        assert_eq!(config.settings.database_path, "~/.timekeeper/db.json");
        assert_eq!(config.colors.accent, 14);
    }

    #[test]
    fn test_expand_path() {
        let expanded = expand_path("~/.timekeeper/db.json").unwrap();
        assert!(expanded.to_string_lossy().contains("/.timekeeper/db.json"));
        assert!(!expanded.to_string_lossy().starts_with("~"));
    }

    #[test]
    fn test_database_override_wins() {
        let effective =
            EffectiveConfig::from_global(GlobalConfig::default(), Some("/tmp/tk.json".to_string()))
                .unwrap();
        assert_eq!(effective.database_path, PathBuf::from("/tmp/tk.json"));

        let effective =
            EffectiveConfig::from_global(GlobalConfig::default(), Some(String::new())).unwrap();
        assert!(effective.database_path.ends_with(".timekeeper/db.json"));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[settings]\nlist_limit = 5\n\n[colors]\naccent = 33\n").unwrap();

        let config = read_config(&path).unwrap();
        assert_eq!(config.settings.list_limit, 5);
        assert_eq!(config.settings.database_path, default_database_path());
        assert_eq!(config.colors.accent, 33);
        assert_eq!(config.colors.muted, 246);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[settings\n").unwrap();
        assert!(read_config(&path).is_err());
    }

    #[test]
    fn test_write_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        write_default_config(&path).unwrap();

        let config = read_config(&path).unwrap();
        assert_eq!(config.settings.list_limit, 15);
        assert_eq!(config.colors, ColorSettings::default());
    }
}
