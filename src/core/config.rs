use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::core::ai_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::core::papers::DEFAULT_PAPERS_URL;
use crate::ui::theme::Theme;

pub const CONFIG_DIR_ENV: &str = "QUANTOPTIK_CONFIG_DIR";

/// Keys accepted by `quantoptik set` / `quantoptik unset`.
pub const CONFIG_KEYS: &[&str] = &["base-url", "model", "papers-url", "theme"];

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Chat API base URL; requests go to `<base_url>/chat/completions`
    pub base_url: Option<String>,
    pub model: Option<String>,
    /// Paper search endpoint queried by `papers`
    pub papers_url: Option<String>,
    /// Accent color at startup (green, amber, blue)
    pub theme: Option<String>,
}

/// Errors that can occur when loading or editing configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse the configuration file as valid TOML.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    UnknownKey(String),
    InvalidValue {
        key: &'static str,
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Failed to read config at {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Failed to parse config at {}: {}", path.display(), source)
            }
            ConfigError::UnknownKey(key) => write!(
                f,
                "Unknown config key: {key} (expected one of: {})",
                CONFIG_KEYS.join(", ")
            ),
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {key}: {value}")
            }
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn StdError>> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path(config_path: &Path) -> Result<Config, Box<dyn StdError>> {
        if !config_path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), Box<dyn StdError>> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    pub fn save_to_path(&self, config_path: &Path) -> Result<(), Box<dyn StdError>> {
        let parent = config_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());
        if let Some(dir) = parent {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new()?,
        };
        temp_file.write_all(contents.as_bytes())?;
        temp_file.as_file_mut().sync_all()?;
        temp_file
            .persist(config_path)
            .map_err(|err| -> Box<dyn StdError> { Box::new(err) })?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf, Box<dyn StdError>> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir).join("config.toml"));
        }
        let proj_dirs = ProjectDirs::from("org", "quantoptik", "quantoptik")
            .ok_or("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "base-url" => self.base_url = Some(value.to_string()),
            "model" => self.model = Some(value.to_string()),
            "papers-url" => self.papers_url = Some(value.to_string()),
            "theme" => {
                let theme = Theme::parse(value).ok_or_else(|| ConfigError::InvalidValue {
                    key: "theme",
                    value: value.to_string(),
                })?;
                self.theme = Some(theme.id().to_string());
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn unset(&mut self, key: &str) -> Result<(), ConfigError> {
        match key {
            "base-url" => self.base_url = None,
            "model" => self.model = None,
            "papers-url" => self.papers_url = None,
            "theme" => self.theme = None,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn papers_url(&self) -> &str {
        self.papers_url.as_deref().unwrap_or(DEFAULT_PAPERS_URL)
    }

    pub fn theme(&self) -> Theme {
        Theme::from_arg(self.theme.as_deref())
    }

    pub fn print_all(&self) {
        fn show(value: &Option<String>) -> &str {
            value.as_deref().unwrap_or("(unset)")
        }
        println!("Current configuration:");
        println!("  base-url: {}", show(&self.base_url));
        println!("  model: {}", show(&self.model));
        println!("  papers-url: {}", show(&self.papers_url));
        println!("  theme: {}", show(&self.theme));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from_path(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.papers_url(), DEFAULT_PAPERS_URL);
        assert_eq!(config.theme(), Theme::Green);
    }

    #[test]
    fn save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sub").join("config.toml");

        let mut config = Config::default();
        config.set("model", "deepseek-reasoner").unwrap();
        config.set("theme", "amber").unwrap();
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.model(), "deepseek-reasoner");
        assert_eq!(loaded.theme(), Theme::Amber);
        assert!(loaded.base_url.is_none());
    }

    #[test]
    fn set_rejects_unknown_keys_and_themes() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("colour", "green"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            config.set("theme", "purple"),
            Err(ConfigError::InvalidValue { key: "theme", .. })
        ));
        assert!(config.theme.is_none());
    }

    #[test]
    fn unset_clears_value() {
        let mut config = Config::default();
        config.set("base-url", "http://localhost:8080/v1").unwrap();
        assert_eq!(config.base_url(), "http://localhost:8080/v1");
        config.unset("base-url").unwrap();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn parse_error_mentions_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "model = [").unwrap();

        let err = Config::load_from_path(&path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config at"));
    }
}
