//! Configuration management

use crate::core::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub walker: WalkerConfig,
    pub cache: CacheConfig,
    pub titles: TitlesConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkerConfig {
    /// Deepest level shown before a "more" sentinel replaces a branch
    pub max_level: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum cached trees
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TitlesConfig {
    /// Locale used when the requested one has no value
    pub default_locale: String,
    /// Fields tried in order when looking for a display title
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub space_id: Option<String>,
    pub environment_id: String,
    /// Management token (overridden by REFTREE_CMA_TOKEN)
    pub token: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Link levels the API should include in the response
    pub include: u8,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            max_level: DEFAULT_MAX_LEVEL,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

impl Default for TitlesConfig {
    fn default() -> Self {
        Self {
            default_locale: "en-US".to_string(),
            fields: vec![
                "title".to_string(),
                "name".to_string(),
                "internalName".to_string(),
            ],
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.contentful.com".to_string(),
            space_id: None,
            environment_id: "master".to_string(),
            token: None,
            timeout_secs: 30,
            include: 10,
        }
    }
}

impl ApiConfig {
    /// Resolve the management token, preferring the environment
    pub fn resolved_token(&self) -> Result<String> {
        if let Ok(token) = std::env::var("REFTREE_CMA_TOKEN") {
            if !token.is_empty() {
                return Ok(token);
            }
        }
        self.token.clone().ok_or_else(|| Error::ConfigError {
            message: "No API token configured (set api.token or REFTREE_CMA_TOKEN)".to_string(),
        })
    }
}

impl Config {
    /// Load configuration from default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.walker.max_level == 0 {
            return Err(Error::ConfigError {
                message: "walker.max_level must be at least 1".to_string(),
            });
        }
        if self.api.include == 0 || self.api.include > 10 {
            return Err(Error::ConfigError {
                message: format!("api.include must be between 1 and 10 (got {})", self.api.include),
            });
        }
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = Self::reftree_home()?;
        Ok(home.join("config.toml"))
    }

    /// Get the reftree home directory
    pub fn reftree_home() -> Result<PathBuf> {
        // Check REFTREE_HOME env var first
        if let Ok(home) = std::env::var("REFTREE_HOME") {
            return Ok(PathBuf::from(home));
        }

        ProjectDirs::from("dev", "reftree", "reftree")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| Error::ConfigError {
                message: "Could not determine reftree home directory".to_string(),
            })
    }
}

/// Default number of levels rendered before the "more" sentinel
pub const DEFAULT_MAX_LEVEL: usize = 5;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.walker.max_level, DEFAULT_MAX_LEVEL);
        assert_eq!(config.cache.capacity, 64);
        assert_eq!(config.titles.default_locale, "en-US");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[walker]\nmax_level = 3\n\n[api]\nspace_id = \"abc\"").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.walker.max_level, 3);
        assert_eq!(config.api.space_id.as_deref(), Some("abc"));
        assert_eq!(config.api.environment_id, "master");
        assert_eq!(config.titles.fields[0], "title");
    }

    #[test]
    fn test_zero_max_level_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[walker]\nmax_level = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigError { .. }));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[walker\nmax_level = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::TomlParse(_)));
    }
}
