use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_PORTAL_URL: &str = "https://lms-tokyo.iput.ac.jp/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Config file not found, a template was written to {0}")]
    TemplateCreated(PathBuf),
    #[error("Config is incomplete: {0}")]
    Incomplete(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub portal: PortalConfig,
    pub google: GoogleConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortalConfig {
    #[serde(default = "default_portal_url")]
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoogleConfig {
    pub client_secret: PathBuf,
    pub token_cache: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarConfig {
    pub id: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            id: "primary".to_string(),
        }
    }
}

fn default_portal_url() -> String {
    DEFAULT_PORTAL_URL.to_string()
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_toml(&std::fs::read_to_string(path)?)?,
            None => {
                let config_path = Self::config_path();
                if !config_path.exists() {
                    Self::default().save_to(&config_path)?;
                    return Err(ConfigError::TemplateCreated(config_path));
                }
                Self::from_toml(&std::fs::read_to_string(&config_path)?)?
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lms-deadline-sync")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.portal.username.is_empty() || self.portal.password.is_empty() {
            return Err(ConfigError::Incomplete(
                "portal.username and portal.password must be set".to_string(),
            ));
        }

        if self.portal.keywords.is_empty() {
            return Err(ConfigError::Incomplete(
                "portal.keywords needs at least one keyword".to_string(),
            ));
        }

        // An empty keyword would match every event title.
        if self.portal.keywords.iter().any(|k| k.is_empty()) {
            return Err(ConfigError::Incomplete(
                "portal.keywords must not contain empty strings".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = Self::config_dir();

        Self {
            portal: PortalConfig {
                base_url: default_portal_url(),
                username: String::new(),
                password: String::new(),
                keywords: vec!["課題".to_string(), "レポート".to_string()],
            },
            google: GoogleConfig {
                client_secret: config_dir.join("client_secret.json"),
                token_cache: config_dir.join("token.json"),
            },
            calendar: CalendarConfig::default(),
        }
    }
}
