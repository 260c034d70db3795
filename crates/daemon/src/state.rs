use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "nouns";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_DIR_NAME: &str = "db";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port for the HTTP service
    #[serde(default = "default_port")]
    pub port: u16,
    /// Default log filter directive, overridable with RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// The configured log level, falling back to INFO when unparseable.
    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the service directory (~/.nouns)
    pub nouns_dir: PathBuf,
    /// Path to the noun database directory
    pub db_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the service directory path (custom or default ~/.nouns)
    pub fn nouns_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new service directory
    pub fn init(custom_path: Option<PathBuf>, config: Option<AppConfig>) -> Result<Self, StateError> {
        let nouns_dir = Self::nouns_dir(custom_path)?;

        if nouns_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&nouns_dir)?;

        let db_path = nouns_dir.join(DB_DIR_NAME);
        fs::create_dir_all(&db_path)?;

        let config = config.unwrap_or_default();
        let config_path = nouns_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        Ok(Self {
            nouns_dir,
            db_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the service directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let nouns_dir = Self::nouns_dir(custom_path)?;

        if !nouns_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let db_path = nouns_dir.join(DB_DIR_NAME);
        let config_path = nouns_dir.join(CONFIG_FILE_NAME);

        if !db_path.is_dir() {
            return Err(StateError::MissingFile(format!("{}/", DB_DIR_NAME)));
        }
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            nouns_dir,
            db_path,
            config_path,
            config,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("nouns directory not initialized. Run 'nouns init' first")]
    NotInitialized,

    #[error("nouns directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
