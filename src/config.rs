use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_SERVER_PRESET: &str = "node-server";
pub const DEFAULT_DATABASE_PATH: &str = "storefront.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid APP_ENV value: {0} (expected development, production or test)")]
    InvalidRuntimeMode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeMode {
    Development,
    #[default]
    Production,
    Test,
}

impl RuntimeMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }

    /// Log filter used when `RUST_LOG` is not set.
    #[must_use]
    pub const fn default_log_filter(self) -> &'static str {
        match self {
            Self::Development => "debug",
            Self::Production | Self::Test => "info",
        }
    }
}

impl FromStr for RuntimeMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            _ => Err(ConfigError::InvalidRuntimeMode(value.to_string())),
        }
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub runtime_mode: RuntimeMode,
    pub server_preset: String,
    pub database_path: PathBuf,
    pub bind_addr: String,
}

impl Config {
    /// Load `.env` (if present) and resolve settings from the process environment.
    ///
    /// Must run before the database client is constructed; everything that
    /// opens a connection takes its path from the returned value.
    ///
    /// # Errors
    /// Returns `ConfigError` if `APP_ENV` holds an unknown mode.
    pub fn load() -> Result<Self, ConfigError> {
        // Variables already present in the process take precedence over the file.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve settings through an arbitrary lookup, applying defaults for unset keys.
    ///
    /// # Errors
    /// Returns `ConfigError` if `APP_ENV` holds an unknown mode.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let runtime_mode = match non_empty("APP_ENV") {
            Some(value) => value.parse()?,
            None => RuntimeMode::default(),
        };

        Ok(Self {
            runtime_mode,
            server_preset: non_empty("SERVER_PRESET")
                .unwrap_or_else(|| DEFAULT_SERVER_PRESET.to_string()),
            database_path: non_empty("DATABASE_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH), PathBuf::from),
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }

    #[must_use]
    pub fn with_database_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.database_path = path;
        }
        self
    }
}
