use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://toolcurator.db";
pub const DEFAULT_TOOLS_DATA_PATH: &str = "data/tools.json";
pub const DEFAULT_FAN_DATA_PATH: &str = "public/2025-04-04 3_16pm.csv";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a port number, got {value:?}")]
    InvalidPort { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub tools_data_path: PathBuf,
    pub fan_data_path: PathBuf,
    pub blog_site_url: String,
}

impl ServerConfig {
    /// Read configuration from the process environment. Call
    /// `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        // PORT wins over BACKEND_PORT
        let port = match ["PORT", "BACKEND_PORT"]
            .into_iter()
            .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()).map(|v| (key, v)))
        {
            Some((key, value)) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort { var: key, value })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: var("HOST", DEFAULT_HOST),
            port,
            database_url: var("DATABASE_URL", DEFAULT_DATABASE_URL),
            tools_data_path: PathBuf::from(var("TOOLS_DATA_PATH", DEFAULT_TOOLS_DATA_PATH)),
            fan_data_path: PathBuf::from(var("FAN_DATA_PATH", DEFAULT_FAN_DATA_PATH)),
            blog_site_url: var("BLOG_SITE_URL", services::services::blog_feed::DEFAULT_SITE_URL),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
