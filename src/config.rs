use std::{env, fs::read_to_string, path::PathBuf};

use log::{info, warn};
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5001;
const DEFAULT_DB: &str = "reviews.db";
const DEFAULT_STATIC_DIR: &str = "public";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to read {key} from {path}: {source}")]
    Secret {
        key: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub static_dir: PathBuf,
}

impl Config {
    /// Reads the process environment. Call `dotenv` first to pick up `.env`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => {
                info!("PORT not set, using default: {DEFAULT_PORT}");
                DEFAULT_PORT
            }
        };

        let db_path = match (lookup("REVIEWS_DB"), lookup("REVIEWS_DB_FILE")) {
            (Some(path), _) => path,
            (None, Some(file)) => read_secret("REVIEWS_DB_FILE", &file)?,
            (None, None) => {
                warn!("REVIEWS_DB not set, using default: {DEFAULT_DB}");
                DEFAULT_DB.to_string()
            }
        };

        let static_dir = lookup("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));

        Ok(Config {
            host,
            port,
            db_path,
            static_dir,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn read_secret(key: &'static str, path: &str) -> Result<String, ConfigError> {
    let value = read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|source| ConfigError::Secret {
            key,
            path: path.to_string(),
            source,
        })?;

    if value.is_empty() {
        return Err(ConfigError::Invalid {
            key,
            value,
            reason: format!("{path} is empty"),
        });
    }
    Ok(value)
}
