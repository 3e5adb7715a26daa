use shuttle_runtime::SecretStore;
use thiserror::Error;

const DEFAULT_DB_NAME: &str = "preprod";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("secret `{0}` was not found")]
    Missing(&'static str),
}

/// Runtime settings, read from `Secrets.toml`.
#[derive(Clone, Debug)]
pub struct Settings {
    pub mongodb_uri: String,
    pub database: String,
    pub jwt_secret: String,
}

impl Settings {
    pub fn from_secrets(secrets: &SecretStore) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| secrets.get(key))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Ok(Self {
            mongodb_uri: non_blank("MONGODB_URI").ok_or(ConfigError::Missing("MONGODB_URI"))?,
            database: non_blank("MONGODB_DATABASE").unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
            jwt_secret: non_blank("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
        })
    }
}
