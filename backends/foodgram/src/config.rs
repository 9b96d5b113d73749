use serde::Deserialize;
use std::path::PathBuf;

/// Service configuration, read from the environment (and an optional `.env`).
#[derive(Clone, Debug, Deserialize)]
pub struct Configuration {
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,
    #[serde(default = "default_db_workers")]
    pub db_workers: usize,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// HMAC secret shared with the identity provider that issues tokens
    pub jwt_secret: String,
    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl Configuration {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_db_workers() -> usize {
    4
}

fn default_bind_address() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8000
}

fn default_media_root() -> PathBuf {
    PathBuf::from("media")
}

fn default_page_size() -> i64 {
    6
}
