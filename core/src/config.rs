//! Environment-driven configuration for the `mesto` binary.

use std::env;
use std::path::PathBuf;

use tracing::info;

pub const DEFAULT_API_URL: &str = "https://mesto.nomoreparties.co/v1/cohort-42";
pub const DEFAULT_AUTH_URL: &str = "https://auth.nomoreparties.co";
pub const DEFAULT_TOKEN_FILE: &str = ".mesto/storage.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub auth_url: String,
    /// Static token for the resource API, used until a session provides one.
    pub api_token: Option<String>,
    pub token_file: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        Self {
            api_url: try_load("MESTO_API_URL", DEFAULT_API_URL),
            auth_url: try_load("MESTO_AUTH_URL", DEFAULT_AUTH_URL),
            api_token: env::var("MESTO_API_TOKEN").ok().filter(|t| !t.is_empty()),
            token_file: PathBuf::from(try_load("MESTO_TOKEN_FILE", DEFAULT_TOKEN_FILE)),
        }
    }
}

fn try_load(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}
