//! Environment-driven configuration
//!
//! Values are read after `.env` has been loaded by the binary.
//!
//! - `PORT` - Server port number (default: 8080)
//! - `DATABASE_URL` - Path to the redb file (default: "videos.db")
//! - `RUST_LOG` - Log filter (default: `video_api=debug,tower_http=debug`)

use std::env;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE_URL: &str = "videos.db";
pub const DEFAULT_LOG_FILTER: &str = "video_api=debug,tower_http=debug";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. An unparsable
    /// port falls back to the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .and_then(|port| port.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        Self { port, database_url }
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
