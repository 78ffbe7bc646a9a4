//! Application configuration.
//!
//! Loaded from a TOML file with environment-variable overrides
//! (NEMASCREEN_DATABASE_URL, NEMASCREEN_PORT). Every section has a
//! usable default so a bare config file still boots.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{NemascreenError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    /// Base URLs under which well images are published.
    #[serde(default)]
    pub images: ImagesConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply env overrides.
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config: AppConfig = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            toml::from_str(&raw)
                .map_err(|e| NemascreenError::Config(format!("{}: {e}", path.display())))?
        } else {
            AppConfig::default()
        };

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("NEMASCREEN_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(port) = std::env::var("NEMASCREEN_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/nemascreen".to_string(),
            max_connections: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Full-resolution microscope images (.bmp).
    pub base_url: String,
    /// Lower resolution copies (.jpg).
    pub thumbnail_base_url: String,
    /// DevStaR output overlays (res.png).
    pub devstar_base_url: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            base_url: "http://images.example.org/full".to_string(),
            thumbnail_base_url: "http://images.example.org/thumbnail".to_string(),
            devstar_base_url: "http://images.example.org/devstar".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Image wells shown per page on the score-entry interface.
    pub images_per_page: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { images_per_page: 50 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_usable() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3001);
        assert!(config.database.url.starts_with("postgres://"));
        assert_eq!(config.scoring.images_per_page, 50);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [scoring]
            images_per_page = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.scoring.images_per_page, 10);
        // Unspecified sections fall back to defaults
        assert_eq!(config.database.max_connections, 8);
    }
}
