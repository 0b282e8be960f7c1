//! Server settings
//!
//! Loaded with the `config` crate from `SERVER_HOST`, `SERVER_PORT` and
//! `AUTH_EXCLUDE_PATHS` (comma separated), on top of built-in defaults.
//! Token and storage settings come from [`AppConfig`].

use std::collections::HashMap;

use ::config::{Config, ConfigError, Environment};
use serde::Deserialize;
use tk_shared::config::AppConfig;

use crate::routes::PUBLIC_PATHS;

/// HTTP listener and route exclusion settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path fragments served without authentication
    pub exclude_paths: Vec<String>,
}

impl ServerConfig {
    /// Load from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load from `vars` instead of the process environment when given
    pub fn load_from(vars: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("exclude_paths", PUBLIC_PATHS.to_vec())?
            .add_source(
                Environment::with_prefix("SERVER")
                    .try_parsing(true)
                    .source(vars.clone()),
            )
            .add_source(
                Environment::with_prefix("AUTH")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("exclude_paths")
                    .source(vars),
            )
            .build()?
            .try_deserialize::<Self>()
            .map(|mut config| {
                config.exclude_paths = config
                    .exclude_paths
                    .into_iter()
                    .map(|path| path.trim().to_string())
                    .filter(|path| !path.is_empty())
                    .collect();
                config
            })
    }

    /// Address to bind
    pub fn bind_address(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

/// Complete settings of the demo server
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub app: AppConfig,
    pub server: ServerConfig,
}

impl ApiConfig {
    /// Load everything from the environment
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            app: AppConfig::from_env()?,
            server: ServerConfig::load()?,
        })
    }
}
