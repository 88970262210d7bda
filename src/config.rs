//! Service configuration
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML file
//! named by `EML2PDF_CONFIG`, `EML2PDF_*` variables (`__` separates nested
//! keys, e.g. `EML2PDF_SERVER__PORT`), then `PORT` and `WKHTMLTOPDF_PATH`.

use crate::engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_PREFIX: &str = "EML2PDF";
pub const CONFIG_PATH_VAR: &str = "EML2PDF_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub engine: EngineConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size_mb: usize,
    pub request_timeout_secs: u64,
    pub max_concurrent_conversions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_request_size_mb: 25,
            request_timeout_secs: 600,
            max_concurrent_conversions: 4,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub const fn max_request_bytes(&self) -> usize {
        self.max_request_size_mb.saturating_mul(1024 * 1024)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Extra CSS appended after the built-in stylesheet
    pub stylesheet_path: Option<PathBuf>,
}

impl Config {
    /// Load from the process environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Load with an explicit variable map in place of the process environment
    pub fn load_from(
        vars: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let lookup = |name: &str| {
            let value = match &vars {
                Some(map) => map.get(name).cloned(),
                None => std::env::var(name).ok(),
            };
            value.filter(|v| !v.is_empty())
        };

        let mut builder = config::Config::builder();

        if let Some(path) = lookup(CONFIG_PATH_VAR) {
            builder = builder.add_source(config::File::with_name(&path).required(true));
        }

        builder = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(vars.clone()),
            )
            .set_override_option("server.port", lookup("PORT"))?
            .set_override_option("engine.binary", lookup("WKHTMLTOPDF_PATH"))?;

        builder.build()?.try_deserialize()
    }

    /// Read the optional extra stylesheet
    pub fn extra_stylesheet(&self) -> std::io::Result<Option<String>> {
        self.render
            .stylesheet_path
            .as_ref()
            .map(std::fs::read_to_string)
            .transpose()
    }
}
