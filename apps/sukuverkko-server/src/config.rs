//! Server configuration loaded from environment variables and an optional
//! config file.
//!
//! Environment variables (all prefixed with `SUKUVERKKO_`):
//!
//! | Variable                            | Default                     | Description                |
//! |---------------------------------------|------------------------------|-----------------------------|
//! | `SUKUVERKKO_HOST`                     | `0.0.0.0`                    | Bind address                |
//! | `SUKUVERKKO_PORT`                     | `8080`                       | Bind port                   |
//! | `SUKUVERKKO_SOURCE_PATH`              | `source.txt`                 | Path to the source compendium |
//! | `SUKUVERKKO_CACHE_DIR`                | platform cache dir           | Persistent cache directory  |
//! | `SUKUVERKKO_EXTRACTOR_BASE_URL`       | `https://api.openai.com/v1`  | Structured extractor endpoint |
//! | `SUKUVERKKO_EXTRACTOR_API_KEY`        | (required)                   | Bearer token for the extractor |
//! | `SUKUVERKKO_EXTRACTOR_MODEL`          | `gpt-4o-mini`                | Model name                  |
//! | `SUKUVERKKO_EXTRACTOR_TIMEOUT_SECONDS`| `120`                        | Request timeout             |
//! | `SUKUVERKKO_LOG_LEVEL`                | `info`                       | Tracing filter              |
//! | `SUKUVERKKO_CORS_ORIGIN`              | `*`                          | Allowed CORS origin         |
//!
//! An optional config file can be placed at `sukuverkko.toml` in the
//! working directory. Environment variables always override file values.

use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_source_path")]
    pub source_path: String,

    pub cache_dir: Option<String>,

    #[serde(default = "default_extractor_base_url")]
    pub extractor_base_url: String,

    pub extractor_api_key: Option<String>,

    #[serde(default = "default_extractor_model")]
    pub extractor_model: String,

    #[serde(default = "default_extractor_timeout_seconds")]
    pub extractor_timeout_seconds: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_source_path() -> String {
    "source.txt".to_string()
}

fn default_extractor_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_extractor_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_extractor_timeout_seconds() -> u64 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl ServerConfig {
    /// Load configuration from an optional `sukuverkko.toml` file and
    /// environment variables prefixed with `SUKUVERKKO_`.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("sukuverkko").required(false))
            .add_source(
                Environment::with_prefix("SUKUVERKKO")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
