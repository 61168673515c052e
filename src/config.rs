// Server configuration
// Layered: defaults, optional config file, then environment variables

//! # Configuration
//!
//! Loaded in this order (later overrides earlier):
//! 1. Default values
//! 2. `fsm-workflow.toml` in the working directory (if present) or the file
//!    passed to [`ServerConfig::load_from`] (the server's `--config` flag,
//!    also read from `FSM_WORKFLOW_CONFIG`)
//! 3. Environment variables prefixed with `FSM_WORKFLOW_`, e.g.
//!    `FSM_WORKFLOW_PORT=8080`, `FSM_WORKFLOW_STORAGE=json`
//!
//! The server binary applies its command-line flags on top of the result.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_FILE: &str = "fsm-workflow";
const ENV_PREFIX: &str = "FSM_WORKFLOW";

/// Which [`crate::WorkflowStorage`] backend the server uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Everything lives in process memory
    Memory,
    /// JSON files under `data_dir`
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_enabled: bool,
    pub storage: StorageBackend,
    pub data_dir: PathBuf,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Register the document review workflow on startup
    pub seed_demo: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            cors_enabled: true,
            storage: StorageBackend::Memory,
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            seed_demo: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `path` (or the default file) and the environment
    pub fn load_from(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = Config::builder();

        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .try_parsing(true),
        );

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// `host:port` for binding the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 4000);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.bind_address(), "0.0.0.0:4000");
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "port = 8088\nstorage = \"json\"\ndata_dir = \"/tmp/fsm\"\nseed_demo = true"
        )
        .unwrap();

        let config = ServerConfig::load_from(Some(file.path())).unwrap();
        assert_eq!(config.port, 8088);
        assert_eq!(config.storage, StorageBackend::Json);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/fsm"));
        assert!(config.seed_demo);
        // untouched keys keep their defaults
        assert_eq!(config.host, "0.0.0.0");
        assert!(config.cors_enabled);
    }

    #[test]
    fn test_load_without_file_keeps_defaults() {
        let config = ServerConfig::load_from(None).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert!(!config.seed_demo);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(ServerConfig::load_from(Some(Path::new("/nonexistent/fsm.toml"))).is_err());
    }
}
