//! Configuration management for the nsdrop file server
//!
//! Values are layered, later sources winning:
//! built-in defaults, an optional `config.toml` in the working directory,
//! `NSDROP_*` environment variables, and finally the plain `PORT` variable.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_UPLOAD_ROOT: &str = "./uploads";
const DEFAULT_METADATA_ROOT: &str = "./metadata";

const CONFIG_FILE: &str = "config";
const ENV_PREFIX: &str = "NSDROP";
const PORT_ENV: &str = "PORT";

/// Server configuration, loaded once at startup
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// IP address to bind the HTTP listener
    pub bind_address: String,

    /// Listening port. Environment: PORT
    pub port: u16,

    /// Root of the file content tree
    pub upload_root: String,

    /// Root of the password tree
    pub metadata_root: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            upload_root: DEFAULT_UPLOAD_ROOT.to_string(),
            metadata_root: DEFAULT_METADATA_ROOT.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(CONFIG_FILE, std::env::var(PORT_ENV).ok())
    }

    /// Load configuration from `config_path` (extension optional, file optional),
    /// with `port_override` standing in for the `PORT` variable.
    pub fn load_from(config_path: &str, port_override: Option<String>) -> Result<Self, ConfigError> {
        // An empty PORT behaves as if it were unset
        let port_override = port_override.filter(|p| !p.trim().is_empty());

        let settings = Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("upload_root", DEFAULT_UPLOAD_ROOT)?
            .set_default("metadata_root", DEFAULT_METADATA_ROOT)?
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .set_override_option("port", port_override)?
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.upload_root.trim().is_empty() {
            return Err(ConfigError::Message("upload_root cannot be empty".into()));
        }

        if self.metadata_root.trim().is_empty() {
            return Err(ConfigError::Message("metadata_root cannot be empty".into()));
        }

        // Passwords would be served as file content if either tree held the other
        let upload = lexical_absolute(&self.upload_root_path())?;
        let metadata = lexical_absolute(&self.metadata_root_path())?;
        if upload.starts_with(&metadata) || metadata.starts_with(&upload) {
            return Err(ConfigError::Message(format!(
                "upload_root ({}) and metadata_root ({}) must not overlap",
                self.upload_root, self.metadata_root
            )));
        }

        Ok(())
    }

    /// Get bind address and port as socket address
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Get upload root as PathBuf
    pub fn upload_root_path(&self) -> PathBuf {
        PathBuf::from(&self.upload_root)
    }

    /// Get metadata root as PathBuf
    pub fn metadata_root_path(&self) -> PathBuf {
        PathBuf::from(&self.metadata_root)
    }
}

/// Absolute form of `path` with `.` and `..` resolved textually.
/// Symlinks are not followed; the roots may not exist yet.
fn lexical_absolute(path: &Path) -> Result<PathBuf, ConfigError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| ConfigError::Message(format!("cannot resolve working directory: {}", e)))?;
        cwd.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}
