//! Application settings loaded via OrthoConfig.
//!
//! Every value may come from `ROSTER_*` environment variables, command-line
//! flags or a config file. [`AppSettings::validate`] turns the raw, optional
//! values into an [`AppConfig`] with every key present.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

/// Errors raised while loading or validating settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The configuration sources could not be read.
    #[error("failed to load configuration: {message}")]
    Load {
        /// Loader error text.
        message: String,
    },
    /// A required key is absent or blank.
    #[error("missing required setting {key}")]
    Missing {
        /// Environment variable naming the setting.
        key: &'static str,
    },
    /// The bind address is not `host:port`.
    #[error("invalid server address `{value}`: {message}")]
    InvalidAddress {
        /// Raw configured value.
        value: String,
        /// Parser error text.
        message: String,
    },
}

/// Raw settings as read from the environment, flags and config file.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ROSTER")]
pub struct AppSettings {
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Socket address the HTTP server binds to.
    pub server_address: Option<String>,
    /// Directory holding the page templates and stylesheets.
    pub static_dir: Option<PathBuf>,
    /// Directory receiving exports and generated documents.
    pub export_data_path: Option<PathBuf>,
    /// Word template used for user documents.
    pub doc_template_path: Option<PathBuf>,
}

/// Validated settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Socket address the HTTP server binds to.
    pub server_address: SocketAddr,
    /// Root of `users/*.html` and the stylesheets.
    pub static_dir: PathBuf,
    /// Export directory, created on first write.
    pub export_data_path: PathBuf,
    /// Word template for user documents.
    pub doc_template_path: PathBuf,
}

fn required_text(value: Option<String>, key: &'static str) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing { key })
}

fn required_path(value: Option<PathBuf>, key: &'static str) -> Result<PathBuf, ConfigError> {
    value
        .filter(|path| !path.as_os_str().is_empty())
        .ok_or(ConfigError::Missing { key })
}

impl AppSettings {
    /// Check that every key is present and the bind address parses.
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] found, in field order.
    pub fn validate(self) -> Result<AppConfig, ConfigError> {
        let database_url = required_text(self.database_url, "ROSTER_DATABASE_URL")?;
        let address = required_text(self.server_address, "ROSTER_SERVER_ADDRESS")?;
        let server_address =
            address
                .parse::<SocketAddr>()
                .map_err(|err| ConfigError::InvalidAddress {
                    value: address.clone(),
                    message: err.to_string(),
                })?;

        Ok(AppConfig {
            database_url,
            server_address,
            static_dir: required_path(self.static_dir, "ROSTER_STATIC_DIR")?,
            export_data_path: required_path(self.export_data_path, "ROSTER_EXPORT_DATA_PATH")?,
            doc_template_path: required_path(self.doc_template_path, "ROSTER_DOC_TEMPLATE_PATH")?,
        })
    }
}

impl AppConfig {
    /// Load settings from the process environment and arguments, then
    /// validate them.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a source cannot be read or a key is
    /// missing or malformed.
    pub fn load() -> Result<Self, ConfigError> {
        AppSettings::load_from_iter(std::env::args_os())
            .map_err(|err| ConfigError::Load {
                message: err.to_string(),
            })?
            .validate()
    }
}
