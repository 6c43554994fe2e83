//! HTTP server configuration object.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;

/// Listener address and filesystem locations used by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) static_dir: PathBuf,
    pub(crate) export_dir: PathBuf,
    pub(crate) template_path: PathBuf,
}

impl ServerConfig {
    /// Bind to `bind_addr`; every directory defaults to the working directory.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            static_dir: PathBuf::from("."),
            export_dir: PathBuf::from("."),
            template_path: PathBuf::from("template.docx"),
        }
    }

    /// Load page templates and stylesheets from `dir`.
    #[must_use]
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = dir.into();
        self
    }

    /// Write exports and documents into `dir`.
    #[must_use]
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    /// Render user documents from the template at `path`.
    #[must_use]
    pub fn with_template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = path.into();
        self
    }

    /// Socket address the server binds to.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Directory receiving generated artifacts.
    #[must_use]
    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }
}

impl From<&AppConfig> for ServerConfig {
    fn from(config: &AppConfig) -> Self {
        Self::new(config.server_address)
            .with_static_dir(&config.static_dir)
            .with_export_dir(&config.export_data_path)
            .with_template_path(&config.doc_template_path)
    }
}
