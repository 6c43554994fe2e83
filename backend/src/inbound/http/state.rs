//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{DocumentGeneration, RosterCommand, RosterExport, RosterQuery};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Creates users.
    pub roster: Arc<dyn RosterCommand>,
    /// Lists users.
    pub roster_query: Arc<dyn RosterQuery>,
    /// Builds the roster workbook.
    pub export: Arc<dyn RosterExport>,
    /// Renders per-user documents.
    pub documents: Arc<dyn DocumentGeneration>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Creates users.
    pub roster: Arc<dyn RosterCommand>,
    /// Lists users.
    pub roster_query: Arc<dyn RosterQuery>,
    /// Builds the roster workbook.
    pub export: Arc<dyn RosterExport>,
    /// Renders per-user documents.
    pub documents: Arc<dyn DocumentGeneration>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from the ports bundle.
    #[must_use]
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            roster,
            roster_query,
            export,
            documents,
        } = ports;
        Self {
            roster,
            roster_query,
            export,
            documents,
        }
    }
}
