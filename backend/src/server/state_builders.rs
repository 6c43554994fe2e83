//! Builders wiring adapters into the services behind the HTTP ports.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::UserRepository;
use crate::domain::{DocumentService, RosterExportService, RosterService};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::{CapStdArtifactStore, DocxTemplate, XlsxSpreadsheetEncoder};

use super::ServerConfig;

/// Build handler state around `users`, with filesystem, workbook and
/// template adapters taken from `config`.
pub fn build_http_state<R>(config: &ServerConfig, users: Arc<R>, clock: Arc<dyn Clock>) -> HttpState
where
    R: UserRepository + 'static,
{
    let artifacts = Arc::new(CapStdArtifactStore::new(&config.export_dir));
    let roster = Arc::new(RosterService::new(users.clone(), clock.clone()));
    let export = Arc::new(RosterExportService::new(
        users.clone(),
        Arc::new(XlsxSpreadsheetEncoder::new()),
        artifacts.clone(),
        clock,
    ));
    let documents = Arc::new(DocumentService::new(
        users,
        Arc::new(DocxTemplate::new(&config.template_path)),
        artifacts,
    ));

    HttpState::new(HttpStatePorts {
        roster: roster.clone(),
        roster_query: roster,
        export,
        documents,
    })
}
