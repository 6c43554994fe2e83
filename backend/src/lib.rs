//! User roster service: HTML pages, spreadsheet export and per-user
//! document generation over PostgreSQL.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use domain::TraceId;
pub use middleware::Trace;
