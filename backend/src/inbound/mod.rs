//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! The roster is only reachable over HTTP, see [`http`].

pub mod http;
