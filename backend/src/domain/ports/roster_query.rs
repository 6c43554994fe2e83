//! Driving port for roster reads.
//!
//! Inbound adapters use this port to list the roster without importing
//! outbound persistence concerns.

use async_trait::async_trait;

use crate::domain::{DomainError, User};

/// Domain use-case port for listing users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RosterQuery: Send + Sync {
    /// Return every user in roster order.
    async fn list_users(&self) -> Result<Vec<User>, DomainError>;
}
