//! Driving port for roster mutations.

use async_trait::async_trait;

use crate::domain::{DomainError, NewUser, User};

/// Domain use-case port for adding users to the roster.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RosterCommand: Send + Sync {
    /// Register a user with a fresh id, the current time and status
    /// `ungenerated`.
    async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError>;
}
