//! Port abstraction for roster persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// No user row carries the identifier.
        NotFound { id: String } => "user {id} not found",
        /// The user's status already left `ungenerated`.
        AlreadyGenerated { id: String } => "user {id} already has a generated document",
    }
}

/// Port for the roster table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a freshly registered user.
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Read every user, oldest first (ties broken by id).
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Move a user from `ungenerated` to `generated`.
    ///
    /// The transition is a single conditional write, so of two racing callers
    /// exactly one succeeds and the other receives
    /// [`UserPersistenceError::AlreadyGenerated`].
    async fn mark_generated(&self, id: &UserId) -> Result<(), UserPersistenceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn errors_render_identifiers() {
        let err = UserPersistenceError::already_generated("42");
        assert_eq!(err.to_string(), "user 42 already has a generated document");
        assert_eq!(
            UserPersistenceError::not_found("7").to_string(),
            "user 7 not found"
        );
    }
}
