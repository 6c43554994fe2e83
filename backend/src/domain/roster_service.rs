//! Roster domain service implementing the create and list driving ports.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{RosterCommand, RosterQuery, UserPersistenceError, UserRepository};
use crate::domain::{DomainError, NewUser, User, UserId};

/// Message returned when a user's document was already produced.
pub const ALREADY_GENERATED_MESSAGE: &str = "file already generated";

/// Map repository failures onto domain errors.
pub(crate) fn map_user_persistence_error(error: UserPersistenceError) -> DomainError {
    match error {
        UserPersistenceError::Connection { message } => {
            DomainError::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            DomainError::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::NotFound { id } => DomainError::not_found(format!("user {id} not found")),
        UserPersistenceError::AlreadyGenerated { id } => already_generated(&id),
    }
}

/// Conflict returned for a second document request.
pub(crate) fn already_generated(id: &str) -> DomainError {
    DomainError::conflict(ALREADY_GENERATED_MESSAGE).with_details(json!({
        "userId": id,
        "code": "already_generated",
    }))
}

/// Roster service backed by a [`UserRepository`].
#[derive(Clone)]
pub struct RosterService<R> {
    users: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> RosterService<R> {
    /// Create a service over `users`, stamping new users with `clock`.
    #[must_use]
    pub const fn new(users: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }
}

#[async_trait]
impl<R> RosterCommand for RosterService<R>
where
    R: UserRepository,
{
    async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        let NewUser { name, email } = new_user;
        let user = User::register(UserId::random(), name, email, self.clock.utc());
        self.users
            .create(&user)
            .await
            .map_err(map_user_persistence_error)?;
        info!(user_id = %user.id(), "user registered");
        Ok(user)
    }
}

#[async_trait]
impl<R> RosterQuery for RosterService<R>
where
    R: UserRepository,
{
    async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        self.users.list().await.map_err(map_user_persistence_error)
    }
}

#[cfg(test)]
#[path = "roster_service_tests.rs"]
mod tests;
