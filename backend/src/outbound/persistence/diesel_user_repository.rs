//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Rows are converted through the validated domain constructors, so a
//! corrupted name, email or status surfaces as a query error rather than an
//! invalid [`User`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, User, UserId, UserName, UserStatus};

use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the roster repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserPersistenceError::connection(message)
        }
    }
}

/// Translate a Diesel failure on the `users` table.
///
/// Only a dropped connection is retryable; everything else is a query
/// error. Driver detail stays in the debug log.
fn map_diesel_error(error: DieselError) -> UserPersistenceError {
    match error {
        DieselError::NotFound => UserPersistenceError::query("record not found"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            debug!(message = info.message(), "users table connection closed");
            UserPersistenceError::connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            debug!(message = info.message(), "duplicate user row");
            UserPersistenceError::query("user id already exists")
        }
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "users table statement failed");
            UserPersistenceError::query("database error")
        }
        other => {
            debug!(error = %other, "users table operation failed");
            UserPersistenceError::query("database query error")
        }
    }
}

/// Convert a database row into a validated domain user.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let UserRow {
        id,
        name,
        email,
        status,
        created_at,
    } = row;

    let invalid = |err: crate::domain::UserValidationError| {
        UserPersistenceError::query(format!("user {id}: {err}"))
    };

    Ok(User::restore(
        UserId::from_uuid(id),
        UserName::new(name).map_err(invalid)?,
        Email::new(email).map_err(invalid)?,
        status.parse::<UserStatus>().map_err(invalid)?,
        created_at,
    ))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            id: *user.id().as_uuid(),
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            status: user.status().as_str(),
            created_at: user.created_at(),
        };

        diesel::insert_into(users::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .order((users::created_at.asc(), users::id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn mark_generated(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(
            users::table.filter(
                users::id
                    .eq(id.as_uuid())
                    .and(users::status.eq(UserStatus::Ungenerated.as_str())),
            ),
        )
        .set(users::status.eq(UserStatus::Generated.as_str()))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        if updated > 0 {
            return Ok(());
        }

        // Nothing moved: either the row is gone or another request won.
        let exists: bool = diesel::select(diesel::dsl::exists(
            users::table.filter(users::id.eq(id.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        if exists {
            Err(UserPersistenceError::already_generated(id.to_string()))
        } else {
            Err(UserPersistenceError::not_found(id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion edge cases.

    use chrono::Utc;
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    use super::*;

    #[fixture]
    fn valid_row() -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            name: "Ana".to_owned(),
            email: "a@x.com".to_owned(),
            status: "ungenerated".to_owned(),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(repo_err, UserPersistenceError::Connection { .. }));
        assert!(repo_err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn missing_row_maps_to_query_error() {
        let repo_err = map_diesel_error(DieselError::NotFound);

        assert!(matches!(repo_err, UserPersistenceError::Query { .. }));
        assert!(repo_err.to_string().contains("record not found"));
    }

    #[rstest]
    fn duplicate_id_maps_to_query_error() {
        let repo_err = map_diesel_error(DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates unique constraint".to_owned()),
        ));

        assert!(matches!(repo_err, UserPersistenceError::Query { .. }));
        assert!(repo_err.to_string().contains("already exists"));
    }

    #[rstest]
    fn closed_connection_maps_to_connection_error() {
        let repo_err = map_diesel_error(DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection".to_owned()),
        ));

        assert!(matches!(repo_err, UserPersistenceError::Connection { .. }));
    }

    #[rstest]
    fn row_conversion_keeps_every_field(valid_row: UserRow) {
        let expected_id = valid_row.id;
        let expected_created = valid_row.created_at;

        let user = row_to_user(valid_row).expect("valid row converts");

        assert_eq!(user.id().as_uuid(), &expected_id);
        assert_eq!(user.name().as_ref(), "Ana");
        assert_eq!(user.email().as_ref(), "a@x.com");
        assert_eq!(user.status(), UserStatus::Ungenerated);
        assert_eq!(user.created_at(), expected_created);
    }

    #[rstest]
    #[case("generated", UserStatus::Generated)]
    #[case("ungenerated", UserStatus::Ungenerated)]
    fn row_conversion_reads_status_text(
        mut valid_row: UserRow,
        #[case] stored: &str,
        #[case] expected: UserStatus,
    ) {
        valid_row.status = stored.to_owned();
        let user = row_to_user(valid_row).expect("known status converts");
        assert_eq!(user.status(), expected);
    }

    #[rstest]
    fn row_conversion_rejects_unknown_status(mut valid_row: UserRow) {
        valid_row.status = "archived".to_owned();

        let error = row_to_user(valid_row).expect_err("unknown status should fail");
        assert!(matches!(error, UserPersistenceError::Query { .. }));
        assert!(error.to_string().contains("archived"));
    }

    #[rstest]
    fn row_conversion_rejects_blank_email(mut valid_row: UserRow) {
        valid_row.email = "   ".to_owned();

        let error = row_to_user(valid_row).expect_err("blank email should fail");
        assert!(matches!(error, UserPersistenceError::Query { .. }));
        assert!(error.to_string().contains("email is empty"));
    }
}
