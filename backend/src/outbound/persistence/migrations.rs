//! Embedded schema migrations applied at startup.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

/// Embedded migrations from the backend/migrations directory.
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while bringing the schema up to date.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// The migration connection could not be opened.
    #[error("failed to connect for migrations: {message}")]
    Connect {
        /// Underlying failure text.
        message: String,
    },
    /// A migration failed to apply.
    #[error("failed to apply migrations: {message}")]
    Apply {
        /// Underlying failure text.
        message: String,
    },
    /// The blocking migration task did not complete.
    #[error("migration task failed: {message}")]
    Task {
        /// Underlying failure text.
        message: String,
    },
}

fn apply(database_url: &str) -> Result<Vec<String>, MigrationError> {
    let mut conn = PgConnection::establish(database_url).map_err(|err| MigrationError::Connect {
        message: err.to_string(),
    })?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply {
            message: err.to_string(),
        })?;
    Ok(applied.iter().map(ToString::to_string).collect())
}

/// Apply every pending migration on a dedicated synchronous connection.
///
/// Diesel's migration harness is blocking, so the work runs on the blocking
/// pool.
///
/// # Errors
/// Returns [`MigrationError`] when connecting or applying fails.
pub async fn run_pending_migrations(database_url: &str) -> Result<(), MigrationError> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || apply(&url))
        .await
        .map_err(|err| MigrationError::Task {
            message: err.to_string(),
        })??;

    if applied.is_empty() {
        info!("database schema is up to date");
    } else {
        info!(migrations = ?applied, "applied database migrations");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use diesel::migration::{Migration, MigrationSource};
    use diesel::pg::Pg;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn embedded_migrations_include_the_users_table() {
        let migrations = MigrationSource::<Pg>::migrations(&MIGRATIONS)
            .expect("embedded migrations load");
        assert!(
            migrations
                .iter()
                .any(|migration| migration.name().to_string().contains("create_users"))
        );
    }

    #[tokio::test]
    async fn unreachable_database_is_a_connect_error() {
        let err = run_pending_migrations("postgres://127.0.0.1:1/roster")
            .await
            .expect_err("nothing listens on port 1");
        assert!(matches!(err, MigrationError::Connect { .. }));
    }
}
