//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types. Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module, connections come from a `bb8` pool through
//! `diesel-async`, and every database error is mapped onto
//! [`UserPersistenceError`](crate::domain::ports::UserPersistenceError).
//!
//! # Example
//!
//! ```ignore
//! use roster::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! run_pending_migrations("postgres://localhost/roster").await?;
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/roster")).await?;
//! let repo = DieselUserRepository::new(pool);
//! ```

mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
