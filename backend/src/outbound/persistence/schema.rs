//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes the table, regenerate with `diesel print-schema` or
//! update by hand.

diesel::table! {
    /// Roster members.
    ///
    /// `status` holds `ungenerated` or `generated`.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        status -> Varchar,
        created_at -> Timestamptz,
    }
}
