//! Roster user model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier was blank.
    #[error("user id must not be empty")]
    EmptyId,
    /// The identifier was not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// The name was blank.
    #[error("name is empty")]
    EmptyName,
    /// The email was blank.
    #[error("email is empty")]
    EmptyEmail,
    /// The stored status text is not a known lifecycle state.
    #[error("unknown user status `{value}`")]
    UnknownStatus {
        /// The rejected value.
        value: String,
    },
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from its textual form.
    ///
    /// # Errors
    /// Returns [`UserValidationError::EmptyId`] or
    /// [`UserValidationError::InvalidId`].
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let text = id.as_ref();
        if text.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if text.trim() != text {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(text)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID, typically one read back from storage.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

macro_rules! required_text {
    ($(#[$meta:meta])* $name:ident, $empty:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and construct the value, trimming surrounding whitespace.
            ///
            /// # Errors
            #[doc = concat!("Returns [`UserValidationError::", stringify!($empty), "`] for blank input.")]
            pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
                let raw: String = value.into();
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(UserValidationError::$empty);
                }
                Ok(Self(trimmed.to_owned()))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = UserValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

required_text! {
    /// Display name of a roster member.
    UserName, EmptyName
}

required_text! {
    /// Contact email of a roster member.
    ///
    /// Only presence is enforced; the roster does not validate mailbox syntax.
    Email, EmptyEmail
}

/// Document lifecycle of a user.
///
/// Transitions only `Ungenerated -> Generated`, once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// No document has been produced yet.
    Ungenerated,
    /// The user's document has been produced and downloaded.
    Generated,
}

impl UserStatus {
    /// Persisted text form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ungenerated => "ungenerated",
            Self::Generated => "generated",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = UserValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ungenerated" => Ok(Self::Ungenerated),
            "generated" => Ok(Self::Generated),
            other => Err(UserValidationError::UnknownStatus {
                value: other.to_owned(),
            }),
        }
    }
}

/// Roster member.
///
/// ## Invariants
/// - `name` and `email` are non-empty once trimmed.
/// - `status` never moves back to [`UserStatus::Ungenerated`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    name: UserName,
    email: Email,
    status: UserStatus,
    created_at: DateTime<Utc>,
}

impl User {
    /// Register a new roster member. Status always starts ungenerated.
    #[must_use]
    pub const fn register(id: UserId, name: UserName, email: Email, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            email,
            status: UserStatus::Ungenerated,
            created_at,
        }
    }

    /// Rebuild a user from persisted parts.
    #[must_use]
    pub const fn restore(
        id: UserId,
        name: UserName,
        email: Email,
        status: UserStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            status,
            created_at,
        }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub const fn name(&self) -> &UserName {
        &self.name
    }

    /// Contact email.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Document lifecycle state.
    #[must_use]
    pub const fn status(&self) -> UserStatus {
        self.status
    }

    /// Creation timestamp (UTC).
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether a document may still be generated for this user.
    #[must_use]
    pub const fn is_ungenerated(&self) -> bool {
        matches!(self.status, UserStatus::Ungenerated)
    }
}

/// Validated input for creating a roster member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Display name.
    pub name: UserName,
    /// Contact email.
    pub email: Email,
}

impl NewUser {
    /// Validate raw form input. Email is checked before name, matching the
    /// order in which the create form reports problems.
    ///
    /// # Errors
    /// Returns the first [`UserValidationError`] found.
    pub fn try_from_parts(name: &str, email: &str) -> Result<Self, UserValidationError> {
        let checked_email = Email::new(email)?;
        let checked_name = UserName::new(name)?;
        Ok(Self {
            name: checked_name,
            email: checked_email,
        })
    }
}
