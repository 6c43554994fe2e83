//! Shared fixtures for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{Email, User, UserId, UserName, UserStatus};

pub(crate) const ANA_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 4, 9, 5, 42)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn user_with_status(id: &str, name: &str, status: UserStatus) -> User {
    User::restore(
        UserId::new(id).expect("fixture id"),
        UserName::new(name).expect("fixture name"),
        Email::new(format!("{}@example.com", name.to_lowercase())).expect("fixture email"),
        status,
        fixture_timestamp(),
    )
}

pub(crate) fn ana() -> User {
    user_with_status(ANA_ID, "Ana", UserStatus::Ungenerated)
}
