//! Tabular projection of the roster used by the spreadsheet export.

use chrono::SecondsFormat;

use crate::domain::User;

/// Worksheet name used for the roster export.
pub const ROSTER_SHEET_NAME: &str = "Sheet1";

/// Column headings written to row 1, left to right.
pub const ROSTER_HEADER: [&str; 5] = ["ID", "Email", "Name", "Status", "Created At"];

/// One data row: ID, Email, Name, Status, Created At.
pub type RosterRow = [String; 5];

/// Header plus one row per user, in roster order.
///
/// Rows are numbered from 1 as in a spreadsheet: row 1 is the header and the
/// user at roster index `i` lands on row `i + 2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterSheet {
    rows: Vec<RosterRow>,
}

impl RosterSheet {
    /// Project users into sheet rows without reordering them.
    #[must_use]
    pub fn from_users(users: &[User]) -> Self {
        let rows = users
            .iter()
            .map(|user| {
                [
                    user.id().to_string(),
                    user.email().to_string(),
                    user.name().to_string(),
                    user.status().to_string(),
                    user.created_at()
                        .to_rfc3339_opts(SecondsFormat::Secs, true),
                ]
            })
            .collect();
        Self { rows }
    }

    /// Sheet name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        ROSTER_SHEET_NAME
    }

    /// Number of populated rows, header included.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len() + 1
    }

    /// Data rows paired with their 1-based sheet row number.
    #[must_use]
    pub fn numbered_rows(&self) -> impl Iterator<Item = (usize, &RosterRow)> {
        self.rows.iter().enumerate().map(|(index, row)| (index + 2, row))
    }
}
