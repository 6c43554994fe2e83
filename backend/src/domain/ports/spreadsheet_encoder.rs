//! Port for encoding the roster sheet into a workbook.

use crate::domain::RosterSheet;

use super::define_port_error;

define_port_error! {
    /// Errors raised while encoding a workbook.
    pub enum SpreadsheetEncoderError {
        /// The workbook library rejected the sheet.
        Encode { message: String } => "could not encode workbook: {message}",
    }
}

/// Serialises a [`RosterSheet`] to workbook bytes.
#[cfg_attr(test, mockall::automock)]
pub trait SpreadsheetEncoder: Send + Sync {
    /// Encode the sheet. Row `n` of the sheet becomes workbook row `n`.
    fn encode(&self, sheet: &RosterSheet) -> Result<Vec<u8>, SpreadsheetEncoderError>;
}
