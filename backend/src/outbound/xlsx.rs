//! Workbook encoder backed by `rust_xlsxwriter`.

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::domain::ports::{SpreadsheetEncoder, SpreadsheetEncoderError};
use crate::domain::{ROSTER_HEADER, RosterSheet};

/// Writes the roster sheet as a single-sheet `.xlsx` workbook.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxSpreadsheetEncoder;

impl XlsxSpreadsheetEncoder {
    /// Create the encoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn encode_error(error: &XlsxError) -> SpreadsheetEncoderError {
    SpreadsheetEncoderError::encode(error.to_string())
}

fn write_row(
    worksheet: &mut Worksheet,
    row: u32,
    cells: impl IntoIterator<Item = impl AsRef<str>>,
    format: Option<&Format>,
) -> Result<(), SpreadsheetEncoderError> {
    for (col, cell) in (0u16..).zip(cells) {
        let written = match format {
            Some(format) => worksheet.write_string_with_format(row, col, cell.as_ref(), format),
            None => worksheet.write_string(row, col, cell.as_ref()),
        };
        written.map_err(|err| {
            SpreadsheetEncoderError::encode(format!("cell ({row}, {col}): {err}"))
        })?;
    }
    Ok(())
}

impl SpreadsheetEncoder for XlsxSpreadsheetEncoder {
    fn encode(&self, sheet: &RosterSheet) -> Result<Vec<u8>, SpreadsheetEncoderError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(sheet.name())
            .map_err(|err| encode_error(&err))?;

        let header_format = Format::new().set_bold();
        write_row(worksheet, 0, ROSTER_HEADER, Some(&header_format))?;

        // Sheet rows are 1-based; the writer counts from zero.
        for (number, row) in sheet.numbered_rows() {
            let index = u32::try_from(number - 1).map_err(|_| {
                SpreadsheetEncoderError::encode(format!("row {number} exceeds the sheet limit"))
            })?;
            write_row(worksheet, index, row.iter(), None::<&Format>)?;
        }

        worksheet.autofit();

        workbook.save_to_buffer().map_err(|err| encode_error(&err))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use super::*;
    use crate::domain::{Email, User, UserId, UserName};

    fn user(name: &str, email: &str) -> User {
        User::register(
            UserId::random(),
            UserName::new(name).expect("name"),
            Email::new(email).expect("email"),
            Utc.with_ymd_and_hms(2026, 3, 4, 9, 5, 0)
                .single()
                .expect("timestamp"),
        )
    }

    fn read_part(bytes: &[u8], part: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("xlsx is a zip");
        let mut file = archive.by_name(part).expect("part exists");
        let mut xml = String::new();
        file.read_to_string(&mut xml).expect("utf8 part");
        xml
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(3)]
    fn sheet_holds_a_header_and_one_row_per_user(#[case] size: usize) {
        let users: Vec<User> = (0..size)
            .map(|i| user(&format!("User {i}"), &format!("u{i}@x.com")))
            .collect();
        let sheet = RosterSheet::from_users(&users);

        let bytes = XlsxSpreadsheetEncoder::new()
            .encode(&sheet)
            .expect("encode succeeds");

        assert_eq!(&bytes[0..2], b"PK");
        let xml = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert_eq!(xml.matches("<row ").count(), size + 1);
    }

    #[rstest]
    fn workbook_carries_sheet_name_header_and_values() {
        let ana = user("Ana", "a@x.com");
        let sheet = RosterSheet::from_users(std::slice::from_ref(&ana));

        let bytes = XlsxSpreadsheetEncoder::new()
            .encode(&sheet)
            .expect("encode succeeds");

        let workbook = read_part(&bytes, "xl/workbook.xml");
        assert!(workbook.contains(r#"name="Sheet1""#));

        let strings = read_part(&bytes, "xl/sharedStrings.xml");
        for heading in ROSTER_HEADER {
            assert!(strings.contains(heading), "missing heading {heading}");
        }
        let (_, row) = sheet.numbered_rows().next().expect("one data row");
        for cell in row {
            assert!(strings.contains(cell), "missing cell {cell}");
        }
        assert!(strings.contains("ungenerated"));
    }
}
