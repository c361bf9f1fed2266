//! Reading and writing the `RSVPs` sheet.
//!
//! The same layout is used for downloads and for the workbook-backed store:
//! one bold header row followed by one row per RSVP, oldest first.

use std::io;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};
use thiserror::Error;

use crate::models::Rsvp;

pub const SHEET_NAME: &str = "RSVPs";
pub const HEADER: [&str; 6] = ["Name", "Email", "Contact", "Guests", "Attendance", "Guest Names"];
const COLUMN_WIDTHS: [f64; 6] = [15.0, 25.0, 15.0, 10.0, 12.0, 30.0];

#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("could not write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    #[error("could not read workbook: {0}")]
    Read(#[from] calamine::XlsxError),

    #[error("workbook has no sheet named {SHEET_NAME}")]
    MissingSheet,

    #[error("row {row} of {SHEET_NAME} has no whole-number guest count")]
    InvalidGuests { row: usize },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub fn write_rsvps(rsvps: &[Rsvp], path: &Path) -> Result<(), WorkbookError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, (title, width)) in HEADER.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *title, &bold)?;
        sheet.set_column_width(col, width)?;
    }

    for (index, rsvp) in rsvps.iter().enumerate() {
        let row = index as u32 + 1;
        sheet.write_string(row, 0, &rsvp.name)?;
        sheet.write_string(row, 1, &rsvp.email)?;
        sheet.write_string(row, 2, &rsvp.contact)?;
        sheet.write_number(row, 3, rsvp.guests)?;
        sheet.write_string(row, 4, &rsvp.attendance)?;
        if let Some(guest_names) = &rsvp.guest_names {
            sheet.write_string(row, 5, guest_names)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// Reads every data row of the `RSVPs` sheet. Ids are 1-based row positions
/// below the header.
pub fn read_rsvps(path: &Path) -> Result<Vec<Rsvp>, WorkbookError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    if !workbook.sheet_names().iter().any(|name| name == SHEET_NAME) {
        return Err(WorkbookError::MissingSheet);
    }
    let range = workbook.worksheet_range(SHEET_NAME)?;

    range
        .rows()
        .skip(1)
        .enumerate()
        .map(|(index, row)| -> Result<Rsvp, WorkbookError> {
            let cell = |col: usize| row.get(col).map(cell_text).unwrap_or_default();
            // Sheet rows are 1-based and the header takes the first one.
            let guests = row
                .get(3)
                .and_then(cell_number)
                .ok_or(WorkbookError::InvalidGuests { row: index + 2 })?;
            let guest_names = cell(5);
            Ok(Rsvp {
                id: index as i32 + 1,
                name: cell(0),
                email: cell(1),
                contact: cell(2),
                guests,
                attendance: cell(4),
                guest_names: if guest_names.is_empty() { None } else { Some(guest_names) },
            })
        })
        .collect()
}

/// Returns the header row and data rows as plain strings, for comparing the
/// tabular content of two workbooks.
pub fn read_table(path: &Path) -> Result<Vec<Vec<String>>, WorkbookError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook.worksheet_range(SHEET_NAME)?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

fn cell_number(cell: &Data) -> Option<i32> {
    match cell {
        Data::Int(i) => i32::try_from(*i).ok(),
        Data::Float(f) if f.fract() == 0.0 && *f >= i32::MIN as f64 && *f <= i32::MAX as f64 => {
            Some(*f as i32)
        }
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rsvp(id: i32, name: &str, guest_names: Option<&str>) -> Rsvp {
        Rsvp {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            contact: "0412 555 010".to_string(),
            guests: 2,
            attendance: "yes".to_string(),
            guest_names: guest_names.map(str::to_string),
        }
    }

    #[test]
    fn written_rows_read_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rsvps.xlsx");
        let rsvps = vec![rsvp(1, "Ada", Some("Charles")), rsvp(2, "Grace", None)];

        write_rsvps(&rsvps, &path).unwrap();

        assert_eq!(read_rsvps(&path).unwrap(), rsvps);
    }

    #[test]
    fn table_starts_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rsvps.xlsx");

        write_rsvps(&[rsvp(1, "Ada", None)], &path).unwrap();

        let table = read_table(&path).unwrap();
        assert_eq!(table[0], HEADER);
        assert_eq!(table[1][..5], ["Ada", "ada@example.com", "0412 555 010", "2", "yes"]);
    }

    fn sheet_with_guests(guests: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME).unwrap();
        for (col, title) in HEADER.iter().enumerate() {
            sheet.write_string(0, col as u16, *title).unwrap();
        }
        for (index, count) in guests.iter().enumerate() {
            let row = index as u32 + 1;
            sheet.write_string(row, 0, "Ada").unwrap();
            sheet.write_string(row, 1, "ada@example.com").unwrap();
            sheet.write_string(row, 2, "123").unwrap();
            sheet.write_string(row, 3, *count).unwrap();
            sheet.write_string(row, 4, "yes").unwrap();
        }
        workbook.save(dir.path().join("rsvps.xlsx")).unwrap();
        dir
    }

    #[test]
    fn text_guest_counts_are_parsed() {
        let dir = sheet_with_guests(&["3", " 4 "]);

        let guests: Vec<i32> = read_rsvps(&dir.path().join("rsvps.xlsx"))
            .unwrap()
            .iter()
            .map(|rsvp| rsvp.guests)
            .collect();
        assert_eq!(guests, [3, 4]);
    }

    #[test]
    fn unreadable_guest_count_is_an_error() {
        let dir = sheet_with_guests(&["1", "two"]);

        let err = read_rsvps(&dir.path().join("rsvps.xlsx")).unwrap_err();
        assert!(matches!(err, WorkbookError::InvalidGuests { row: 3 }), "{err}");
    }

    #[test]
    fn blank_guest_count_is_an_error() {
        let dir = sheet_with_guests(&[""]);

        let err = read_rsvps(&dir.path().join("rsvps.xlsx")).unwrap_err();
        assert!(matches!(err, WorkbookError::InvalidGuests { row: 2 }), "{err}");
    }

    #[test]
    fn header_only_sheet_has_no_rsvps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rsvps.xlsx");

        write_rsvps(&[], &path).unwrap();

        assert!(read_rsvps(&path).unwrap().is_empty());
    }
}
