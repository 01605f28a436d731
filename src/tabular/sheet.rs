//! Spreadsheet (XLSX/XLS) value-column sums via calamine.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

/// Sum the `value` column of the first sheet that has one.
///
/// Sheets are tried in workbook order; the first sheet whose header row
/// contains a `value` column (case-insensitive) decides the result, even
/// if a later sheet also has one.
pub fn sum_value_column(bytes: &[u8]) -> Option<f64> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor).ok()?;

    let names = workbook.sheet_names().to_owned();
    for name in names {
        let Ok(range) = workbook.worksheet_range(&name) else {
            continue;
        };
        let mut rows = range.rows();
        let Some(header) = rows.next() else { continue };
        let Some(idx) = header
            .iter()
            .position(|cell| cell.to_string().trim().eq_ignore_ascii_case("value"))
        else {
            continue;
        };

        let mut sum = 0.0;
        for row in rows {
            match row.get(idx) {
                Some(Data::Float(f)) => sum += *f,
                Some(Data::Int(i)) => sum += *i as f64,
                Some(Data::String(s)) => {
                    if let Ok(v) = s.trim().parse::<f64>() {
                        sum += v;
                    }
                }
                _ => {}
            }
        }
        return Some(sum);
    }
    None
}
