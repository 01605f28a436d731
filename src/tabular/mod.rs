//! Tabular answer computation: locate a `value` column and sum it.
//!
//! All three decoders share the same contract: find the first column whose
//! header matches `value` case-insensitively, coerce cells to numbers
//! (discarding everything non-numeric), and return the sum. Truncation to
//! an integer happens at the resolver, not here.

pub mod pdf;
pub mod sheet;

/// Sum the `value` column of CSV text.
///
/// Returns `None` when no such column exists. An existing column with no
/// numeric cells sums to zero — that mirrors a sum over an empty series,
/// not an error.
pub fn sum_value_column_csv(text: &str) -> Option<f64> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers().ok()?.clone();
    let idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("value"))?;

    let mut sum = 0.0;
    for record in reader.records() {
        let Ok(record) = record else { continue };
        if let Some(cell) = record.get(idx) {
            if let Ok(v) = cell.parse::<f64>() {
                sum += v;
            }
        }
    }
    Some(sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_cells_sum() {
        let csv = "id,Value\n1,3\n2,x\n3,4.5\n4,7\n";
        assert_eq!(sum_value_column_csv(csv), Some(14.5));
    }

    #[test]
    fn test_negative_values() {
        let csv = "value\n10\n20\n-5\n";
        assert_eq!(sum_value_column_csv(csv), Some(25.0));
    }

    #[test]
    fn test_header_case_insensitive() {
        assert_eq!(sum_value_column_csv("VALUE\n2\n"), Some(2.0));
        assert_eq!(sum_value_column_csv("Value\n2\n"), Some(2.0));
    }

    #[test]
    fn test_first_matching_column_wins() {
        let csv = "value,VALUE\n1,100\n2,100\n";
        assert_eq!(sum_value_column_csv(csv), Some(3.0));
    }

    #[test]
    fn test_missing_column() {
        assert_eq!(sum_value_column_csv("amount\n1\n2\n"), None);
    }

    #[test]
    fn test_column_with_no_numeric_cells() {
        assert_eq!(sum_value_column_csv("value\nfoo\nbar\n"), Some(0.0));
    }

    #[test]
    fn test_ragged_rows_tolerated() {
        let csv = "id,value\n1,5\n2\n3,6\n";
        assert_eq!(sum_value_column_csv(csv), Some(11.0));
    }
}
