//! PDF value-column sums and the crude numeric fallback.
//!
//! Text is pulled per page with lopdf, then scanned with a line-based
//! table heuristic: a header line containing a `value` token fixes a
//! column index, and following lines contribute their token at that index
//! when numeric. When no page yields a table, every numeric token in the
//! full text is summed — intentionally crude, and known to overcount when
//! the document carries stray digits (page numbers, dates).

use anyhow::Result;
use lopdf::Document;
use regex::Regex;

/// Extract text from every page. Pages that fail to decode contribute an
/// empty string so page order is preserved.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>> {
    let doc = Document::load_mem(bytes)?;
    let mut pages = Vec::new();
    for (number, _) in doc.get_pages() {
        pages.push(doc.extract_text(&[number]).unwrap_or_default());
    }
    Ok(pages)
}

/// Sum the `value` column of the first page that presents one as a
/// whitespace-aligned table.
pub fn sum_value_column(pages: &[String]) -> Option<f64> {
    for page in pages {
        if let Some(sum) = sum_value_table(page) {
            return Some(sum);
        }
    }
    None
}

/// Line-based table scan over one page of text.
fn sum_value_table(text: &str) -> Option<f64> {
    let mut column: Option<usize> = None;
    let mut sum = 0.0;
    let mut counted = 0usize;

    for line in text.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match column {
            None => {
                column = tokens
                    .iter()
                    .position(|t| t.trim_matches(|c: char| !c.is_ascii_alphanumeric())
                        .eq_ignore_ascii_case("value"));
            }
            Some(idx) => {
                if let Some(token) = tokens.get(idx) {
                    if let Ok(v) = token.replace(',', "").parse::<f64>() {
                        sum += v;
                        counted += 1;
                    }
                }
            }
        }
    }

    if column.is_some() && counted > 0 {
        Some(sum)
    } else {
        None
    }
}

/// Sum every numeric token found anywhere in the text.
pub fn sum_all_numbers(text: &str) -> Option<f64> {
    let num_re = Regex::new(r"[-+]?[0-9]*\.?[0-9]+").expect("numeric token regex is valid");
    let mut sum = 0.0;
    let mut found = false;
    for m in num_re.find_iter(text) {
        if let Ok(v) = m.as_str().parse::<f64>() {
            sum += v;
            found = true;
        }
    }
    if found {
        Some(sum)
    } else {
        None
    }
}
