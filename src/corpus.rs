//! Corpus assembly from rendered page content.
//!
//! The corpus is the ordered set of text blocks every resolver scans:
//! decoded embedded payloads first, then the visible body text, then the
//! raw markup. Earlier entries are more authoritative, so downstream
//! first-match scans prefer decoded content over raw HTML. Built once per
//! request and never mutated afterwards.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use regex::Regex;

/// Minimum length for a bare base64 run to count as a candidate payload.
/// Shorter runs are overwhelmingly hashes, tokens, and inline images.
const BARE_BASE64_MIN: usize = 120;

/// Ordered text blocks extracted from one rendered page.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Vec<String>,
    /// How many leading entries came from decoded payloads.
    decoded_len: usize,
    joined: String,
}

impl Corpus {
    /// Build the corpus for a rendered page: decoded payloads, then body
    /// text, then the raw markup.
    pub fn from_page(html: &str, body_text: &str) -> Self {
        let mut entries = decode_embedded_payloads(html);
        let decoded_len = entries.len();
        entries.push(body_text.to_string());
        entries.push(html.to_string());
        let joined = entries.join("\n");
        Self {
            entries,
            decoded_len,
            joined,
        }
    }

    /// All entries, most-authoritative first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// The decoded-payload prefix of the corpus.
    pub fn decoded_payloads(&self) -> &[String] {
        &self.entries[..self.decoded_len]
    }

    /// Every entry joined with newlines, for whole-corpus scans.
    pub fn joined(&self) -> &str {
        &self.joined
    }
}

/// Decode embedded base64 payloads out of raw markup.
///
/// Two families are recognized: `atob(...)` calls wrapping a quoted or
/// backticked argument, and bare runs of base64-alphabet characters with
/// optional padding. Candidates that fail to decode are dropped silently.
/// Overlapping or duplicate matches are all retained.
pub fn decode_embedded_payloads(html: &str) -> Vec<String> {
    let atob_re = Regex::new(r#"atob\((?:`|"|')([A-Za-z0-9+/=\n\r\s]+)(?:`|"|')\)"#)
        .expect("atob regex is valid");
    let bare_re = Regex::new(&format!(r"([A-Za-z0-9+/]{{{BARE_BASE64_MIN},}}={{0,2}})"))
        .expect("bare base64 regex is valid");

    let mut candidates: Vec<&str> = Vec::new();
    for cap in atob_re.captures_iter(html) {
        if let Some(m) = cap.get(1) {
            candidates.push(m.as_str());
        }
    }
    for cap in bare_re.captures_iter(html) {
        if let Some(m) = cap.get(1) {
            candidates.push(m.as_str());
        }
    }

    let mut decoded = Vec::new();
    for candidate in candidates {
        let cleaned: String = candidate.split_whitespace().collect();
        if cleaned.is_empty() {
            continue;
        }
        match BASE64.decode(cleaned.as_bytes()) {
            Ok(bytes) => decoded.push(String::from_utf8_lossy(&bytes).into_owned()),
            // Matched the shape but is not base64 after all (hash, token).
            Err(_) => continue,
        }
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(s: &str) -> String {
        BASE64.encode(s.as_bytes())
    }

    #[test]
    fn test_atob_payload_decoded() {
        let html = format!("<script>el.innerHTML = atob(`{}`);</script>", encode("hidden task"));
        let decoded = decode_embedded_payloads(&html);
        assert_eq!(decoded, vec!["hidden task".to_string()]);
    }

    #[test]
    fn test_atob_double_quoted() {
        let html = format!(r#"<script>atob("{}")</script>"#, encode("quoted payload"));
        let decoded = decode_embedded_payloads(&html);
        assert_eq!(decoded, vec!["quoted payload".to_string()]);
    }

    #[test]
    fn test_bare_long_base64_run() {
        // 96 input bytes -> 128 base64 chars, above the bare-run threshold.
        let payload = "x".repeat(96);
        let html = format!("<div data-blob=\"{}\"></div>", encode(&payload));
        let decoded = decode_embedded_payloads(&html);
        assert!(decoded.iter().any(|d| d == &payload));
    }

    #[test]
    fn test_short_base64_run_ignored() {
        let html = format!("<div>{}</div>", encode("short"));
        assert!(decode_embedded_payloads(&html).is_empty());
    }

    #[test]
    fn test_invalid_candidate_skipped() {
        // Right shape, wrong content: 120+ chars that are not valid base64
        // as a unit (length not a multiple of 4).
        let junk: String = "A".repeat(121);
        let html = format!("atob(`{junk}`)");
        assert!(decode_embedded_payloads(&html).is_empty());
    }

    #[test]
    fn test_corpus_ordering() {
        let html = format!("<p>markup</p> atob('{}')", encode("payload"));
        let corpus = Corpus::from_page(&html, "visible text");
        let entries = corpus.entries();
        assert_eq!(entries[0], "payload");
        assert_eq!(entries[1], "visible text");
        assert_eq!(entries[2], html);
        assert_eq!(corpus.decoded_payloads(), &["payload".to_string()]);
    }

    #[test]
    fn test_joined_concatenates_in_order() {
        let corpus = Corpus::from_page("<p>m</p>", "body");
        assert_eq!(corpus.joined(), "body\n<p>m</p>");
    }

    #[test]
    fn test_duplicates_retained() {
        let b64 = encode(&"y".repeat(96));
        let html = format!("atob(`{b64}`) and again atob(`{b64}`)");
        let decoded = decode_embedded_payloads(&html);
        // Both atob matches plus the bare-run matches are kept.
        assert!(decoded.len() >= 2);
    }
}
