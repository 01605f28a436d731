//! Tabular-task resolution: "sum of the 'value' column" against a linked
//! data file.

use super::{Resolution, ResolveError, Resolver};
use crate::answer::Answer;
use crate::corpus::Corpus;
use crate::fetch::{FetchedFile, HttpClient};
use crate::pipeline::Deadline;
use crate::tabular;
use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;
use tracing::info;

/// Upper bound for fetching one linked data file.
const FILE_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Detects the value-column-sum task and computes it from the linked file.
pub struct TabularTaskResolver {
    fetcher: HttpClient,
    deadline: Deadline,
}

impl TabularTaskResolver {
    pub fn new(fetcher: HttpClient, deadline: Deadline) -> Self {
        Self { fetcher, deadline }
    }
}

#[async_trait]
impl Resolver for TabularTaskResolver {
    fn name(&self) -> &'static str {
        "tabular"
    }

    async fn resolve(&self, corpus: &Corpus) -> Resolution {
        let trigger_re = Regex::new(r#"(?i)sum of the\s+["']value["']\s+column"#)
            .expect("trigger regex is valid");
        let file_re = Regex::new(r#"(?i)(https?://[^\s"']+\.(?:csv|pdf|xlsx|xls))"#)
            .expect("file link regex is valid");

        let joined = corpus.joined();
        if !trigger_re.is_match(joined) {
            return Resolution::no_match();
        }

        let Some(cap) = file_re.captures(joined) else {
            // The phrasing matched but nothing is linked; let the
            // fallbacks interpret the page instead.
            return Resolution::no_match();
        };
        let file_url = cap[1].to_string();
        info!(%file_url, "tabular task detected");

        let timeout = self.deadline.clamp(FILE_FETCH_TIMEOUT);
        let file = match self.fetcher.get_bytes(&file_url, timeout).await {
            Ok(file) => file,
            Err(e) => return Resolution::Failed(ResolveError::Fetch(format!("{file_url}: {e}"))),
        };

        match answer_from_file(file).await {
            // Truncation toward zero, not rounding.
            Some(sum) => Resolution::resolved(Answer::Integer(sum as i64)),
            None => Resolution::Failed(ResolveError::Decode(format!(
                "no value column derived from {file_url}"
            ))),
        }
    }
}

/// Dispatch a fetched file to the matching decoder by extension, falling
/// back to the content-type header.
async fn answer_from_file(file: FetchedFile) -> Option<f64> {
    let url_l = file.url.to_ascii_lowercase();
    let ctype = file.content_type.to_ascii_lowercase();

    if url_l.ends_with(".csv") || ctype.contains("text/csv") {
        let text = String::from_utf8_lossy(&file.bytes);
        if let Some(sum) = tabular::sum_value_column_csv(&text) {
            return Some(sum);
        }
    }

    if url_l.ends_with(".xlsx") || url_l.ends_with(".xls") || ctype.contains("spreadsheet") {
        let bytes = file.bytes.clone();
        let decoded =
            tokio::task::spawn_blocking(move || tabular::sheet::sum_value_column(&bytes))
                .await
                .ok()
                .flatten();
        if decoded.is_some() {
            return decoded;
        }
    }

    if url_l.ends_with(".pdf") || ctype.contains("pdf") {
        let bytes = file.bytes;
        let decoded = tokio::task::spawn_blocking(move || pdf_answer(&bytes))
            .await
            .ok()
            .flatten();
        if decoded.is_some() {
            return decoded;
        }
    }

    None
}

/// PDF path: table extraction first, whole-text numeric sum second.
fn pdf_answer(bytes: &[u8]) -> Option<f64> {
    let pages = tabular::pdf::extract_pages(bytes).ok()?;
    if let Some(sum) = tabular::pdf::sum_value_column(&pages) {
        return Some(sum);
    }
    tabular::pdf::sum_all_numbers(&pages.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn corpus_with(text: &str) -> Corpus {
        Corpus::from_page("<p></p>", text)
    }

    fn resolver(deadline: Deadline) -> TabularTaskResolver {
        TabularTaskResolver::new(HttpClient::new(Duration::from_secs(5)), deadline)
    }

    #[tokio::test]
    async fn test_no_trigger_no_match() {
        let r = resolver(Deadline::after(Duration::from_secs(10)));
        let resolution = r
            .resolve(&corpus_with("compute the average of the rows"))
            .await;
        assert_eq!(resolution, Resolution::no_match());
    }

    #[tokio::test]
    async fn test_trigger_without_link_declines() {
        let r = resolver(Deadline::after(Duration::from_secs(10)));
        let resolution = r
            .resolve(&corpus_with(r#"Report the sum of the "value" column."#))
            .await;
        assert_eq!(resolution, Resolution::no_match());
    }

    #[tokio::test]
    async fn test_csv_sum_truncated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data.csv"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("id,Value\n1,3\n2,x\n3,4.5\n4,7\n")
                    .insert_header("content-type", "text/csv"),
            )
            .mount(&server)
            .await;

        let text = format!(
            r#"Please compute the sum of the "value" column from {}/data.csv"#,
            server.uri()
        );
        let r = resolver(Deadline::after(Duration::from_secs(10)));
        match r.resolve(&corpus_with(&text)).await {
            Resolution::Resolved { answer, .. } => assert_eq!(answer, Answer::Integer(14)),
            other => panic!("expected resolved answer, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_csv_negative_values() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rows.csv"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("value\n10\n20\n-5\n")
                    .insert_header("content-type", "text/csv"),
            )
            .mount(&server)
            .await;

        let text = format!(
            "find the sum of the 'value' column in {}/rows.csv",
            server.uri()
        );
        let r = resolver(Deadline::after(Duration::from_secs(10)));
        match r.resolve(&corpus_with(&text)).await {
            Resolution::Resolved { answer, .. } => assert_eq!(answer, Answer::Integer(25)),
            other => panic!("expected resolved answer, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_is_soft() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let text = format!(
            "find the sum of the 'value' column in {}/gone.csv",
            server.uri()
        );
        let r = resolver(Deadline::after(Duration::from_secs(10)));
        match r.resolve(&corpus_with(&text)).await {
            Resolution::Failed(error) => assert!(error.to_string().contains("gone.csv")),
            other => panic!("expected soft failure, got {other:?}"),
        }
    }
}
