//! Submit-target resolution and answer delivery.

use crate::answer::Answer;
use crate::corpus::Corpus;
use crate::fetch::HttpClient;
use crate::renderer::RenderedPage;
use anyhow::Result;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

/// How much of a non-JSON submit response is echoed back to the caller.
const RESPONSE_TEXT_LIMIT: usize = 1000;

/// The payload delivered to the submit endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionRecord {
    pub email: String,
    pub secret: String,
    pub url: String,
    pub answer: Answer,
}

/// Locate where the answer must be delivered.
///
/// Priority: an explicit `/submit` URL anywhere in the corpus, then the
/// first form action on the rendered page (absolute as-is, relative
/// path-joined against the page URL). `None` is a valid terminal state.
pub fn find_submit_target(corpus: &Corpus, page: &RenderedPage) -> Option<String> {
    let url_re = Regex::new(r#"(https?://[^\s"']+/submit[^\s"']*)"#)
        .expect("submit url regex is valid");
    if let Some(cap) = url_re.captures(corpus.joined()) {
        let candidate = cap[1].to_string();
        if is_http_url(&candidate) {
            return Some(candidate);
        }
    }

    for action in &page.form_actions {
        let resolved = if action.starts_with("http") {
            action.clone()
        } else {
            resolve_form_action(&page.final_url, action)
        };
        if is_http_url(&resolved) {
            return Some(resolved);
        }
        // Only the first form is consulted, matching first-form semantics
        // even when its action turns out unusable.
        break;
    }

    None
}

/// Join a relative form action onto the page URL by path segments.
///
/// `/submit?x=1` against `https://site.example/quiz/` becomes
/// `https://site.example/quiz/submit?x=1` — deliberately not root-relative.
pub fn resolve_form_action(page_url: &str, action: &str) -> String {
    format!(
        "{}/{}",
        page_url.trim_end_matches('/'),
        action.trim_start_matches('/')
    )
}

fn is_http_url(s: &str) -> bool {
    Url::parse(s)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// POST the submission record and normalize the response into JSON.
///
/// Non-JSON responses are wrapped as `{status_code, text}` rather than
/// treated as failures; only transport errors propagate.
pub async fn deliver(
    client: &HttpClient,
    target: &str,
    record: &SubmissionRecord,
    timeout: Duration,
) -> Result<Value> {
    let body = serde_json::to_value(record)?;
    let response = client.post_json(target, &body, timeout).await?;

    Ok(match serde_json::from_str::<Value>(&response.body) {
        Ok(v) => v,
        Err(_) => json!({
            "status_code": response.status,
            "text": response.body.chars().take(RESPONSE_TEXT_LIMIT).collect::<String>(),
        }),
    })
}
