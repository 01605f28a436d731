//! Structured-answer extraction: machine-readable answers embedded as JSON.

use super::{Resolution, Resolver};
use crate::answer::Answer;
use crate::corpus::Corpus;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

/// Keys that may carry the delivery URL inside an embedded JSON object,
/// in lookup order.
const TARGET_KEYS: [&str; 5] = ["submit_url", "submit", "post", "submitUrl", "url"];

/// Scans corpus entries for an embedded JSON object with an `answer` key.
pub struct StructuredAnswerResolver;

#[async_trait]
impl Resolver for StructuredAnswerResolver {
    fn name(&self) -> &'static str {
        "structured"
    }

    async fn resolve(&self, corpus: &Corpus) -> Resolution {
        // At least 20 interior characters: anything shorter is noise like
        // inline CSS braces.
        let blob_re = Regex::new(r"\{[\s\S]{20,}\}").expect("json blob regex is valid");
        let mut submit_hint: Option<String> = None;

        for entry in corpus.entries() {
            let Some(m) = blob_re.find(entry) else { continue };
            let Ok(value) = serde_json::from_str::<Value>(m.as_str()) else {
                continue;
            };

            if submit_hint.is_none() {
                submit_hint = submit_hint_from(&value);
            }

            if let Some(answer) = value.as_object().and_then(|obj| obj.get("answer")) {
                return Resolution::Resolved {
                    answer: Answer::from_json(answer.clone()),
                    submit_hint,
                };
            }
        }

        Resolution::NoMatch { submit_hint }
    }
}

/// An HTTP URL held by one of the known target keys, if any.
fn submit_hint_from(value: &Value) -> Option<String> {
    let obj = value.as_object()?;
    for key in TARGET_KEYS {
        if let Some(s) = obj.get(key).and_then(|v| v.as_str()) {
            if s.starts_with("http") {
                return Some(s.to_string());
            }
        }
    }
    None
}
