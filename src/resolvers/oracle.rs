//! Oracle fallback: hand the corpus to a generative backend and parse
//! whatever comes back.

use super::{Resolution, ResolveError, Resolver};
use crate::answer::Answer;
use crate::corpus::Corpus;
use crate::oracle::InferenceBackend;
use crate::pipeline::Deadline;
use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;

/// How much of the joined corpus is embedded in the prompt. Bounds the
/// request size to the backend.
const CORPUS_PREFIX_CHARS: usize = 8000;

/// Completion budget for the backend reply.
const MAX_OUTPUT_TOKENS: u32 = 512;

/// Upper bound for a single inference call.
const INFERENCE_TIMEOUT: Duration = Duration::from_secs(60);

/// Delegates interpretation of the corpus to an inference backend.
pub struct OracleResolver {
    backend: Arc<dyn InferenceBackend>,
    deadline: Deadline,
}

impl OracleResolver {
    pub fn new(backend: Arc<dyn InferenceBackend>, deadline: Deadline) -> Self {
        Self { backend, deadline }
    }
}

#[async_trait]
impl Resolver for OracleResolver {
    fn name(&self) -> &'static str {
        "oracle"
    }

    async fn resolve(&self, corpus: &Corpus) -> Resolution {
        let prefix: String = corpus.joined().chars().take(CORPUS_PREFIX_CHARS).collect();
        let prompt = format!(
            "You are a helpful assistant. The following is the rendered content of a quiz \
             page. Identify what the quiz is asking and provide a JSON object with an \
             'answer' key that contains the answer (number, boolean, string or JSON as \
             appropriate).\n\nRendered content:\n{prefix}"
        );

        let timeout = self.deadline.clamp(INFERENCE_TIMEOUT);
        let reply = match self.backend.complete(&prompt, MAX_OUTPUT_TOKENS, timeout).await {
            Ok(reply) => reply,
            Err(e) => return Resolution::Failed(ResolveError::Inference(e.to_string())),
        };

        match parse_reply(&reply) {
            Some(answer) => Resolution::resolved(answer),
            None => Resolution::Failed(ResolveError::Inference(
                "reply held no usable answer".to_string(),
            )),
        }
    }
}

/// Pull an answer out of a backend reply: a JSON object with an `answer`
/// key, or failing that the first numeric token as an integer.
fn parse_reply(reply: &str) -> Option<Answer> {
    let blob_re = Regex::new(r"\{[\s\S]{10,}\}").expect("json blob regex is valid");
    if let Some(m) = blob_re.find(reply) {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(m.as_str()) {
            if let Some(answer) = value.as_object().and_then(|obj| obj.get("answer")) {
                return Some(Answer::from_json(answer.clone()));
            }
        }
    }

    // Thousands separators are tolerated and stripped.
    let num_re = Regex::new(r"-?\d[\d,]*(?:\.\d+)?").expect("numeric token regex is valid");
    let m = num_re.find(reply)?;
    let cleaned = m.as_str().replace(',', "");
    let v: f64 = cleaned.parse().ok()?;
    Some(Answer::Integer(v as i64))
}
