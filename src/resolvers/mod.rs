//! Ordered, short-circuiting answer resolvers.
//!
//! Each resolver attempts to produce an answer from the corpus, or
//! declines. The chain runs them in priority order and stops at the first
//! one that commits — a later resolver never sees a request an earlier
//! one resolved. Internal resolver failures are logged and skipped, never
//! propagated.

pub mod heuristic;
pub mod oracle;
pub mod structured;
pub mod tabular;

use crate::answer::Answer;
use crate::corpus::Corpus;
use async_trait::async_trait;

/// Why a resolver failed. Contained at the resolver boundary — these are
/// logged and skipped, never surfaced to the caller.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

/// What a single resolver produced for a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The resolver committed to an answer, possibly also spotting where
    /// it should be delivered.
    Resolved {
        answer: Answer,
        submit_hint: Option<String>,
    },
    /// The resolver ran cleanly but this is not its kind of task. It may
    /// still have observed a submit target along the way.
    NoMatch { submit_hint: Option<String> },
    /// The resolver failed internally. Inspectable, logged by the chain,
    /// treated as "no answer from this path".
    Failed(ResolveError),
}

impl Resolution {
    pub fn resolved(answer: Answer) -> Self {
        Self::Resolved {
            answer,
            submit_hint: None,
        }
    }

    pub fn no_match() -> Self {
        Self::NoMatch { submit_hint: None }
    }
}

/// A pipeline stage that attempts to answer the task.
#[async_trait]
pub trait Resolver: Send + Sync {
    fn name(&self) -> &'static str;
    async fn resolve(&self, corpus: &Corpus) -> Resolution;
}

/// Run resolvers in order, stopping at the first resolved answer.
///
/// Returns the answer (if any resolver committed) and the earliest submit
/// hint observed across the chain.
pub async fn run_chain(
    resolvers: &[Box<dyn Resolver>],
    corpus: &Corpus,
) -> (Option<Answer>, Option<String>) {
    let mut submit_hint: Option<String> = None;

    for resolver in resolvers {
        match resolver.resolve(corpus).await {
            Resolution::Resolved {
                answer,
                submit_hint: hint,
            } => {
                tracing::info!(resolver = resolver.name(), "answer resolved");
                return (Some(answer), submit_hint.or(hint));
            }
            Resolution::NoMatch { submit_hint: hint } => {
                tracing::debug!(resolver = resolver.name(), "no match");
                submit_hint = submit_hint.or(hint);
            }
            Resolution::Failed(error) => {
                tracing::warn!(
                    resolver = resolver.name(),
                    %error,
                    "resolver failed, falling through"
                );
            }
        }
    }

    (None, submit_hint)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Resolution);

    #[async_trait]
    impl Resolver for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }
        async fn resolve(&self, _corpus: &Corpus) -> Resolution {
            self.0.clone()
        }
    }

    /// A resolver that must never run.
    struct Unreachable;

    #[async_trait]
    impl Resolver for Unreachable {
        fn name(&self) -> &'static str {
            "unreachable"
        }
        async fn resolve(&self, _corpus: &Corpus) -> Resolution {
            panic!("resolver after a resolved answer must not run");
        }
    }

    fn corpus() -> Corpus {
        Corpus::from_page("<p></p>", "")
    }

    #[tokio::test]
    async fn test_chain_short_circuits_on_first_answer() {
        let chain: Vec<Box<dyn Resolver>> = vec![
            Box::new(Fixed(Resolution::no_match())),
            Box::new(Fixed(Resolution::resolved(Answer::Integer(1)))),
            Box::new(Unreachable),
        ];
        let (answer, _) = run_chain(&chain, &corpus()).await;
        assert_eq!(answer, Some(Answer::Integer(1)));
    }

    #[tokio::test]
    async fn test_chain_skips_failures() {
        let chain: Vec<Box<dyn Resolver>> = vec![
            Box::new(Fixed(Resolution::Failed(ResolveError::Decode("boom".into())))),
            Box::new(Fixed(Resolution::resolved(Answer::Bool(true)))),
        ];
        let (answer, _) = run_chain(&chain, &corpus()).await;
        assert_eq!(answer, Some(Answer::Bool(true)));
    }

    #[tokio::test]
    async fn test_chain_returns_none_when_all_decline() {
        let chain: Vec<Box<dyn Resolver>> =
            vec![Box::new(Fixed(Resolution::no_match()))];
        let (answer, hint) = run_chain(&chain, &corpus()).await;
        assert_eq!(answer, None);
        assert_eq!(hint, None);
    }

    #[tokio::test]
    async fn test_earliest_submit_hint_wins() {
        let chain: Vec<Box<dyn Resolver>> = vec![
            Box::new(Fixed(Resolution::NoMatch {
                submit_hint: Some("http://first.example/submit".into()),
            })),
            Box::new(Fixed(Resolution::Resolved {
                answer: Answer::Integer(9),
                submit_hint: Some("http://second.example/submit".into()),
            })),
        ];
        let (answer, hint) = run_chain(&chain, &corpus()).await;
        assert_eq!(answer, Some(Answer::Integer(9)));
        assert_eq!(hint.as_deref(), Some("http://first.example/submit"));
    }
}
