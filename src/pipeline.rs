//! The solve pipeline: render, normalize, resolve, deliver.
//!
//! One linear pass per request — no shared state across requests, nothing
//! persisted. The pipeline owns a single wall-clock deadline and clamps
//! every blocking step (navigation, file fetch, inference, submission) to
//! whatever remains of it, so an overdue request fails instead of hanging.

use crate::answer::{Answer, UNSOLVED_SENTINEL};
use crate::corpus::Corpus;
use crate::fetch::HttpClient;
use crate::oracle::InferenceBackend;
use crate::renderer::{RenderContext, RenderedPage, Renderer};
use crate::resolvers::{self, Resolver};
use crate::submit::{self, SubmissionRecord};
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Upper bound for page navigation.
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(45);

/// Upper bound for the submission POST.
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(60);

/// A wall-clock budget shared by every step of one request.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
        }
    }

    /// Time left before the deadline, zero once passed.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// A per-step timeout bounded by both the step's own cap and the
    /// remaining budget.
    pub fn clamp(&self, step: Duration) -> Duration {
        step.min(self.remaining())
    }
}

/// One inbound task request.
#[derive(Debug, Clone)]
pub struct TaskRequest {
    pub email: String,
    pub secret: String,
    pub url: String,
}

/// Terminal outcome of a solve run, in the wire shape callers receive.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SolveOutcome {
    /// The answer was delivered; whatever the endpoint said is echoed back.
    Submitted {
        submit_url: String,
        submitted_payload: Value,
        submit_response: Value,
    },
    /// No delivery happened — a defined outcome, not an internal error.
    Unsubmitted {
        correct: bool,
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        debug: Option<Value>,
    },
}

impl SolveOutcome {
    fn no_target(corpus: &Corpus) -> Self {
        let snippets: Vec<String> = corpus
            .decoded_payloads()
            .iter()
            .take(3)
            .cloned()
            .collect();
        Self::Unsubmitted {
            correct: false,
            reason: "no submit URL found on page".to_string(),
            debug: Some(json!({ "snippets": snippets })),
        }
    }

    fn failed(reason: impl Into<String>) -> Self {
        Self::Unsubmitted {
            correct: false,
            reason: reason.into(),
            debug: None,
        }
    }
}

/// The request pipeline. One instance serves all requests; per-request
/// state lives entirely on the stack of [`Pipeline::solve`].
pub struct Pipeline {
    renderer: Arc<dyn Renderer>,
    fetcher: HttpClient,
    oracle: Option<Arc<dyn InferenceBackend>>,
    overall_timeout: Duration,
}

impl Pipeline {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        fetcher: HttpClient,
        oracle: Option<Arc<dyn InferenceBackend>>,
        overall_timeout: Duration,
    ) -> Self {
        Self {
            renderer,
            fetcher,
            oracle,
            overall_timeout,
        }
    }

    pub fn renderer_name(&self) -> &'static str {
        self.renderer.engine_name()
    }

    pub fn oracle_configured(&self) -> bool {
        self.oracle.is_some()
    }

    /// Solve one task request end to end.
    ///
    /// The render context is acquired up front and released on every exit
    /// path. Errors returned here are unexpected faults; every per-resolver
    /// problem has already been contained downstream.
    pub async fn solve(&self, request: TaskRequest) -> Result<SolveOutcome> {
        let deadline = Deadline::after(self.overall_timeout);
        let started = Instant::now();
        info!(url = %request.url, "solving task");

        let mut context = self
            .renderer
            .new_context()
            .await
            .context("failed to open a render context")?;

        let result = match tokio::time::timeout(
            deadline.remaining(),
            self.solve_inner(&request, deadline, context.as_mut()),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Ok(SolveOutcome::failed("pipeline deadline exceeded")),
        };

        if let Err(e) = context.close().await {
            warn!("failed to close render context: {e}");
        }

        info!(
            url = %request.url,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "task finished"
        );
        result
    }

    async fn solve_inner(
        &self,
        request: &TaskRequest,
        deadline: Deadline,
        context: &mut dyn RenderContext,
    ) -> Result<SolveOutcome> {
        // RENDER. A dead page is not fatal: the resolvers still run over
        // an empty corpus and the sentinel path handles the rest.
        let nav_timeout = deadline.clamp(NAVIGATION_TIMEOUT);
        let page = match context.render(&request.url, nav_timeout.as_millis() as u64).await {
            Ok(page) => page,
            Err(e) => {
                warn!(url = %request.url, "render failed: {e}");
                RenderedPage {
                    final_url: request.url.clone(),
                    ..Default::default()
                }
            }
        };

        // NORMALIZE.
        let corpus = Corpus::from_page(&page.html, &page.body_text);
        info!(entries = corpus.entries().len(), "corpus assembled");

        // RESOLVE: strict priority order, first success wins.
        let mut chain: Vec<Box<dyn Resolver>> = vec![
            Box::new(resolvers::structured::StructuredAnswerResolver),
            Box::new(resolvers::tabular::TabularTaskResolver::new(
                self.fetcher.clone(),
                deadline,
            )),
        ];
        if let Some(backend) = &self.oracle {
            chain.push(Box::new(resolvers::oracle::OracleResolver::new(
                Arc::clone(backend),
                deadline,
            )));
        }
        chain.push(Box::new(resolvers::heuristic::HeuristicResolver));

        let (answer, submit_hint) = resolvers::run_chain(&chain, &corpus).await;
        let answer =
            answer.unwrap_or_else(|| Answer::Text(UNSOLVED_SENTINEL.to_string()));

        // RESOLVE_TARGET.
        let submit_url = submit_hint.or_else(|| submit::find_submit_target(&corpus, &page));

        let record = SubmissionRecord {
            email: request.email.clone(),
            secret: request.secret.clone(),
            url: request.url.clone(),
            answer,
        };

        // SUBMIT or NO_TARGET.
        let Some(submit_url) = submit_url else {
            info!(url = %request.url, "no submit target found");
            return Ok(SolveOutcome::no_target(&corpus));
        };

        let submitted_payload = serde_json::to_value(&record)?;
        match submit::deliver(
            &self.fetcher,
            &submit_url,
            &record,
            deadline.clamp(SUBMIT_TIMEOUT),
        )
        .await
        {
            Ok(submit_response) => {
                info!(%submit_url, "answer submitted");
                Ok(SolveOutcome::Submitted {
                    submit_url,
                    submitted_payload,
                    submit_response,
                })
            }
            Err(e) => {
                warn!(%submit_url, "submission failed: {e}");
                Ok(SolveOutcome::failed(format!("failed to POST answer: {e}")))
            }
        }
    }
}
