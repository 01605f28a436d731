//! Start the Sphinx endpoint.

use crate::config::Config;
use crate::fetch::HttpClient;
use crate::oracle::{GenerativeHttpBackend, InferenceBackend};
use crate::pipeline::Pipeline;
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::http::HttpRenderer;
use crate::renderer::Renderer;
use crate::rest::{self, AppState};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Default timeout for outbound fetches and the HTTP-only renderer.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(60);

/// Start the endpoint: initialize logging, renderer, and pipeline, then
/// serve until interrupted.
pub async fn run(port: u16) -> Result<()> {
    init_tracing();
    info!("starting Sphinx v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();
    if config.secret_is_default() {
        warn!("SPHINX_SECRET is unset; the placeholder secret will be accepted");
    }

    let renderer = build_renderer().await;
    let oracle = build_oracle(&config);
    let pipeline = Pipeline::new(
        renderer,
        HttpClient::new(CLIENT_TIMEOUT),
        oracle,
        config.overall_timeout,
    );

    let state = Arc::new(AppState { config, pipeline });
    rest::start(port, state).await
}

/// Initialize tracing with a `sphinx_runtime=info` default directive.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sphinx_runtime=info".parse().unwrap()),
        )
        .init();
}

/// Launch Chromium, or fall back to HTTP-only rendering.
pub async fn build_renderer() -> Arc<dyn Renderer> {
    match ChromiumRenderer::new().await {
        Ok(renderer) => {
            info!("Chromium renderer initialized");
            Arc::new(renderer)
        }
        Err(e) => {
            warn!("failed to initialize Chromium: {e:#}");
            warn!("running with the HTTP-only renderer; script-injected content will be missed");
            Arc::new(HttpRenderer::new(CLIENT_TIMEOUT))
        }
    }
}

/// Build the inference backend when one is configured.
pub fn build_oracle(config: &Config) -> Option<Arc<dyn InferenceBackend>> {
    config.oracle.as_ref().map(|oracle| {
        info!(model = %oracle.model, "inference backend configured");
        Arc::new(GenerativeHttpBackend::new(
            oracle.base_url.clone(),
            oracle.model.clone(),
            oracle.api_key.clone(),
        )) as Arc<dyn InferenceBackend>
    })
}
