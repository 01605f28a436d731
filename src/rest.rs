// Copyright 2026 Sphinx Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP REST API for Sphinx.
//!
//! One task endpoint plus a health probe. The task endpoint validates the
//! shared secret before anything else runs — a rejected request performs
//! no rendering, fetching, or submission.

use crate::config::Config;
use crate::pipeline::{Pipeline, TaskRequest};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, warn};

/// Shared state behind the REST surface.
pub struct AppState {
    pub config: Config,
    pub pipeline: Pipeline,
}

/// Inbound task request body.
#[derive(Debug, Deserialize)]
pub struct TaskPayload {
    pub email: String,
    pub secret: String,
    pub url: String,
}

/// Build the axum Router with all endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/", post(handle_task))
        .layer(cors)
        .with_state(state)
}

/// Start the REST server on the given port.
pub async fn start(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Sphinx listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await?;
    Ok(())
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "renderer": state.pipeline.renderer_name(),
        "oracle_configured": state.pipeline.oracle_configured(),
    }))
}

async fn handle_task(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TaskPayload>,
) -> (StatusCode, Json<Value>) {
    if payload.secret != state.config.secret {
        warn!(email = %payload.email, "invalid secret");
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "invalid secret" })),
        );
    }

    let email = if payload.email.is_empty() {
        state.config.email.clone()
    } else {
        payload.email
    };

    let request = TaskRequest {
        email,
        secret: payload.secret,
        url: payload.url,
    };

    match state.pipeline.solve(request).await {
        Ok(outcome) => match serde_json::to_value(&outcome) {
            Ok(v) => (StatusCode::OK, Json(v)),
            Err(e) => {
                error!("failed to serialize outcome: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "unserializable outcome" })),
                )
            }
        },
        Err(e) => {
            error!("unhandled pipeline error: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("{e:#}") })),
            )
        }
    }
}
