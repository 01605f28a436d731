//! Solve a single task URL from the command line, without serving.

use super::serve;
use crate::config::Config;
use crate::fetch::HttpClient;
use crate::pipeline::{Pipeline, TaskRequest};
use anyhow::Result;
use std::time::Duration;

/// Run the pipeline once against a URL and print the outcome as JSON.
pub async fn run(url: &str, email: Option<&str>) -> Result<()> {
    serve::init_tracing();

    let config = Config::from_env();
    let renderer = serve::build_renderer().await;
    let oracle = serve::build_oracle(&config);
    let pipeline = Pipeline::new(
        renderer,
        HttpClient::new(Duration::from_secs(60)),
        oracle,
        config.overall_timeout,
    );

    let request = TaskRequest {
        email: email.unwrap_or(&config.email).to_string(),
        secret: config.secret.clone(),
        url: url.to_string(),
    };

    let outcome = pipeline.solve(request).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
