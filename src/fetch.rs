//! Async HTTP client wrapping reqwest.
//!
//! Not a browser — plain HTTP for linked data files and the final answer
//! POST. Every call takes an explicit timeout so the pipeline can clamp it
//! to whatever remains of the request deadline.

use anyhow::{bail, Result};
use serde_json::Value;
use std::time::Duration;

/// User agent sent on every outbound request.
pub const USER_AGENT: &str = concat!("sphinx-solver/", env!("CARGO_PKG_VERSION"));

/// A fetched file with its declared content type.
#[derive(Debug, Clone)]
pub struct FetchedFile {
    /// Original requested URL.
    pub url: String,
    /// Content-Type header, empty when absent.
    pub content_type: String,
    /// Raw response body.
    pub bytes: Vec<u8>,
}

/// Response of a JSON POST.
#[derive(Debug, Clone)]
pub struct PostResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

/// HTTP client shared across the pipeline.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a new client with redirect limits and a default timeout.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// GET a URL and return its raw bytes plus content type.
    pub async fn get_bytes(&self, url: &str, timeout: Duration) -> Result<FetchedFile> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            bail!("GET {url} returned {status}");
        }
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let bytes = response.bytes().await?.to_vec();
        Ok(FetchedFile {
            url: url.to_string(),
            content_type,
            bytes,
        })
    }

    /// GET a URL as text, returning the final URL after redirects.
    pub async fn get_text(&self, url: &str, timeout: Duration) -> Result<(String, String)> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            bail!("GET {url} returned {status}");
        }
        let final_url = response.url().to_string();
        let body = response.text().await?;
        Ok((final_url, body))
    }

    /// POST a JSON body and return status plus raw response text.
    ///
    /// Non-2xx statuses are returned, not errors — the caller decides what
    /// a rejected submission means.
    pub async fn post_json(
        &self,
        url: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<PostResponse> {
        let response = self
            .client
            .post(url)
            .timeout(timeout)
            .json(body)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Ok(PostResponse { status, body })
    }
}
