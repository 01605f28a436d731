//! Renderer abstraction for browser-based page rendering.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the engine. The production engine is Chromium via chromiumoxide; when
//! no Chromium binary can be found the service degrades to a plain HTTP
//! renderer that cannot execute scripts but still captures markup, text,
//! and forms.

pub mod chromium;
pub mod http;

use anyhow::Result;
use async_trait::async_trait;
use scraper::{Html, Selector};

/// Everything the pipeline needs from one rendered page.
#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    /// The URL after any redirects.
    pub final_url: String,
    /// Visible body text.
    pub body_text: String,
    /// Full page markup.
    pub html: String,
    /// `action` attributes of the page's forms, in document order.
    pub form_actions: Vec<String>,
}

/// An engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new context (tab) for a single request.
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Shut down the engine.
    async fn shutdown(&self) -> Result<()>;
    /// Number of currently active contexts.
    fn active_contexts(&self) -> usize;
    /// Engine identity, for health and doctor output.
    fn engine_name(&self) -> &'static str;
}

/// A single rendering context, scoped to one request.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL and capture the rendered page.
    async fn render(&mut self, url: &str, timeout_ms: u64) -> Result<RenderedPage>;
    /// Close this context, releasing engine resources.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Pull non-empty form `action` attributes out of markup, in document order.
pub fn extract_form_actions(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("form").expect("form selector is valid");
    document
        .select(&selector)
        .filter_map(|form| form.value().attr("action"))
        .filter(|action| !action.is_empty())
        .map(|action| action.to_string())
        .collect()
}
