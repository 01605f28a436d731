//! HTTP-only renderer used when Chromium is unavailable.
//!
//! Fetches raw markup over plain HTTP and derives visible text with a
//! selector-based scrape. Script-injected content never appears in this
//! mode, but static task pages still resolve.

use super::{RenderContext, RenderedPage, Renderer};
use crate::fetch::HttpClient;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Renderer that degrades rendering to a plain HTTP GET.
pub struct HttpRenderer {
    client: HttpClient,
    active_count: Arc<AtomicUsize>,
}

impl HttpRenderer {
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            client: HttpClient::new(default_timeout),
            active_count: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        self.active_count.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(HttpContext {
            client: self.client.clone(),
            active_count: Arc::clone(&self.active_count),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }

    fn engine_name(&self) -> &'static str {
        "http-only"
    }
}

/// One HTTP "tab": stateless, just a client handle.
pub struct HttpContext {
    client: HttpClient,
    active_count: Arc<AtomicUsize>,
}

#[async_trait]
impl RenderContext for HttpContext {
    async fn render(&mut self, url: &str, timeout_ms: u64) -> Result<RenderedPage> {
        let (final_url, html) = self
            .client
            .get_text(url, Duration::from_millis(timeout_ms))
            .await?;
        let body_text = html_to_text(&html);
        let form_actions = super::extract_form_actions(&html);
        Ok(RenderedPage {
            final_url,
            body_text,
            html,
            form_actions,
        })
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.active_count.fetch_sub(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Extract readable text from HTML, skipping scripts, styles, and svg.
pub fn html_to_text(html: &str) -> String {
    use scraper::{Html, Selector};

    let document = Html::parse_document(html);
    let skip_tags = ["script", "style", "noscript", "svg"];

    let body_selector = Selector::parse("body").expect("body selector is valid");
    let parts = match document.select(&body_selector).next() {
        Some(body) => collect_element_text(body, &skip_tags),
        None => collect_element_text(document.root_element(), &skip_tags),
    };

    let raw = parts.join(" ");
    clean_whitespace(&raw)
}

fn collect_element_text(element: scraper::ElementRef, skip_tags: &[&str]) -> Vec<String> {
    if skip_tags.contains(&element.value().name()) {
        return Vec::new();
    }

    let mut parts = Vec::new();
    for child in element.children() {
        match child.value() {
            scraper::Node::Text(text) => {
                let t = text.trim();
                if !t.is_empty() {
                    parts.push(t.to_string());
                }
            }
            scraper::Node::Element(_) => {
                if let Some(child_el) = scraper::ElementRef::wrap(child) {
                    parts.extend(collect_element_text(child_el, skip_tags));
                }
            }
            _ => {}
        }
    }
    parts
}

fn clean_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_was_whitespace = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !prev_was_whitespace {
                result.push(' ');
            }
            prev_was_whitespace = true;
        } else {
            result.push(ch);
            prev_was_whitespace = false;
        }
    }
    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_html_to_text_strips_script_and_style() {
        let html = r#"
        <html><body>
            <script>var x = 1;</script>
            <style>.foo { color: red; }</style>
            <p>Visible text</p>
        </body></html>
        "#;
        let text = html_to_text(html);
        assert!(text.contains("Visible text"));
        assert!(!text.contains("var x = 1"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn test_clean_whitespace() {
        assert_eq!(clean_whitespace("  hello   world  "), "hello world");
    }

    #[tokio::test]
    async fn test_http_render_captures_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quiz"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><body><p>Task here</p><form action="/submit"></form></body></html>"#,
            ))
            .mount(&server)
            .await;

        let renderer = HttpRenderer::new(Duration::from_secs(5));
        let mut ctx = renderer.new_context().await.unwrap();
        let page = ctx
            .render(&format!("{}/quiz", server.uri()), 5000)
            .await
            .unwrap();

        assert!(page.body_text.contains("Task here"));
        assert_eq!(page.form_actions, vec!["/submit".to_string()]);
        assert!(page.final_url.ends_with("/quiz"));

        ctx.close().await.unwrap();
        assert_eq!(renderer.active_contexts(), 0);
    }
}
