//! Chromium-based renderer using chromiumoxide.

use super::{RenderContext, RenderedPage, Renderer};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. SPHINX_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("SPHINX_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.sphinx/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".sphinx/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".sphinx/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".sphinx/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".sphinx/chromium/chrome-linux64/chrome"),
                home.join(".sphinx/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS locations
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Chromium-based renderer.
pub struct ChromiumRenderer {
    browser: Browser,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Create a new ChromiumRenderer, launching a headless Chromium instance.
    pub async fn new() -> Result<Self> {
        let chrome_path = find_chromium()
            .context("Chromium not found. Set SPHINX_CHROMIUM_PATH or install a system Chrome.")?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg(format!("--user-agent={}", crate::fetch::USER_AGENT))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Drain CDP events for the lifetime of the browser.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self {
            browser,
            active_count: Arc::new(AtomicUsize::new(0)),
        })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        self.active_count.fetch_add(1, Ordering::Relaxed);

        Ok(Box::new(ChromiumContext {
            page,
            active_count: Arc::clone(&self.active_count),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        // Browser is dropped when ChromiumRenderer is dropped
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }

    fn engine_name(&self) -> &'static str {
        "chromium"
    }
}

/// A single Chromium page context.
pub struct ChromiumContext {
    page: Page,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumContext {
    async fn eval_string(&self, script: &str) -> Option<String> {
        let result = self.page.evaluate(script).await.ok()?;
        result.into_value::<String>().ok()
    }
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn render(&mut self, url: &str, timeout_ms: u64) -> Result<RenderedPage> {
        let nav = tokio::time::timeout(Duration::from_millis(timeout_ms), self.page.goto(url))
            .await;

        // A failed or slow navigation still leaves whatever did render in
        // the page; capture it rather than giving up on the request.
        match nav {
            Ok(Ok(_)) => {
                let _ = self.page.wait_for_navigation().await;
            }
            Ok(Err(e)) => warn!("navigation failed, capturing partial content: {e}"),
            Err(_) => warn!("navigation timed out after {timeout_ms}ms, capturing partial content"),
        }

        let html = self
            .eval_string("document.documentElement.outerHTML")
            .await
            .unwrap_or_default();
        let body_text = self
            .eval_string("document.body ? document.body.innerText : ''")
            .await
            .unwrap_or_default();
        let final_url = self
            .page
            .url()
            .await
            .ok()
            .flatten()
            .map(|u| u.to_string())
            .unwrap_or_else(|| url.to_string());
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
        let _ = self.page.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_chromium_render_captures_page() {
        let renderer = ChromiumRenderer::new()
            .await
            .expect("failed to create renderer");
        let mut ctx = renderer
            .new_context()
            .await
            .expect("failed to create context");

        let page = ctx
            .render(
                "data:text/html,<h1>Hello</h1><form action=\"/submit\"></form>",
                10000,
            )
            .await
            .expect("render failed");

        assert!(page.html.contains("<h1>Hello</h1>"));
        assert!(page.body_text.contains("Hello"));
        assert_eq!(page.form_actions, vec!["/submit".to_string()]);

        ctx.close().await.expect("close failed");
        assert_eq!(renderer.active_contexts(), 0);
        renderer.shutdown().await.expect("shutdown failed");
    }
}
