//! Environment readiness check.

use crate::config::Config;
use crate::renderer::chromium::find_chromium;
use anyhow::Result;

/// Check Chromium availability and endpoint configuration.
pub async fn run() -> Result<()> {
    println!("Sphinx Doctor");
    println!("=============");
    println!();

    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    let chromium_path = find_chromium();
    match &chromium_path {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Set SPHINX_CHROMIUM_PATH or install a system Chrome; \
             rendering will be HTTP-only."
        ),
    }

    let config = Config::from_env();
    if config.secret_is_default() {
        println!("[!!] SPHINX_SECRET is unset (placeholder secret in effect)");
    } else {
        println!("[OK] Shared secret configured");
    }

    match &config.oracle {
        Some(oracle) => println!("[OK] Inference backend configured (model: {})", oracle.model),
        None => println!("[??] No inference backend (SPHINX_ORACLE_API_KEY unset) — oracle fallback disabled"),
    }

    println!();
    if chromium_path.is_some() {
        println!("Status: READY");
    } else {
        println!("Status: DEGRADED (http-only rendering)");
    }

    Ok(())
}
