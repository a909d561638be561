// US Trade Dashboard - Web Server
// REST API with Axum over a snapshot loaded once at startup

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use trade_dashboard::api::{router, AppState};
use trade_dashboard::{DashboardConfig, Dataset};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("🌐 US Trade Dashboard - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Optional config path as the only argument
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = DashboardConfig::load(config_path.as_deref())?;

    let dataset = Dataset::load(&config)
        .with_context(|| format!("Failed to load trade tables from {:?}", config.data_dir))?;
    println!(
        "✓ Loaded {} export rows, {} import rows ({} skipped)",
        dataset.exports.len(),
        dataset.imports.len(),
        dataset.skipped.len()
    );

    let addr = config.bind_addr.clone();
    let app = router(AppState::new(dataset, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!(addr = %addr, "listening");

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/overview", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
