// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Portfolio Backend Service
//!
//! ## Configuration
//!
//! Defaults can be overridden by a `portfolio.{toml,yaml,json}` file in the
//! working directory (or the file named by `PORTFOLIO_CONFIG`) and by
//! `PORTFOLIO__*` environment variables:
//!
//! - `PORTFOLIO__BIND_ADDR`: Server bind address (default: 0.0.0.0:8000)
//! - `PORTFOLIO__DATABASE_URL`: SQLite URL (default: sqlite://portfolio.db?mode=rwc)
//! - `PORTFOLIO__ADMIN_API_KEY`: Admin shared secret
//! - `PORTFOLIO__RATE_LIMIT__MAX_SUBMISSIONS`: Submissions per window (default: 5)
//! - `PORTFOLIO__RATE_LIMIT__WINDOW_SECS`: Window length (default: 3600)
//! - `PORTFOLIO__SPAM__DENYLIST`: Comma-separated spam phrases

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use portfolio_api::{config::Config, db::Database, handlers::router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config_path = std::env::var("PORTFOLIO_CONFIG").unwrap_or_else(|_| "portfolio".to_string());
    let config = Config::load(Some(&config_path))?;
    info!(
        bind_addr = %config.bind_addr,
        max_submissions = config.rate_limit.max_submissions,
        window_secs = config.rate_limit.window_secs,
        max_tracked_sources = config.rate_limit.max_tracked_sources,
        spam_phrases = config.spam.denylist.len(),
        "Starting portfolio backend"
    );

    let db = Database::connect(&config.database_url).await?;
    let state = Arc::new(AppState::new(config.clone(), db)?);

    // Spawn sweep task
    let sweep_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_state.config.rate_limit.sweep_interval());
        loop {
            interval.tick().await;
            let now = sweep_state.gate.clock().now();
            sweep_state.gate.sweep(now);
            sweep_state
                .metrics
                .set_tracked_sources(sweep_state.gate.tracked_sources());
        }
    });

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
