// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Items API Service
//!
//! ## Configuration
//!
//! - `API_KEY`: Shared key for write routes (default: default123)
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8001)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use items_api::{config::Config, router, AppState};

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

    let config = Config::load(Some("items"))?;
    info!(bind_addr = %config.bind_addr, "Starting items API");

    let addr: SocketAddr = config.bind_addr.parse()?;
    let app = router(Arc::new(AppState::new(config)));

    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
