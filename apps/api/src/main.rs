mod config;
mod errors;
mod review;
mod routes;
mod search;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::review::ReviewEngine;
use crate::routes::build_router;
use crate::search::SearchEngine;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume-desk v{}", env!("CARGO_PKG_VERSION"));

    std::fs::create_dir_all(&config.data_dir)?;
    let review = Arc::new(ReviewEngine::new(&config.data_dir));
    info!(
        "Profile at {} (backup {}), reviews under {}",
        review.profiles().path().display(),
        review.profiles().backup_path().display(),
        review.suggestions().namespace_dir(None).display()
    );

    let search = Arc::new(SearchEngine::from_config(&config)?);
    info!(
        "Search sources ready (aggregator configured: {}, {} greenhouse boards, {} lever companies)",
        config.aggregator_url.is_some(),
        config.greenhouse_boards.len(),
        config.lever_companies.len()
    );

    let state = AppState { review, search };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Local single-user tool: bind to loopback only.
    let addr: SocketAddr = format!("127.0.0.1:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
