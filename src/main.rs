// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Monthly Motivation API Server
//!
//! Serves monthly activity stats and AI-written motivational messages
//! for the activity dashboard.

use monthly_motivation::{
    config::Config,
    db::ActivityStore,
    services::{InMemoryMessageCache, MotivationService, StatsAggregator},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Monthly Motivation API");

    // Load activity data
    let store = match &config.activity_data_path {
        Some(path) => {
            tracing::info!(path = %path, "Loading activity data");
            ActivityStore::load_from_file(path)?
        }
        None => ActivityStore::new(),
    };
    let stats_aggregator = StatsAggregator::new(Arc::new(store));

    // Initialize the message cache, shared by every request in this process
    let cache = Arc::new(InMemoryMessageCache::new(config.ai.cache_ttl()));
    tracing::info!(ttl_ms = config.ai.cache_ttl_ms, "Motivation cache initialized");

    let motivation_service = MotivationService::from_config(&config.ai, cache)?;
    tracing::info!(
        enabled = config.ai.enabled,
        model = %config.ai.model,
        timeout_ms = config.ai.timeout_ms,
        max_retries = config.ai.max_retries,
        "Motivation service initialized"
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        stats_aggregator,
        motivation_service,
    });

    // Build router
    let app = monthly_motivation::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("monthly_motivation=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
