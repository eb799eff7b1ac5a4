// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::response::Response;
use monthly_motivation::config::Config;
use monthly_motivation::db::ActivityStore;
use monthly_motivation::middleware::auth::create_jwt;
use monthly_motivation::routes::create_router;
use monthly_motivation::services::ai_client::mock::ScriptedTransport;
use monthly_motivation::services::ai_client::ClientSettings;
use monthly_motivation::services::{
    InMemoryMessageCache, MotivationService, ResilientClient, StatsAggregator,
};
use monthly_motivation::AppState;
use std::sync::Arc;

/// Create a test app backed by an in-memory store and a scripted API.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(transport: Arc<ScriptedTransport>) -> (axum::Router, Arc<AppState>) {
    create_test_app_with_store(transport, ActivityStore::new())
}

/// Same as [`create_test_app`] with a caller-provided store.
#[allow(dead_code)]
pub fn create_test_app_with_store(
    transport: Arc<ScriptedTransport>,
    store: ActivityStore,
) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();

    let client = ResilientClient::new(transport, ClientSettings::from(&config.ai));
    let cache = Arc::new(InMemoryMessageCache::new(config.ai.cache_ttl()));
    let motivation_service = MotivationService::new(client, cache, config.ai.enabled);
    let stats_aggregator = StatsAggregator::new(Arc::new(store));

    let state = Arc::new(AppState {
        config,
        stats_aggregator,
        motivation_service,
    });

    (create_router(state.clone()), state)
}

/// Create a session token for the test signing key.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    create_jwt(user_id, signing_key).expect("Failed to create JWT")
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}
