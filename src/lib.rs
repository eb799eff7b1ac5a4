// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Monthly Motivation: AI-written encouragement for activity dashboards
//!
//! This crate aggregates a user's monthly runs and walks, asks a
//! text-generation API for a short motivational message, and falls back to
//! rule-based messages whenever the API is unavailable.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{MotivationService, StatsAggregator};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub stats_aggregator: StatsAggregator,
    pub motivation_service: MotivationService,
}
