// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod ai_client;
pub mod cache;
pub mod duration;
pub mod fallback;
pub mod motivation;
pub mod prompt;
pub mod stats;

pub use ai_client::{GenerateOptions, HttpTransport, ResilientClient};
pub use cache::{InMemoryMessageCache, MessageCache};
pub use motivation::MotivationService;
pub use stats::StatsAggregator;
