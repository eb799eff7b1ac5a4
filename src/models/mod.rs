// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod message;
pub mod stats;

pub use activity::{ActivityRecord, ActivityType};
pub use message::{MotivationalMessage, Tone, FALLBACK_MODEL};
pub use stats::{ActivityStats, DistanceUnit};
