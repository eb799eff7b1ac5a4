// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity record model as delivered by the data store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of activity logged by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Run,
    Walk,
    Mixed,
}

/// A single logged activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Calendar day the activity took place
    pub date: NaiveDate,
    /// Run, walk or mixed
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    /// Duration as entered: "01:30:00", "PT1H30M" or "1 hour 30 minutes"
    pub duration: String,
    /// Distance in meters, if recorded
    #[serde(default)]
    pub distance_meters: Option<f64>,
}

impl ActivityRecord {
    pub fn new(
        date: NaiveDate,
        activity_type: ActivityType,
        duration: impl Into<String>,
        distance_meters: Option<f64>,
    ) -> Self {
        Self {
            date,
            activity_type,
            duration: duration.into(),
            distance_meters,
        }
    }
}
