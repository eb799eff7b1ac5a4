//! Monthly activity statistics fed to the insight generator.
//!
//! Produced by the stats aggregator from raw activity records, consumed by
//! the prompt builder, the fallback policy and the message cache.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::InsightError;
use crate::time_utils::days_in_month;

/// Oldest and newest years accepted by [`ActivityStats::validate`].
pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2100;

const METERS_PER_KM: f64 = 1000.0;
const METERS_PER_MILE: f64 = 1609.344;

/// Unit the user prefers for distances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Km,
    Mi,
}

impl DistanceUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceUnit::Km => "km",
            DistanceUnit::Mi => "mi",
        }
    }

    /// Convert meters into this unit.
    pub fn from_meters(&self, meters: f64) -> f64 {
        match self {
            DistanceUnit::Km => meters / METERS_PER_KM,
            DistanceUnit::Mi => meters / METERS_PER_MILE,
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "km" => Ok(DistanceUnit::Km),
            "mi" => Ok(DistanceUnit::Mi),
            other => Err(format!("unknown distance unit '{}'", other)),
        }
    }
}

/// Aggregated statistics for one user and one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    // ─── Counts ──────────────────────────────────────────────────
    pub total_activities: u32,
    pub run_count: u32,
    pub walk_count: u32,
    pub mixed_count: u32,

    // ─── Totals ──────────────────────────────────────────────────
    pub total_distance_meters: f64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_duration_seconds: u64,
    /// Total duration re-encoded in designator form ("PT3H20M")
    pub total_duration: String,

    // ─── Calendar ────────────────────────────────────────────────
    pub month: u32,
    pub year: i32,
    pub days_elapsed: u32,
    pub days_remaining: u32,
    pub total_days_in_month: u32,

    pub distance_unit: DistanceUnit,
}

impl ActivityStats {
    /// Check the shape contract expected by the insight generator.
    pub fn validate(&self) -> Result<(), InsightError> {
        if !(1..=12).contains(&self.month) {
            return Err(InsightError::Validation(format!(
                "month must be between 1 and 12, got {}",
                self.month
            )));
        }

        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            return Err(InsightError::Validation(format!(
                "year must be between {} and {}, got {}",
                MIN_YEAR, MAX_YEAR, self.year
            )));
        }

        let by_type = self.run_count as u64 + self.walk_count as u64 + self.mixed_count as u64;
        if by_type != self.total_activities as u64 {
            return Err(InsightError::Validation(format!(
                "activity counts by type ({}) do not sum to total ({})",
                by_type, self.total_activities
            )));
        }

        if !self.total_distance_meters.is_finite() || self.total_distance_meters < 0.0 {
            return Err(InsightError::Validation(
                "total distance must be a non-negative number".to_string(),
            ));
        }

        let expected_days = days_in_month(self.year, self.month).unwrap_or(0);
        if self.total_days_in_month != expected_days {
            return Err(InsightError::Validation(format!(
                "{}-{:02} has {} days, got {}",
                self.year, self.month, expected_days, self.total_days_in_month
            )));
        }

        if self.days_elapsed as u64 + self.days_remaining as u64 != self.total_days_in_month as u64
        {
            return Err(InsightError::Validation(
                "days elapsed and remaining must add up to the month length".to_string(),
            ));
        }

        Ok(())
    }

    /// Total distance in the user's preferred unit.
    pub fn distance_in_unit(&self) -> f64 {
        self.distance_unit.from_meters(self.total_distance_meters)
    }
}
