// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Monthly stats aggregation.
//!
//! Reduces a user's activity records for one calendar month into
//! [`ActivityStats`]. Durations are normalized to seconds regardless of how
//! they were entered; a record whose duration cannot be parsed still counts
//! as an activity but contributes zero seconds.

use crate::db::ActivitySource;
use crate::error::InsightError;
use crate::models::{ActivityRecord, ActivityStats, ActivityType, DistanceUnit};
use crate::services::duration::{format_designator, parse_duration_seconds};
use crate::time_utils::month_bounds;
use chrono::{Datelike, NaiveDate, Utc};
use std::sync::Arc;

/// Builds monthly statistics from an activity source.
#[derive(Clone)]
pub struct StatsAggregator {
    source: Arc<dyn ActivitySource>,
}

impl StatsAggregator {
    pub fn new(source: Arc<dyn ActivitySource>) -> Self {
        Self { source }
    }

    /// Aggregate the month containing `reference`, using today's UTC date
    /// to decide how much of the month has elapsed.
    pub async fn aggregate_month(
        &self,
        user_id: &str,
        reference: NaiveDate,
        unit: DistanceUnit,
    ) -> Result<ActivityStats, InsightError> {
        self.aggregate(user_id, reference, unit, Utc::now().date_naive())
            .await
    }

    /// Aggregate the month containing `reference` as seen from `today`.
    ///
    /// Data store failures propagate; no retries are attempted here.
    pub async fn aggregate(
        &self,
        user_id: &str,
        reference: NaiveDate,
        unit: DistanceUnit,
        today: NaiveDate,
    ) -> Result<ActivityStats, InsightError> {
        let (first, last) = month_bounds(reference);

        let records = self
            .source
            .fetch_activities(user_id, first, last)
            .await
            .map_err(|e| match e {
                InsightError::DataAccess(_) => e,
                other => InsightError::DataAccess(other.to_string()),
            })?;

        tracing::debug!(
            user_id,
            from = %first,
            to = %last,
            count = records.len(),
            "Fetched activities for aggregation"
        );

        Ok(summarize(&records, reference, unit, today))
    }
}

/// Reduce records into stats for the month containing `reference`.
pub fn summarize(
    records: &[ActivityRecord],
    reference: NaiveDate,
    unit: DistanceUnit,
    today: NaiveDate,
) -> ActivityStats {
    let (_, last) = month_bounds(reference);
    let total_days_in_month = last.day();

    let is_current_month = reference.year() == today.year() && reference.month() == today.month();
    let days_elapsed = if is_current_month {
        today.day()
    } else {
        total_days_in_month
    };

    let mut stats = ActivityStats {
        total_activities: 0,
        run_count: 0,
        walk_count: 0,
        mixed_count: 0,
        total_distance_meters: 0.0,
        total_duration_seconds: 0,
        total_duration: String::new(),
        month: reference.month(),
        year: reference.year(),
        days_elapsed,
        days_remaining: total_days_in_month - days_elapsed,
        total_days_in_month,
        distance_unit: unit,
    };

    for record in records {
        stats.total_activities += 1;
        match record.activity_type {
            ActivityType::Run => stats.run_count += 1,
            ActivityType::Walk => stats.walk_count += 1,
            ActivityType::Mixed => stats.mixed_count += 1,
        }

        stats.total_distance_meters += record
            .distance_meters
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(0.0);

        match parse_duration_seconds(&record.duration) {
            Some(secs) => {
                stats.total_duration_seconds = stats.total_duration_seconds.saturating_add(secs)
            }
            None => {
                tracing::warn!(
                    date = %record.date,
                    duration = %record.duration,
                    "Unparsable activity duration, counting as zero"
                );
            }
        }
    }

    stats.total_duration = format_designator(stats.total_duration_seconds);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ActivityStore;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(date: NaiveDate, kind: ActivityType, duration: &str, dist: Option<f64>) -> ActivityRecord {
        ActivityRecord::new(date, kind, duration, dist)
    }

    #[test]
    fn test_summarize_counts_and_totals() {
        let records = vec![
            record(day(2024, 2, 1), ActivityType::Run, "01:30:00", Some(10_000.0)),
            record(day(2024, 2, 3), ActivityType::Walk, "PT1H30M", None),
            record(day(2024, 2, 5), ActivityType::Mixed, "1 hour 30 minutes", Some(2_500.5)),
            record(day(2024, 2, 7), ActivityType::Run, "PT20M", Some(4_000.0)),
        ];

        let stats = summarize(&records, day(2024, 2, 15), DistanceUnit::Km, day(2025, 6, 1));

        assert_eq!(stats.total_activities, 4);
        assert_eq!(stats.run_count, 2);
        assert_eq!(stats.walk_count, 1);
        assert_eq!(stats.mixed_count, 1);
        assert_eq!(
            stats.run_count + stats.walk_count + stats.mixed_count,
            stats.total_activities
        );
        assert_eq!(stats.total_distance_meters, 16_500.5);
        assert_eq!(stats.total_duration_seconds, 3 * 5400 + 1200);
        assert_eq!(stats.total_duration, "PT4H50M");
    }

    #[test]
    fn test_unparsable_duration_counts_zero_seconds() {
        let records = vec![
            record(day(2024, 3, 1), ActivityType::Run, "forever", Some(1000.0)),
            record(day(2024, 3, 2), ActivityType::Run, "00:10:00", None),
        ];

        let stats = summarize(&records, day(2024, 3, 1), DistanceUnit::Km, day(2024, 4, 1));

        assert_eq!(stats.total_activities, 2);
        assert_eq!(stats.total_duration_seconds, 600);
        assert_eq!(stats.total_distance_meters, 1000.0);
    }

    #[test]
    fn test_huge_durations_do_not_abort_aggregation() {
        let records = vec![
            record(day(2024, 3, 1), ActivityType::Run, "9999999999999999999:00:00", None),
            record(day(2024, 3, 2), ActivityType::Walk, "PT99999999999999999999H", None),
            record(day(2024, 3, 3), ActivityType::Walk, "PT99999999999999999999H", None),
            record(day(2024, 3, 4), ActivityType::Run, "00:10:00", None),
        ];

        let stats = summarize(&records, day(2024, 3, 1), DistanceUnit::Km, day(2024, 4, 1));

        assert_eq!(stats.total_activities, 4);
        assert_eq!(stats.total_duration_seconds, u64::MAX);
        assert!(stats.validate().is_ok());
    }

    #[test]
    fn test_current_month_uses_today() {
        let stats = summarize(&[], day(2024, 2, 1), DistanceUnit::Mi, day(2024, 2, 10));

        assert_eq!(stats.total_days_in_month, 29);
        assert_eq!(stats.days_elapsed, 10);
        assert_eq!(stats.days_remaining, 19);
        assert_eq!(stats.distance_unit, DistanceUnit::Mi);
        assert_eq!(stats.total_duration, "PT0S");
    }

    #[test]
    fn test_past_month_fully_elapsed() {
        let stats = summarize(&[], day(2025, 2, 14), DistanceUnit::Km, day(2025, 3, 2));

        assert_eq!(stats.total_days_in_month, 28);
        assert_eq!(stats.days_elapsed, 28);
        assert_eq!(stats.days_remaining, 0);
    }

    #[test]
    fn test_same_month_other_year_is_past() {
        let stats = summarize(&[], day(2023, 7, 4), DistanceUnit::Km, day(2024, 7, 4));
        assert_eq!(stats.days_elapsed, 31);
        assert_eq!(stats.days_remaining, 0);
    }

    #[test]
    fn test_day_split_always_covers_month() {
        for month in 1..=12 {
            for today_day in [1, 15, 28] {
                let today = day(2024, month, today_day);
                let stats = summarize(&[], today, DistanceUnit::Km, today);
                assert_eq!(
                    stats.days_elapsed + stats.days_remaining,
                    stats.total_days_in_month
                );
                assert!(stats.validate().is_ok());
            }
        }
    }

    #[tokio::test]
    async fn test_aggregate_fetches_only_reference_month() {
        let store = ActivityStore::new();
        store
            .insert("u1", record(day(2024, 1, 31), ActivityType::Run, "PT1H", Some(100.0)))
            .unwrap();
        store
            .insert("u1", record(day(2024, 2, 29), ActivityType::Walk, "PT1H", Some(200.0)))
            .unwrap();
        store
            .insert("u1", record(day(2024, 3, 1), ActivityType::Run, "PT1H", Some(400.0)))
            .unwrap();

        let aggregator = StatsAggregator::new(Arc::new(store));
        let stats = aggregator
            .aggregate("u1", day(2024, 2, 10), DistanceUnit::Km, day(2024, 6, 1))
            .await
            .unwrap();

        assert_eq!(stats.total_activities, 1);
        assert_eq!(stats.walk_count, 1);
        assert_eq!(stats.total_distance_meters, 200.0);
        assert_eq!(stats.month, 2);
        assert_eq!(stats.year, 2024);
    }

    #[tokio::test]
    async fn test_aggregate_propagates_data_access_error() {
        let aggregator = StatsAggregator::new(Arc::new(ActivityStore::new_offline()));
        let result = aggregator
            .aggregate("u1", day(2024, 2, 10), DistanceUnit::Km, day(2024, 6, 1))
            .await;

        assert!(matches!(result, Err(InsightError::DataAccess(_))));
    }
}
