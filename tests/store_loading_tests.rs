// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::NaiveDate;
use monthly_motivation::db::ActivityStore;
use monthly_motivation::models::DistanceUnit;
use monthly_motivation::services::StatsAggregator;
use std::sync::Arc;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_sample_data_aggregates_leap_february() {
    let store = ActivityStore::load_from_file("data/activities.sample.json")
        .expect("Failed to load sample data");
    assert_eq!(store.count_for_user("demo-user"), 6);
    assert_eq!(store.count_for_user("new-user"), 0);

    let aggregator = StatsAggregator::new(Arc::new(store));
    let stats = aggregator
        .aggregate("demo-user", day(2024, 2, 10), DistanceUnit::Km, day(2024, 6, 1))
        .await
        .unwrap();

    assert_eq!(stats.total_activities, 5);
    assert_eq!(stats.run_count, 2);
    assert_eq!(stats.walk_count, 2);
    assert_eq!(stats.mixed_count, 1);
    assert!((stats.total_distance_meters - 20_850.5).abs() < 1e-9);
    // 32:10 + 65:00 + 45:00 + 62:00 + 40:00
    assert_eq!(stats.total_duration_seconds, 14_650);
    assert_eq!(stats.total_days_in_month, 29);
    assert_eq!(stats.days_elapsed, 29);
    assert_eq!(stats.days_remaining, 0);
    assert!(stats.validate().is_ok());
}

#[tokio::test]
async fn test_unknown_user_has_empty_month() {
    let store = ActivityStore::load_from_file("data/activities.sample.json").unwrap();
    let aggregator = StatsAggregator::new(Arc::new(store));

    let stats = aggregator
        .aggregate("nobody", day(2024, 3, 1), DistanceUnit::Mi, day(2024, 3, 10))
        .await
        .unwrap();

    assert_eq!(stats.total_activities, 0);
    assert_eq!(stats.days_elapsed, 10);
    assert_eq!(stats.days_remaining, 21);
    assert_eq!(stats.distance_unit, DistanceUnit::Mi);
}

#[test]
fn test_missing_file_is_data_access_error() {
    let result = ActivityStore::load_from_file("data/does-not-exist.json");
    assert!(matches!(
        result,
        Err(monthly_motivation::error::InsightError::DataAccess(_))
    ));
}
