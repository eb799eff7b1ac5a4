// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cache of generated motivational messages.
//!
//! Entries are keyed by user and calendar month. A stored message is served
//! only while it is younger than the TTL and the month's activity totals
//! still match the snapshot it was generated from. The match is coarse: only
//! `total_activities` and `total_distance_meters` are compared, so an edit
//! that changes neither (e.g. a duration fix) is served from cache until the
//! TTL runs out.

use crate::models::{ActivityStats, MotivationalMessage};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Storage contract for generated messages.
///
/// The in-process map is fine for a single instance; a multi-instance
/// deployment can plug a shared key-value store in behind this trait.
pub trait MessageCache: Send + Sync {
    /// Return the cached message (marked `cached = true`) if still valid.
    fn get(&self, user_id: &str, stats: &ActivityStats) -> Option<MotivationalMessage>;

    /// Store `message` for the stats' month, replacing any previous entry.
    fn set(&self, user_id: &str, stats: &ActivityStats, message: MotivationalMessage);

    /// Drop every entry belonging to `user_id`.
    fn invalidate_all(&self, user_id: &str);

    /// Number of stored entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cache key: one entry per user and month.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub user_id: String,
    pub year: i32,
    pub month: u32,
}

impl CacheKey {
    pub fn new(user_id: &str, stats: &ActivityStats) -> Self {
        Self {
            user_id: user_id.to_string(),
            year: stats.year,
            month: stats.month,
        }
    }
}

/// Cached message with the stats it was generated from.
#[derive(Clone)]
pub struct CacheEntry {
    message: MotivationalMessage,
    stats: ActivityStats,
    created_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= ttl
    }

    fn matches(&self, stats: &ActivityStats) -> bool {
        self.stats.total_activities == stats.total_activities
            && self.stats.total_distance_meters == stats.total_distance_meters
    }
}

/// Process-local message cache shared across requests.
#[derive(Clone)]
pub struct InMemoryMessageCache {
    entries: Arc<DashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
}

impl InMemoryMessageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }
}

impl MessageCache for InMemoryMessageCache {
    fn get(&self, user_id: &str, stats: &ActivityStats) -> Option<MotivationalMessage> {
        let key = CacheKey::new(user_id, stats);
        let now = Instant::now();

        // Evict atomically so a concurrent `set` is never removed by mistake.
        let evicted = self.entries.remove_if(&key, |_, entry| {
            entry.is_expired(self.ttl, now) || !entry.matches(stats)
        });
        if evicted.is_some() {
            tracing::debug!(
                user_id,
                year = stats.year,
                month = stats.month,
                "Evicted stale motivation cache entry"
            );
            return None;
        }

        let entry = self.entries.get(&key)?;
        let mut message = entry.message.clone();
        message.cached = true;
        Some(message)
    }

    fn set(&self, user_id: &str, stats: &ActivityStats, message: MotivationalMessage) {
        self.entries.insert(
            CacheKey::new(user_id, stats),
            CacheEntry {
                message,
                stats: stats.clone(),
                created_at: Instant::now(),
            },
        );
    }

    fn invalidate_all(&self, user_id: &str) {
        self.entries.retain(|key, _| key.user_id != user_id);
        tracing::debug!(user_id, "Cleared motivation cache for user");
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DistanceUnit, Tone};
    use chrono::Utc;

    const TTL: Duration = Duration::from_secs(15 * 60);

    fn stats(month: u32, activities: u32, distance: f64) -> ActivityStats {
        ActivityStats {
            total_activities: activities,
            run_count: activities,
            walk_count: 0,
            mixed_count: 0,
            total_distance_meters: distance,
            total_duration_seconds: 0,
            total_duration: "PT0S".to_string(),
            month,
            year: 2024,
            days_elapsed: 30,
            days_remaining: 0,
            total_days_in_month: 30,
            distance_unit: DistanceUnit::Km,
        }
    }

    fn message(text: &str) -> MotivationalMessage {
        MotivationalMessage {
            message: text.to_string(),
            tone: Tone::Celebratory,
            generated_at: Utc::now(),
            model: "provider/model".to_string(),
            cached: false,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_trip_marks_cached() {
        let cache = InMemoryMessageCache::new(TTL);
        let s = stats(4, 5, 1000.0);
        cache.set("u1", &s, message("Great month"));

        let hit = cache.get("u1", &s).expect("should hit");
        assert_eq!(hit.message, "Great month");
        assert!(hit.cached);
        assert_eq!(hit.model, "provider/model");
    }

    #[tokio::test(start_paused = true)]
    async fn test_expires_after_ttl() {
        let cache = InMemoryMessageCache::new(TTL);
        let s = stats(4, 5, 1000.0);
        cache.set("u1", &s, message("Great month"));

        tokio::time::advance(TTL - Duration::from_secs(1)).await;
        assert!(cache.get("u1", &s).is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get("u1", &s).is_none());
        assert!(cache.is_empty(), "expired entry should be evicted");
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_count_drift_misses() {
        let cache = InMemoryMessageCache::new(TTL);
        cache.set("u1", &stats(4, 5, 1000.0), message("Great month"));

        assert!(cache.get("u1", &stats(4, 6, 1000.0)).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_distance_drift_misses() {
        let cache = InMemoryMessageCache::new(TTL);
        cache.set("u1", &stats(4, 5, 1000.0), message("Great month"));

        assert!(cache.get("u1", &stats(4, 5, 1000.5)).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_duration_change_still_hits() {
        let cache = InMemoryMessageCache::new(TTL);
        let original = stats(4, 5, 1000.0);
        cache.set("u1", &original, message("Great month"));

        let mut edited = original.clone();
        edited.total_duration_seconds = 999;
        assert!(cache.get("u1", &edited).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_per_user_and_month() {
        let cache = InMemoryMessageCache::new(TTL);
        cache.set("u1", &stats(4, 5, 1000.0), message("April"));
        cache.set("u1", &stats(5, 5, 1000.0), message("May"));
        cache.set("u2", &stats(4, 5, 1000.0), message("Other user"));

        assert_eq!(cache.get("u1", &stats(4, 5, 1000.0)).unwrap().message, "April");
        assert_eq!(cache.get("u1", &stats(5, 5, 1000.0)).unwrap().message, "May");
        assert_eq!(
            cache.get("u2", &stats(4, 5, 1000.0)).unwrap().message,
            "Other user"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_overwrites() {
        let cache = InMemoryMessageCache::new(TTL);
        let s = stats(4, 5, 1000.0);
        cache.set("u1", &s, message("first"));
        cache.set("u1", &s, message("second"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("u1", &s).unwrap().message, "second");
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_all_only_touches_one_user() {
        let cache = InMemoryMessageCache::new(TTL);
        cache.set("u1", &stats(4, 5, 1000.0), message("April"));
        cache.set("u1", &stats(5, 5, 1000.0), message("May"));
        cache.set("u2", &stats(4, 5, 1000.0), message("Other user"));

        cache.invalidate_all("u1");

        assert_eq!(cache.len(), 1);
        assert!(cache.get("u1", &stats(4, 5, 1000.0)).is_none());
        assert!(cache.get("u2", &stats(4, 5, 1000.0)).is_some());
    }

    #[tokio::test]
    async fn test_concurrent_writes_same_key() {
        let cache = InMemoryMessageCache::new(TTL);
        let s = stats(4, 5, 1000.0);

        let mut handles = vec![];
        for i in 0..10 {
            let cache = cache.clone();
            let s = s.clone();
            handles.push(tokio::spawn(async move {
                cache.set("u1", &s, message(&format!("writer {}", i)));
                cache.get("u1", &s)
            }));
        }

        for handle in handles {
            assert!(handle.await.expect("Task join failed").is_some());
        }
        assert_eq!(cache.len(), 1);
    }
}
