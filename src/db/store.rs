// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory activity store.
//!
//! Stands in for the real activity database: records are keyed by user ID
//! and can be seeded from a JSON file of the form
//! `{ "<user_id>": [ { "date": ..., "type": ..., "duration": ... } ] }`.

use crate::db::ActivitySource;
use crate::error::InsightError;
use crate::models::ActivityRecord;
use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Activity store shared across requests.
#[derive(Clone)]
pub struct ActivityStore {
    records: Option<Arc<DashMap<String, Vec<ActivityRecord>>>>,
}

impl Default for ActivityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: Some(Arc::new(DashMap::new())),
        }
    }

    /// Create a store that fails every read (offline mode, for tests).
    pub fn new_offline() -> Self {
        Self { records: None }
    }

    /// Load records from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, InsightError> {
        let json_data = fs::read_to_string(path.as_ref())
            .map_err(|e| InsightError::DataAccess(format!("Failed to read file: {}", e)))?;
        Self::load_from_json(&json_data)
    }

    /// Load records from a JSON string.
    pub fn load_from_json(json_data: &str) -> Result<Self, InsightError> {
        let parsed: HashMap<String, Vec<ActivityRecord>> = serde_json::from_str(json_data)
            .map_err(|e| InsightError::DataAccess(format!("Failed to parse activities: {}", e)))?;

        let store = Self::new();
        let mut count = 0;
        for (user_id, records) in parsed {
            count += records.len();
            for record in records {
                store.insert(&user_id, record)?;
            }
        }

        tracing::info!(count, "Loaded activity records");
        Ok(store)
    }

    fn get_records(&self) -> Result<&DashMap<String, Vec<ActivityRecord>>, InsightError> {
        self.records.as_deref().ok_or_else(|| {
            InsightError::DataAccess("Activity store not connected (offline mode)".to_string())
        })
    }

    /// Add a record for a user.
    pub fn insert(&self, user_id: &str, record: ActivityRecord) -> Result<(), InsightError> {
        self.get_records()?
            .entry(user_id.to_string())
            .or_default()
            .push(record);
        Ok(())
    }

    /// Number of records stored for a user.
    pub fn count_for_user(&self, user_id: &str) -> usize {
        self.records
            .as_ref()
            .and_then(|r| r.get(user_id).map(|v| v.len()))
            .unwrap_or(0)
    }
}

#[async_trait]
impl ActivitySource for ActivityStore {
    async fn fetch_activities(
        &self,
        user_id: &str,
        from_inclusive: NaiveDate,
        to_inclusive: NaiveDate,
    ) -> Result<Vec<ActivityRecord>, InsightError> {
        let records = self.get_records()?;

        let mut matching: Vec<ActivityRecord> = records
            .get(user_id)
            .map(|list| {
                list.iter()
                    .filter(|r| r.date >= from_inclusive && r.date <= to_inclusive)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        matching.sort_by_key(|r| r.date);
        Ok(matching)
    }
}
