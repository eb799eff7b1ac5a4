//! Activity data access layer.

pub mod store;

pub use store::ActivityStore;

use crate::error::InsightError;
use crate::models::ActivityRecord;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Read access to a user's logged activities.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Fetch every activity dated between `from_inclusive` and `to_inclusive`.
    async fn fetch_activities(
        &self,
        user_id: &str,
        from_inclusive: NaiveDate,
        to_inclusive: NaiveDate,
    ) -> Result<Vec<ActivityRecord>, InsightError>;
}
