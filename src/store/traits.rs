//! Storage traits used by the submission pipeline and the results screen.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::llm::Recommendations;
use crate::questionnaire::summary::ResolvedAnswer;

/// Keys of the hand-off store read by the results screen.
pub mod handoff_keys {
    /// Plain-text trip summary of the last submission.
    pub const TRIP_SUMMARY: &str = "tripSummary";
    /// User-facing error of the last submission, if it failed.
    pub const TRIP_ERROR: &str = "tripError";
    /// Id of the plan saved by the last successful submission.
    pub const LAST_PLAN_ID: &str = "lastPlanId";

    /// Everything a new questionnaire run starts without.
    pub const ALL: [&str; 3] = [TRIP_SUMMARY, TRIP_ERROR, LAST_PLAN_ID];
}

/// String blobs that outlive the questionnaire and are read by whatever
/// screen comes next.
#[async_trait]
pub trait HandoffStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, DatabaseError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError>;

    /// Returns whether the key existed.
    async fn remove(&self, key: &str) -> Result<bool, DatabaseError>;

    async fn remove_many(&self, keys: &[&str]) -> Result<(), DatabaseError> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }
}

/// A persisted questionnaire outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPlan {
    pub id: Uuid,
    pub user_id: String,
    pub summary: String,
    pub answers: Vec<ResolvedAnswer>,
    pub recommendations: Recommendations,
    pub created_at: DateTime<Utc>,
}

/// Processes and stores the outcome of a submission.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Persist a submission for `user_id`.
    async fn process(
        &self,
        user_id: &str,
        answers: &[ResolvedAnswer],
        summary: &str,
        recommendations: &Recommendations,
    ) -> Result<SavedPlan, DatabaseError>;

    async fn get_plan(&self, id: Uuid) -> Result<Option<SavedPlan>, DatabaseError>;
}
