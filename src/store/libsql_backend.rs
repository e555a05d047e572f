//! libSQL backend for the hand-off store and saved trip plans.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, Row, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::llm::Recommendations;
use crate::questionnaire::summary::ResolvedAnswer;
use crate::store::migrations;
use crate::store::traits::{HandoffStore, PlanStore, SavedPlan};

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests and throwaway runs).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;
        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;
        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 timestamp written by this backend.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn row_to_plan(row: &Row) -> Result<SavedPlan, DatabaseError> {
    let column = |i: i32| {
        row.get::<String>(i)
            .map_err(|e| DatabaseError::Query(format!("trip_plans column {i}: {e}")))
    };
    let id = column(0)?;
    let answers = column(3)?;
    let recommendations = column(4)?;

    Ok(SavedPlan {
        id: Uuid::parse_str(&id).map_err(|e| DatabaseError::Serialization(e.to_string()))?,
        user_id: column(1)?,
        summary: column(2)?,
        answers: serde_json::from_str(&answers)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?,
        recommendations: serde_json::from_str(&recommendations)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?,
        created_at: parse_datetime(&column(5)?),
    })
}

const PLAN_COLUMNS: &str = "id, user_id, summary, answers, recommendations, created_at";

// ── Hand-off ────────────────────────────────────────────────────────

#[async_trait]
impl HandoffStore for LibSqlBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT value FROM handoff WHERE key = ?1", params![key])
            .await
            .map_err(|e| DatabaseError::Query(format!("handoff get: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => row
                .get::<String>(0)
                .map(Some)
                .map_err(|e| DatabaseError::Query(format!("handoff get: {e}"))),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("handoff get: {e}"))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        let now = Utc::now().to_rfc3339();
        self.conn()
            .execute(
                "INSERT INTO handoff (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT (key) DO UPDATE SET value = ?2, updated_at = ?3",
                params![key, value, now],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("handoff set: {e}")))?;
        debug!(key, "Hand-off value stored");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, DatabaseError> {
        let count = self
            .conn()
            .execute("DELETE FROM handoff WHERE key = ?1", params![key])
            .await
            .map_err(|e| DatabaseError::Query(format!("handoff remove: {e}")))?;
        Ok(count > 0)
    }
}

// ── Trip plans ──────────────────────────────────────────────────────

#[async_trait]
impl PlanStore for LibSqlBackend {
    async fn process(
        &self,
        user_id: &str,
        answers: &[ResolvedAnswer],
        summary: &str,
        recommendations: &Recommendations,
    ) -> Result<SavedPlan, DatabaseError> {
        let plan = SavedPlan {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            summary: summary.to_string(),
            answers: answers.to_vec(),
            recommendations: recommendations.clone(),
            created_at: Utc::now(),
        };
        let answers_json = serde_json::to_string(&plan.answers)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;
        let recommendations_json = serde_json::to_string(&plan.recommendations)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;

        self.conn()
            .execute(
                "INSERT INTO trip_plans (id, user_id, summary, answers, recommendations, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    plan.id.to_string(),
                    user_id,
                    summary,
                    answers_json,
                    recommendations_json,
                    plan.created_at.to_rfc3339()
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert trip plan: {e}")))?;

        info!(plan_id = %plan.id, user_id, "Trip plan saved");
        Ok(plan)
    }

    async fn get_plan(&self, id: Uuid) -> Result<Option<SavedPlan>, DatabaseError> {
        let sql = format!("SELECT {PLAN_COLUMNS} FROM trip_plans WHERE id = ?1");
        let mut rows = self
            .conn()
            .query(&sql, params![id.to_string()])
            .await
            .map_err(|e| DatabaseError::Query(format!("get_plan: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_plan(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_plan: {e}"))),
        }
    }
}
