//! Error types for the trail planner.

use std::time::Duration;

use crate::questionnaire::model::{QuestionId, QuestionKind};

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Recommendation provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited (429), retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },
}

impl LlmError {
    /// Whether the provider refused the request for capacity or quota reasons.
    ///
    /// Providers report this inconsistently, so besides the typed variant the
    /// rendered message is searched for `429` and `quota`.
    pub fn is_capacity_exhausted(&self) -> bool {
        if matches!(self, Self::RateLimited { .. }) {
            return true;
        }
        let text = self.to_string();
        text.contains("429") || text.contains("quota")
    }
}

/// Summary rendering errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SummaryError {
    #[error("Answer set has no entry for question {0}")]
    MissingQuestion(QuestionId),

    #[error("Question {id} expected a {expected} answer, found {found}")]
    ShapeMismatch {
        id: QuestionId,
        expected: QuestionKind,
        found: QuestionKind,
    },
}

/// Failures of the submission pipeline, one per stage.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Failed to render summary: {0}")]
    Format(#[from] SummaryError),

    #[error("Recommendation generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("User not authenticated")]
    Unauthenticated,

    #[error("Failed to persist trip plan: {0}")]
    Persistence(#[from] DatabaseError),
}

/// Shown when the answers could not be turned into a summary.
pub const FORMAT_FAILURE_MESSAGE: &str = "Failed to format your preferences. Please try again.";

/// Shown when the recommendation service is out of capacity.
pub const CAPACITY_FAILURE_MESSAGE: &str = "We're experiencing high demand right now. The trip recommendation service has reached its limit. Please try again later or contact support if this persists.";

/// Shown for every other submission failure.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate trip recommendations. Please try again.";

impl SubmitError {
    /// The message the results screen shows for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Format(_) => FORMAT_FAILURE_MESSAGE,
            Self::Generation(e) if e.is_capacity_exhausted() => CAPACITY_FAILURE_MESSAGE,
            Self::Generation(_) | Self::Unauthenticated | Self::Persistence(_) => {
                GENERIC_FAILURE_MESSAGE
            }
        }
    }
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
