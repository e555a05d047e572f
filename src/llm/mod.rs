//! Recommendation generation.
//!
//! The questionnaire only needs one thing from a model: turn the trip summary
//! into trail recommendations. [`RecommendationGenerator`] is that seam;
//! [`GeminiGenerator`] is the production implementation.

pub mod gemini;
pub mod prompts;

pub use gemini::GeminiGenerator;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// What the generator returned for one summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    /// Model that produced the content.
    pub model: String,
    /// Parsed JSON when the model returned JSON, otherwise the raw text as a
    /// JSON string.
    pub content: serde_json::Value,
    pub generated_at: DateTime<Utc>,
}

impl Recommendations {
    pub fn new(model: &str, content: serde_json::Value) -> Self {
        Self {
            model: model.to_string(),
            content,
            generated_at: Utc::now(),
        }
    }
}

/// Produces trail recommendations from a plain-text trip summary.
#[async_trait]
pub trait RecommendationGenerator: Send + Sync {
    fn model_name(&self) -> &str;

    async fn generate(&self, summary: &str) -> Result<Recommendations, LlmError>;
}

/// Tuning for generation requests.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            temperature: 0.4,
            max_output_tokens: 4096,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Connection settings for the Gemini API.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: secrecy::SecretString,
    pub model: String,
    pub base_url: String,
}

/// Create the recommendation generator from configuration.
pub fn create_generator(
    config: &LlmConfig,
    tuning: GeneratorConfig,
) -> Result<Arc<dyn RecommendationGenerator>, LlmError> {
    let generator = GeminiGenerator::new(config, tuning)?;
    tracing::info!("Using Gemini (model: {})", config.model);
    Ok(Arc::new(generator))
}
