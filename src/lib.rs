//! Trail Planner: trip-preference questionnaire and trail recommendations.

pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod llm;
pub mod questionnaire;
pub mod routes;
pub mod store;
