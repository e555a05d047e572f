//! Persistence: the hand-off store and saved trip plans.

pub mod handoff;
pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use handoff::MemoryHandoffStore;
pub use libsql_backend::LibSqlBackend;
pub use traits::{HandoffStore, PlanStore, SavedPlan, handoff_keys};
