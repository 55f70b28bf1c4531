//! Anonymous sessions, post-circle summaries and safety reports.

pub mod models;
pub mod simulation;
pub mod summary;

pub use models::{SafetyReport, SessionSummary, UserSession};
pub use summary::{generate_session_summary, VALIDATION_FALLBACK};
