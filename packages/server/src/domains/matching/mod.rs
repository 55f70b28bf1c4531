//! Anonymous peer matching: queue, compatibility scoring and the pass
//! scheduler that forms circles.

pub mod compatibility;
pub mod engine;
pub mod models;
pub mod queue;

pub use engine::MatchingService;
pub use models::{ComfortLevel, EmotionalTheme, MatchRequest};
pub use queue::{BaseMatchQueue, RedisMatchQueue, TestMatchQueue};
