//! Kernel module - server infrastructure and dependencies.

pub mod ai;
pub mod clock;
pub mod deps;
pub mod push;
pub mod scheduled_tasks;
pub mod test_dependencies;
pub mod traits;

pub use ai::OpenAiClient;
pub use clock::{Clock, FixedClock, SystemClock};
pub use deps::{AgoraAdapter, ServerDeps};
pub use push::{
    session_subject, BasePushChannel, NatsPushChannel, NoopPushChannel, PublishedMessage,
    TestPushChannel,
};
pub use scheduled_tasks::start_scheduler;
pub use test_dependencies::{MockVoiceService, TestAi, TestCircleStore};
pub use traits::*;
