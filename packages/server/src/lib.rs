// Circle Matching Service - API Core
//
// This crate provides the backend for anonymous peer-support voice circles:
// users queue up with an emotional theme, a matching pass groups compatible
// strangers into small circles, and matched participants are notified with
// voice-room credentials.

pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
