//! Midnight circles: time-gated circle variant with scheduled auto-expiry.

pub mod policy;
pub mod sweeper;

pub use policy::{
    is_midnight_eligible, is_midnight_window, midnight_theme_for, next_midnight_start,
    next_sunrise, time_until_midnight, TimeUntilMidnight,
};
pub use sweeper::ExpirySweeper;
