/// Pure time policy for midnight circles
///
/// All functions take the current local wall-clock instant as an argument
/// (callers inject a Clock), so the policy is deterministic and testable.
/// The window runs 11 PM - 3 AM; midnight circles dissolve at 6 AM.
use chrono::{Datelike, Days, NaiveDateTime, Timelike};

/// Local hour the midnight window opens.
pub const MIDNIGHT_WINDOW_START_HOUR: u32 = 23;

/// Local hour the midnight window closes.
pub const MIDNIGHT_WINDOW_END_HOUR: u32 = 3;

/// Local hour midnight circles are deleted at.
pub const SUNRISE_HOUR: u32 = 6;

/// Rotating special themes, one per calendar day.
pub const MIDNIGHT_THEMES: [&str; 6] = [
    "Late Night Confessions",
    "Midnight Vulnerability",
    "After Dark Thoughts",
    "Insomnia Circle",
    "Night Owl Support",
    "3 AM Realizations",
];

/// Request themes that become midnight circles inside the window.
const MIDNIGHT_ELIGIBLE_THEMES: [&str; 4] = ["loneliness", "anxiety", "overwhelmed", "insomnia"];

/// Countdown to the next midnight window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeUntilMidnight {
    pub hours: i64,
    pub minutes: i64,
    pub total_minutes: i64,
}

/// Whether the local time is within midnight hours (11 PM - 3 AM).
pub fn is_midnight_window(now: NaiveDateTime) -> bool {
    let hour = now.hour();
    hour >= MIDNIGHT_WINDOW_START_HOUR || hour < MIDNIGHT_WINDOW_END_HOUR
}

/// The next midnight window start: tonight at 11 PM, or `now` unchanged when
/// already inside the window.
pub fn next_midnight_start(now: NaiveDateTime) -> NaiveDateTime {
    if is_midnight_window(now) {
        return now;
    }

    now.date()
        .and_hms_opt(MIDNIGHT_WINDOW_START_HOUR, 0, 0)
        .expect("23:00:00 is a valid time")
}

/// The next sunrise (6 AM): today's if it has not passed yet, else
/// tomorrow's.
pub fn next_sunrise(now: NaiveDateTime) -> NaiveDateTime {
    let date = if now.hour() < SUNRISE_HOUR {
        now.date()
    } else {
        now.date() + Days::new(1)
    };

    date.and_hms_opt(SUNRISE_HOUR, 0, 0)
        .expect("06:00:00 is a valid time")
}

/// Countdown until the next midnight window opens. Zero inside the window.
pub fn time_until_midnight(now: NaiveDateTime) -> TimeUntilMidnight {
    let total_minutes = (next_midnight_start(now) - now).num_minutes();

    TimeUntilMidnight {
        hours: total_minutes / 60,
        minutes: total_minutes % 60,
        total_minutes,
    }
}

/// The special theme for circles created on this calendar day.
///
/// Rotates through the six themes by weekday (Sunday-based), so every circle
/// created on the same day shares a theme.
pub fn midnight_theme_for(now: NaiveDateTime) -> &'static str {
    let day_of_week = now.weekday().num_days_from_sunday() as usize;
    MIDNIGHT_THEMES[day_of_week % MIDNIGHT_THEMES.len()]
}

/// Whether a group with this request theme should become a midnight circle
/// right now. Theme labels compare case-insensitively.
pub fn is_midnight_eligible(theme: &str, now: NaiveDateTime) -> bool {
    if !is_midnight_window(now) {
        return false;
    }

    let theme = theme.to_lowercase();
    MIDNIGHT_ELIGIBLE_THEMES.iter().any(|t| *t == theme)
}
