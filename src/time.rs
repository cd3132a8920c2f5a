use core::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::BreathingConfig;

/// Return the time left in a breathing session after `ticks` ticks.
pub(crate) fn remaining(config: &BreathingConfig, ticks: u32) -> Duration {
    config
        .session_length
        .checked_sub(config.tick_interval * ticks)
        .unwrap_or_else(|| Duration::from_secs(0))
}

/// Return a `m:ss` representation of a duration, rounded up to the next full second.
pub(crate) fn as_m_ss(duration: Duration) -> String {
    let seconds = (duration.as_millis() + 999) / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Return a short representation of a journal timestamp.
pub(crate) fn as_day_hh_mm(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%d %b, %H:%M (UTC)").to_string()
}
