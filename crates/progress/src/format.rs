//! Human readable date and wait-time formatting.

use chrono::{FixedOffset, Offset, Utc};
use levelup_core::{EstimatedDate, Time};

fn unit(count: i64, name: &str) -> String {
    format!("{} {}{}", count, name, if count == 1 { "" } else { "s" })
}

/// Minimal description of the wait from `since` until `date`.
///
/// Leading zero units are dropped. Without seconds, a sub-hour wait rounds
/// its minutes up when more than 30 seconds remain. No wait at all is
/// `"Now"`; a date in the past counts as no wait.
pub fn format_wait(date: Time, since: Time, include_seconds: bool) -> String {
    let mut diff = (date.timestamp() - since.timestamp()).max(0);
    let days = diff / 86_400;
    diff -= days * 86_400;
    let hours = diff / 3_600;
    diff -= hours * 3_600;
    let mut mins = diff / 60;
    let secs = diff - mins * 60;

    let seconds_suffix = if include_seconds {
        format!(", {}", unit(secs, "sec"))
    } else {
        String::new()
    };

    if days > 0 {
        format!(
            "{}, {}, {}{}",
            unit(days, "day"),
            unit(hours, "hour"),
            unit(mins, "min"),
            seconds_suffix
        )
    } else if hours > 0 {
        format!("{}, {}{}", unit(hours, "hour"), unit(mins, "min"), seconds_suffix)
    } else if mins > 0 || secs > 0 {
        if !include_seconds && secs > 30 {
            mins += 1;
        }
        format!("{}{}", unit(mins, "min"), seconds_suffix)
    } else {
        "Now".to_string()
    }
}

/// Formats estimated dates relative to a snapshot's load time.
#[derive(Debug, Clone, Copy)]
pub struct DateFormatter {
    now: Time,
    offset: FixedOffset,
}

impl DateFormatter {
    /// Create a formatter rendering wall-clock times in `offset`.
    pub fn new(now: Time, offset: FixedOffset) -> Self {
        Self { now, offset }
    }

    /// Create a formatter rendering wall-clock times in UTC.
    pub fn utc(now: Time) -> Self {
        Self::new(now, Utc.fix())
    }

    /// Reference time.
    pub fn now(&self) -> Time {
        self.now
    }

    /// Render a date: `"N/A"` when undetermined, `"Now"` when not in the
    /// future, otherwise e.g. `"Wed, May 1, 15:00"` optionally followed by
    /// the wait in parentheses.
    pub fn format_date(
        &self,
        date: EstimatedDate,
        include_differential: bool,
        include_seconds: bool,
    ) -> String {
        let date = match date {
            EstimatedDate::Undetermined => return "N/A".to_string(),
            EstimatedDate::At(t) if t <= self.now => return "Now".to_string(),
            EstimatedDate::At(t) => t,
        };

        let text = date
            .with_timezone(&self.offset)
            .format("%a, %b %-d, %H:%M")
            .to_string();
        if !include_differential {
            return text;
        }
        format!("{} ({})", text, format_wait(date, self.now, include_seconds))
    }

    /// Wait until `date` from the reference time.
    pub fn format_wait(&self, date: EstimatedDate, include_seconds: bool) -> String {
        match date {
            EstimatedDate::Undetermined => "N/A".to_string(),
            EstimatedDate::At(t) => format_wait(t, self.now, include_seconds),
        }
    }
}
