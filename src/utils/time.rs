use chrono::{DateTime, Duration, FixedOffset, Local, SecondsFormat};

/// Source of the current time for work items
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in the local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Format a timestamp as RFC3339 with whole seconds and an explicit offset
pub fn to_rfc3339(time: &DateTime<FixedOffset>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Format the time of day the way a wall clock shows it, e.g. `9:05AM`
pub fn format_clock_time(time: &DateTime<FixedOffset>) -> String {
    time.format("%-I:%M%p").to_string()
}

/// Human readable elapsed time, e.g. `1h 30m 5s`
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
