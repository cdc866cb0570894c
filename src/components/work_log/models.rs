use chrono::{DateTime, Duration, FixedOffset};

/// One described and timed task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub description: String,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: Option<DateTime<FixedOffset>>,
}

impl WorkItem {
    /// Start timing a task
    pub fn start(description: impl Into<String>, at: DateTime<FixedOffset>) -> Self {
        Self {
            description: description.into(),
            start_time: at,
            end_time: None,
        }
    }

    /// Stop timing. The end never precedes the start, even if the clock stepped back.
    pub fn finish(&mut self, at: DateTime<FixedOffset>) {
        self.end_time = Some(at.max(self.start_time));
    }

    /// Time spent so far, or in total once finished
    pub fn duration(&self) -> Option<Duration> {
        self.end_time.map(|end| end - self.start_time)
    }
}

/// Where the work-item loop currently is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the next description
    Idle,
    /// Timing a task until the user confirms
    Recording(WorkItem),
    /// Sending the finished task to the calendar
    Submitting(WorkItem),
}
