use crate::components::work_log::WorkItem;
use crate::error::{other_error, VestigeResult};
use crate::utils::time::to_rfc3339;
use serde::{Deserialize, Serialize};

/// Start or end of a timed event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDateTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
}

/// Event body sent to the insert endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub summary: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
}

impl CalendarEvent {
    /// Build the event for a finished work item
    pub fn from_work_item(item: &WorkItem) -> VestigeResult<Self> {
        let end_time = item
            .end_time
            .ok_or_else(|| other_error("Work item has not been finished"))?;

        Ok(Self {
            summary: item.description.clone(),
            start: EventDateTime {
                date_time: to_rfc3339(&item.start_time),
            },
            end: EventDateTime {
                date_time: to_rfc3339(&end_time),
            },
        })
    }
}

/// The part of the insert response we care about
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEvent {
    pub id: String,
    #[serde(default)]
    pub html_link: Option<String>,
}

/// Entry of the user's calendar list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarListEntry {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub primary: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CalendarList {
    #[serde(default)]
    pub items: Vec<CalendarListEntry>,
}
