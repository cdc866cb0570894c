use super::client::{CalendarApi, PRIMARY_CALENDAR};
use super::models::CalendarEvent;
use crate::config::Settings;
use crate::error::{config_error, VestigeResult};
use std::collections::HashMap;
use tracing::info;

/// Separator between category and task in a description
pub const CATEGORY_SEPARATOR: &str = " - ";
/// What the separator becomes in the submitted summary
pub const CATEGORY_DASH: &str = " \u{2014} ";

/// Decides which calendar an event lands in
#[derive(Debug, Clone)]
pub struct CalendarRouter {
    default_calendar: String,
    categories: Option<HashMap<String, String>>,
}

impl Default for CalendarRouter {
    fn default() -> Self {
        Self::primary()
    }
}

impl CalendarRouter {
    /// Everything goes to the primary calendar and summaries are left alone
    pub fn primary() -> Self {
        Self {
            default_calendar: PRIMARY_CALENDAR.to_string(),
            categories: None,
        }
    }

    /// Build a router from the settings, looking up calendars only when needed
    pub async fn from_settings(settings: &Settings, api: &dyn CalendarApi) -> VestigeResult<Self> {
        if settings.default_calendar.is_none() && !settings.categories {
            return Ok(Self::primary());
        }

        let calendars: HashMap<String, String> = api
            .list_writable_calendars()
            .await?
            .into_iter()
            .map(|entry| (entry.summary.to_lowercase(), entry.id))
            .collect();
        info!("Found {} writable calendars", calendars.len());

        let default_calendar = match &settings.default_calendar {
            Some(name) => {
                let id = calendars.get(&name.to_lowercase()).cloned().ok_or_else(|| {
                    config_error(&format!(
                        "Default calendar '{}' was not found or is not writable",
                        name
                    ))
                })?;
                println!(" * Promoted {} to default calendar.", name);
                id
            }
            None => PRIMARY_CALENDAR.to_string(),
        };

        Ok(Self {
            default_calendar,
            categories: settings.categories.then_some(calendars),
        })
    }

    /// Pick the calendar for an event, creating a category calendar on first use.
    ///
    /// With categories enabled the summary is rewritten so its separators
    /// read as dashes.
    pub async fn route(&mut self, event: &mut CalendarEvent, api: &dyn CalendarApi) -> VestigeResult<String> {
        let Some(categories) = self.categories.as_mut() else {
            return Ok(self.default_calendar.clone());
        };

        let Some((category, _)) = event.summary.split_once(CATEGORY_SEPARATOR) else {
            return Ok(self.default_calendar.clone());
        };
        let category = category.to_string();
        event.summary = event.summary.replace(CATEGORY_SEPARATOR, CATEGORY_DASH);

        let key = category.to_lowercase();
        if let Some(id) = categories.get(&key) {
            return Ok(id.clone());
        }

        let created = api.create_calendar(&category).await?;
        println!(" * Calendar created: {}", category);
        categories.insert(key, created.id.clone());

        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::google_calendar::models::{CalendarListEntry, CreatedEvent, EventDateTime};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeCalendars {
        existing: Vec<CalendarListEntry>,
        created: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CalendarApi for FakeCalendars {
        async fn insert_event(&self, _calendar_id: &str, _event: &CalendarEvent) -> VestigeResult<CreatedEvent> {
            unreachable!("routing never inserts events")
        }

        async fn list_writable_calendars(&self) -> VestigeResult<Vec<CalendarListEntry>> {
            Ok(self.existing.clone())
        }

        async fn create_calendar(&self, summary: &str) -> VestigeResult<CalendarListEntry> {
            let mut created = self.created.lock().unwrap();
            created.push(summary.to_string());
            Ok(CalendarListEntry {
                id: format!("new-{}", created.len()),
                summary: summary.to_string(),
                primary: false,
            })
        }
    }

    fn fake() -> FakeCalendars {
        FakeCalendars {
            existing: vec![
                CalendarListEntry {
                    id: "me@example.com".to_string(),
                    summary: "Me".to_string(),
                    primary: true,
                },
                CalendarListEntry {
                    id: "work-id".to_string(),
                    summary: "Work".to_string(),
                    primary: false,
                },
            ],
            created: Mutex::new(Vec::new()),
        }
    }

    fn event(summary: &str) -> CalendarEvent {
        let at = EventDateTime {
            date_time: "2024-01-01T09:00:00+00:00".to_string(),
        };
        CalendarEvent {
            summary: summary.to_string(),
            start: at.clone(),
            end: at,
        }
    }

    #[tokio::test]
    async fn test_default_settings_use_primary_without_lookup() {
        let api = FakeCalendars::default();
        let mut router = CalendarRouter::from_settings(&Settings::default(), &api).await.unwrap();

        let mut ev = event("Client - Meeting");
        assert_eq!(router.route(&mut ev, &api).await.unwrap(), "primary");
        assert_eq!(ev.summary, "Client - Meeting");
    }

    #[tokio::test]
    async fn test_default_calendar_is_resolved_case_insensitively() {
        let api = fake();
        let settings = Settings {
            default_calendar: Some("work".to_string()),
            ..Settings::default()
        };
        let router = CalendarRouter::from_settings(&settings, &api).await.unwrap();
        assert_eq!(router.default_calendar, "work-id");
    }

    #[tokio::test]
    async fn test_unknown_default_calendar_is_a_config_error() {
        let api = fake();
        let settings = Settings {
            default_calendar: Some("Nope".to_string()),
            ..Settings::default()
        };
        let result = CalendarRouter::from_settings(&settings, &api).await;
        assert!(matches!(result, Err(crate::error::Error::Config(_))));
    }

    #[tokio::test]
    async fn test_categories_route_and_create_once() {
        let api = fake();
        let settings = Settings {
            categories: true,
            ..Settings::default()
        };
        let mut router = CalendarRouter::from_settings(&settings, &api).await.unwrap();

        let mut existing = event("work - Standup - notes");
        assert_eq!(router.route(&mut existing, &api).await.unwrap(), "work-id");
        assert_eq!(existing.summary, "work \u{2014} Standup \u{2014} notes");

        let mut first = event("Garden - Weeding");
        let mut second = event("garden - Mowing");
        let first_id = router.route(&mut first, &api).await.unwrap();
        let second_id = router.route(&mut second, &api).await.unwrap();
        assert_eq!(first_id, "new-1");
        assert_eq!(second_id, "new-1");
        assert_eq!(*api.created.lock().unwrap(), vec!["Garden".to_string()]);

        let mut plain = event("No category here");
        assert_eq!(router.route(&mut plain, &api).await.unwrap(), "primary");
        assert_eq!(plain.summary, "No category here");
    }
}
