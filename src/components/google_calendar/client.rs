use super::models::{CalendarEvent, CalendarList, CalendarListEntry, CreatedEvent};
use super::token::TokenManager;
use crate::error::{google_calendar_error, VestigeResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

pub const API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Calendar id Google resolves to the authenticated user's main calendar
pub const PRIMARY_CALENDAR: &str = "primary";

/// Operations the work log needs from a calendar service
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// Create a new event. Every call creates a distinct event.
    async fn insert_event(&self, calendar_id: &str, event: &CalendarEvent) -> VestigeResult<CreatedEvent>;

    /// Calendars the user is allowed to write to
    async fn list_writable_calendars(&self) -> VestigeResult<Vec<CalendarListEntry>>;

    /// Create a secondary calendar
    async fn create_calendar(&self, summary: &str) -> VestigeResult<CalendarListEntry>;
}

/// Authorized client for the Google Calendar REST API
#[derive(Debug)]
pub struct GoogleCalendarClient {
    http: Client,
    tokens: Mutex<TokenManager>,
    developer_key: String,
    base_url: String,
}

impl GoogleCalendarClient {
    pub fn new(tokens: TokenManager, developer_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            tokens: Mutex::new(tokens),
            developer_key: developer_key.into(),
            base_url: API_BASE_URL.to_string(),
        }
    }

    /// Send requests to another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, segments: &[&str]) -> VestigeResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| google_calendar_error("API base URL cannot have a path"))?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut().append_pair("key", &self.developer_key);

        Ok(url)
    }

    async fn authorized(&self, request: RequestBuilder) -> VestigeResult<RequestBuilder> {
        let access_token = self.tokens.lock().await.access_token().await?;
        Ok(request.bearer_auth(access_token))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, action: &str) -> VestigeResult<T> {
        let response = self
            .authorized(request)
            .await?
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to {}: {}", action, e)))?;

        Self::parse_response(response, action).await
    }

    async fn parse_response<T: DeserializeOwned>(response: Response, action: &str) -> VestigeResult<T> {
        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to {}: HTTP {} - {}",
                action, status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse response to {}: {}", action, e)))
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarClient {
    async fn insert_event(&self, calendar_id: &str, event: &CalendarEvent) -> VestigeResult<CreatedEvent> {
        let url = self.endpoint(&["calendars", calendar_id, "events"])?;
        debug!("Inserting event into {}", calendar_id);

        let created: CreatedEvent = self
            .send(self.http.post(url).json(event), "create event")
            .await?;
        info!("Created event {} in {}", created.id, calendar_id);

        Ok(created)
    }

    async fn list_writable_calendars(&self) -> VestigeResult<Vec<CalendarListEntry>> {
        let mut url = self.endpoint(&["users", "me", "calendarList"])?;
        url.query_pairs_mut()
            .append_pair("minAccessRole", "writer")
            .append_pair("maxResults", "250");

        let list: CalendarList = self.send(self.http.get(url), "list calendars").await?;
        Ok(list.items)
    }

    async fn create_calendar(&self, summary: &str) -> VestigeResult<CalendarListEntry> {
        let url = self.endpoint(&["calendars"])?;
        let created: CalendarListEntry = self
            .send(
                self.http.post(url).json(&json!({ "summary": summary })),
                "create calendar",
            )
            .await?;
        info!("Created calendar {} ({})", summary, created.id);

        Ok(created)
    }
}
