#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use std::collections::VecDeque;
use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vestige::components::google_calendar::{
    CalendarApi, CalendarEvent, CalendarListEntry, CreatedEvent,
};
use vestige::components::work_log::Console;
use vestige::error::{google_calendar_error, VestigeResult};
use vestige::utils::time::Clock;

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<FixedOffset> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap().fixed_offset()
}

/// Console fed from a fixed script that records everything shown
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    pub prompts: Vec<String>,
    pub output: Vec<String>,
}

impl ScriptedConsole {
    pub fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn printed(&self, needle: &str) -> bool {
        self.output.iter().any(|line| line.contains(needle))
    }

    pub fn count(&self, needle: &str) -> usize {
        self.output.iter().filter(|line| line.contains(needle)).count()
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    async fn ask(&mut self, prompt: &str) -> VestigeResult<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.inputs.pop_front())
    }

    fn say(&mut self, line: &str) {
        self.output.push(line.to_string());
    }
}

/// Clock that hands out a fixed sequence of instants
#[derive(Debug)]
pub struct ScriptedClock {
    times: Mutex<VecDeque<DateTime<FixedOffset>>>,
}

impl ScriptedClock {
    pub fn new(times: &[DateTime<FixedOffset>]) -> Self {
        Self {
            times: Mutex::new(times.iter().copied().collect()),
        }
    }
}

impl Clock for ScriptedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.times
            .lock()
            .unwrap()
            .pop_front()
            .expect("clock script exhausted")
    }
}

/// In-memory calendar service
#[derive(Debug, Default)]
pub struct MockCalendar {
    pub inserted: Mutex<Vec<(String, CalendarEvent)>>,
    pub attempts: AtomicUsize,
    /// Attempts (1-based) that fail with a transport error
    pub failing_attempts: Vec<usize>,
}

impl MockCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(attempts: &[usize]) -> Self {
        Self {
            failing_attempts: attempts.to_vec(),
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<(String, CalendarEvent)> {
        self.inserted.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarApi for MockCalendar {
    async fn insert_event(&self, calendar_id: &str, event: &CalendarEvent) -> VestigeResult<CreatedEvent> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_attempts.contains(&attempt) {
            return Err(google_calendar_error("Failed to create event: connection reset"));
        }

        let mut inserted = self.inserted.lock().unwrap();
        inserted.push((calendar_id.to_string(), event.clone()));
        Ok(CreatedEvent {
            id: format!("event{}", inserted.len()),
            html_link: None,
        })
    }

    async fn list_writable_calendars(&self) -> VestigeResult<Vec<CalendarListEntry>> {
        Ok(Vec::new())
    }

    async fn create_calendar(&self, summary: &str) -> VestigeResult<CalendarListEntry> {
        Ok(CalendarListEntry {
            id: format!("{}-id", summary.to_lowercase()),
            summary: summary.to_string(),
            primary: false,
        })
    }
}

/// A request seen by the fake Google server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or_default()
    }

    /// Decoded `application/x-www-form-urlencoded` body
    pub fn form(&self) -> std::collections::HashMap<String, String> {
        url::form_urlencoded::parse(self.body.as_bytes())
            .into_owned()
            .collect()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Reply chosen by a fake server route: status and JSON body
pub type Reply = (u16, serde_json::Value);

/// Local HTTP server standing in for the Google endpoints
pub struct FakeGoogle {
    pub addr: String,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeGoogle {
    pub fn start<F>(route: F) -> Self
    where
        F: Fn(&RecordedRequest, usize) -> Reply + Send + 'static,
    {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap().to_string();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        std::thread::spawn(move || {
            for mut request in server.incoming_requests() {
                let mut body = String::new();
                request.as_reader().read_to_string(&mut body).unwrap();
                let recorded = RecordedRequest {
                    method: request.method().as_str().to_string(),
                    url: request.url().to_string(),
                    authorization: request
                        .headers()
                        .iter()
                        .find(|h| h.field.equiv("Authorization"))
                        .map(|h| h.value.as_str().to_string()),
                    body,
                };

                let count = {
                    let mut seen = seen.lock().unwrap();
                    seen.push(recorded.clone());
                    seen.len()
                };

                let (status, reply) = route(&recorded, count);
                let header: tiny_http::Header = "Content-Type: application/json".parse().unwrap();
                let response = tiny_http::Response::from_string(reply.to_string())
                    .with_status_code(status)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });

        Self { addr, requests }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/calendar/v3", self.addr)
    }

    pub fn token_url(&self) -> String {
        format!("http://{}/token", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Routes answering like the Google Calendar API
pub fn google_routes(request: &RecordedRequest, count: usize) -> Reply {
    match (request.method.as_str(), request.path()) {
        ("POST", "/token") if request.body.contains("grant_type=authorization_code") => (
            200,
            serde_json::json!({
                "access_token": "granted-token",
                "refresh_token": "granted-refresh",
                "expires_in": 3599,
                "token_type": "Bearer"
            }),
        ),
        ("POST", "/token") => (
            200,
            serde_json::json!({ "access_token": "refreshed-token", "expires_in": 3600 }),
        ),
        ("GET", "/calendar/v3/users/me/calendarList") => (
            200,
            serde_json::json!({ "items": [
                { "id": "me@example.com", "summary": "Me", "primary": true },
                { "id": "work@group.calendar.google.com", "summary": "Work" }
            ]}),
        ),
        ("POST", "/calendar/v3/calendars") => (
            200,
            serde_json::json!({ "id": format!("cal-{}", count), "summary": request.json()["summary"] }),
        ),
        ("POST", path) if path.ends_with("/events") => (
            200,
            serde_json::json!({ "id": format!("evt-{}", count), "htmlLink": "https://calendar.example/evt" }),
        ),
        _ => (404, serde_json::json!({ "error": "not found" })),
    }
}
