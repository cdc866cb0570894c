pub mod auth;
mod client;
pub mod models;
mod routing;
pub mod token;

pub use auth::OAuthClient;
pub use client::{CalendarApi, GoogleCalendarClient, API_BASE_URL, PRIMARY_CALENDAR};
pub use models::{CalendarEvent, CalendarListEntry, CreatedEvent, EventDateTime};
pub use routing::{CalendarRouter, CATEGORY_DASH, CATEGORY_SEPARATOR};
pub use token::{StoredToken, TokenManager};

use crate::config::Config;
use crate::error::VestigeResult;
use tracing::info;

/// Authorize against Google and build a calendar client.
///
/// The cached token is reused when it is still valid or can be refreshed;
/// otherwise the user is sent through the browser consent flow.
pub async fn connect(config: &Config) -> VestigeResult<GoogleCalendarClient> {
    let oauth = OAuthClient::from_config(config);
    let tokens = TokenManager::bootstrap(config.settings.token_file.clone(), oauth).await?;
    info!("Authorized with token from {}", tokens.path().display());

    Ok(GoogleCalendarClient::new(tokens, config.developer_key.clone()))
}
