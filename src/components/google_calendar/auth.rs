use super::token::{StoredToken, TokenResponse};
use crate::config::Config;
use crate::error::{authorization_error, other_error, VestigeResult};
use reqwest::Client;
use tiny_http::{Response, Server};
use tracing::{debug, info, warn};
use url::Url;

pub const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// OAuth2 client credentials and endpoints for the installed-app flow
#[derive(Debug, Clone)]
pub struct OAuthClient {
    client_id: String,
    client_secret: String,
    auth_url: String,
    token_url: String,
    http: Client,
}

impl OAuthClient {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_url: AUTH_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.client_id.clone(), config.client_secret.clone())
    }

    /// Point token exchange and refresh at another endpoint
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Build the consent page URL the user has to visit
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> VestigeResult<Url> {
        Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("scope", CALENDAR_SCOPE),
                ("state", state),
            ],
        )
        .map_err(|e| other_error(&format!("Failed to build authorization URL: {}", e)))
    }

    /// Exchange an authorization code for a token
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> VestigeResult<StoredToken> {
        let response = self
            .request_token(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .await?;

        Ok(StoredToken::from_response(response, None))
    }

    /// Trade the refresh token for a new access token
    pub async fn refresh(&self, token: &StoredToken) -> VestigeResult<StoredToken> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or_else(|| authorization_error("No refresh token in token data"))?;

        let response = self
            .request_token(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .await?;

        Ok(StoredToken::from_response(response, token.refresh_token.clone()))
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> VestigeResult<TokenResponse> {
        let response = self
            .http
            .post(&self.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| authorization_error(&format!("Failed to reach token endpoint: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(authorization_error(&format!(
                "Token request failed: HTTP {} - {}",
                status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| authorization_error(&format!("Failed to parse token response: {}", e)))
    }

    /// Run the browser consent flow and block until the user grants access
    pub async fn authorize_interactively(&self) -> VestigeResult<StoredToken> {
        // Loopback listener on an ephemeral port receives the redirect
        let server = Server::http("127.0.0.1:0")
            .map_err(|e| other_error(&format!("Failed to start callback listener: {}", e)))?;
        let addr = server
            .server_addr()
            .to_ip()
            .ok_or_else(|| other_error("Callback listener has no IP address"))?;
        let redirect_uri = format!("http://{}", addr);

        let state = uuid::Uuid::new_v4().to_string();
        let auth_url = self.authorization_url(&redirect_uri, &state)?;

        println!(" * Authorize this app at: {}", auth_url);
        if let Err(e) = webbrowser::open(auth_url.as_str()) {
            warn!("Could not open a browser: {}", e);
        }
        println!(" * Waiting for authorization...");

        let code = tokio::task::spawn_blocking(move || wait_for_code(&server, &state))
            .await
            .map_err(|e| other_error(&format!("Callback listener failed: {}", e)))??;
        info!("Received authorization code");

        self.exchange_code(&code, &redirect_uri).await
    }
}

/// Serve redirect requests until one carries a code for our state
pub(crate) fn wait_for_code(server: &Server, state: &str) -> VestigeResult<String> {
    loop {
        let request = server.recv()?;
        let url = Url::parse(&format!("http://localhost{}", request.url()))
            .map_err(|e| other_error(&format!("Malformed callback URL: {}", e)))?;

        if url.path() == "/favicon.ico" {
            respond(request, Response::from_string("").with_status_code(404));
            continue;
        }

        let param = |name: &str| {
            url.query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        };

        if param("state").as_deref() != Some(state) {
            debug!("Ignoring callback with mismatched state: {}", url);
            respond(request, Response::from_string("State mismatch").with_status_code(400));
            continue;
        }

        if let Some(error) = param("error") {
            respond(request, Response::from_string("Authorization was not granted."));
            return Err(authorization_error(&format!("Access was not granted: {}", error)));
        }

        match param("code") {
            Some(code) => {
                respond(
                    request,
                    Response::from_string("Authorization successful! You can close this window."),
                );
                return Ok(code);
            }
            None => {
                respond(request, Response::from_string("No code").with_status_code(400));
            }
        }
    }
}

fn respond<R: std::io::Read>(request: tiny_http::Request, response: Response<R>) {
    if let Err(e) = request.respond(response) {
        warn!("Failed to answer callback request: {}", e);
    }
}
