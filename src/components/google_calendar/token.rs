use super::auth::OAuthClient;
use crate::error::VestigeResult;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Seconds before the recorded expiry at which a token is treated as expired
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Token as returned by the OAuth token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Token as cached in the credential file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix timestamp in seconds
    pub expires_at: i64,
}

impl StoredToken {
    /// Convert a token endpoint response, keeping a previous refresh token
    /// when the endpoint did not issue a new one
    pub fn from_response(response: TokenResponse, previous_refresh: Option<String>) -> Self {
        let expires_in = response.expires_in.unwrap_or(3600);
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh),
            expires_at: Utc::now().timestamp().saturating_add(expires_in),
        }
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now.saturating_add(EXPIRY_MARGIN_SECS) >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    /// Read a token from disk
    pub fn load(path: impl AsRef<Path>) -> VestigeResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the token to disk, replacing any previous file.
    /// On unix the file is readable by its owner only.
    pub fn save(&self, path: impl AsRef<Path>) -> VestigeResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path)?;

        // `mode` only applies to new files
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

/// Owns the credential file and hands out valid access tokens
#[derive(Debug)]
pub struct TokenManager {
    path: PathBuf,
    oauth: OAuthClient,
    token: StoredToken,
}

impl TokenManager {
    /// Wrap an already obtained token
    pub fn new(path: impl Into<PathBuf>, oauth: OAuthClient, token: StoredToken) -> Self {
        Self {
            path: path.into(),
            oauth,
            token,
        }
    }

    /// Reuse the cached token when possible, otherwise run the consent flow
    pub async fn bootstrap(path: impl Into<PathBuf>, oauth: OAuthClient) -> VestigeResult<Self> {
        let path = path.into();

        if let Some(token) = Self::usable_cached_token(&path, &oauth).await {
            return Ok(Self::new(path, oauth, token));
        }

        Self::authorize(path, oauth).await
    }

    /// Always run the consent flow and overwrite the credential file
    pub async fn authorize(path: impl Into<PathBuf>, oauth: OAuthClient) -> VestigeResult<Self> {
        let token = oauth.authorize_interactively().await?;
        Self::store(path, oauth, token)
    }

    /// Persist a freshly granted token and manage it from now on
    pub fn store(path: impl Into<PathBuf>, oauth: OAuthClient, token: StoredToken) -> VestigeResult<Self> {
        let path = path.into();
        token.save(&path)?;
        info!("Saved new token to {}", path.display());

        Ok(Self::new(path, oauth, token))
    }

    async fn usable_cached_token(path: &Path, oauth: &OAuthClient) -> Option<StoredToken> {
        let cached = match StoredToken::load(path) {
            Ok(token) => token,
            Err(e) => {
                info!("No usable cached token at {}: {}", path.display(), e);
                return None;
            }
        };

        if !cached.is_expired() {
            info!("Using cached token from {}", path.display());
            return Some(cached);
        }

        cached.refresh_token.as_ref()?;
        match oauth.refresh(&cached).await {
            Ok(token) => {
                if let Err(e) = token.save(path) {
                    warn!("Failed to cache refreshed token: {}", e);
                }
                Some(token)
            }
            Err(e) => {
                warn!("Cached token could not be refreshed: {}", e);
                None
            }
        }
    }

    /// Current access token, refreshed and persisted first if it has expired
    pub async fn access_token(&mut self) -> VestigeResult<String> {
        if self.token.is_expired() {
            info!("Access token expired, refreshing");
            self.token = self.oauth.refresh(&self.token).await?;
            self.token.save(&self.path)?;
        }

        Ok(self.token.access_token.clone())
    }

    pub fn token(&self) -> &StoredToken {
        &self.token
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
