//! OAuth token lifecycle.
//!
//! [`TokenManager`] owns the mutable token state and decides, on every
//! request, whether the cached access token is still usable or a refresh
//! is due. Expiry is tracked with a safety margin so tokens are rotated
//! shortly before the server would reject them. The wall clock and the
//! HTTP call behind a refresh sit behind traits so tests can drive both.

use assistant_core::{async_trait, BrainError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Tokens are treated as expired this many milliseconds before their
/// server-reported deadline.
const EXPIRY_MARGIN_MS: u64 = 60_000;

/// Source of current time in epoch milliseconds.
pub trait Clock: Send + Sync {
    /// Current time as milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Current OAuth token state.
#[derive(Debug, Clone, Default)]
pub struct TokenState {
    /// Access token presented as a bearer credential.
    pub access_token: Option<String>,

    /// Refresh token used to mint a new access token.
    pub refresh_token: Option<String>,

    /// Epoch-millisecond deadline after which the access token is
    /// considered stale. Zero means unknown.
    pub expires_at_ms: u64,
}

/// Body of a refresh POST.
#[derive(Debug, Serialize)]
pub struct RefreshRequest {
    /// Always "refresh_token".
    pub grant_type: String,

    /// The refresh token being redeemed.
    pub refresh_token: String,

    /// OAuth client id.
    pub client_id: String,
}

/// Body of a successful refresh response.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    /// New access token.
    pub access_token: String,

    /// Rotated refresh token, when the server issues one.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Transport for the refresh POST.
#[async_trait]
pub trait RefreshTransport: Send + Sync {
    /// Exchange a refresh token for a new access token.
    async fn refresh(&self, request: &RefreshRequest) -> Result<RefreshResponse, BrainError>;
}

/// RefreshTransport backed by reqwest.
pub struct HttpRefreshTransport {
    client: reqwest::Client,
    token_url: String,
}

impl HttpRefreshTransport {
    /// Create a transport posting to the given token endpoint.
    pub fn new(client: reqwest::Client, token_url: impl Into<String>) -> Self {
        Self {
            client,
            token_url: token_url.into(),
        }
    }
}

#[async_trait]
impl RefreshTransport for HttpRefreshTransport {
    async fn refresh(&self, request: &RefreshRequest) -> Result<RefreshResponse, BrainError> {
        let response = self
            .client
            .post(&self.token_url)
            .json(request)
            .send()
            .await
            .map_err(|e| BrainError::Network(format!("Token refresh failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status.as_u16() == 400 || status.as_u16() == 401 {
                return Err(BrainError::Auth(format!(
                    "refresh token rejected ({}): {}",
                    status.as_u16(),
                    body
                )));
            }
            return Err(BrainError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json::<RefreshResponse>()
            .await
            .map_err(|e| BrainError::Parse(format!("Invalid refresh response: {}", e)))
    }
}

/// Owns token state and performs refreshes when the access token is
/// missing or past its margin-adjusted deadline.
pub struct TokenManager {
    state: RwLock<TokenState>,
    transport: Arc<dyn RefreshTransport>,
    clock: Arc<dyn Clock>,
    client_id: Option<String>,
}

impl TokenManager {
    /// Create a manager over the given initial state.
    pub fn new(
        state: TokenState,
        transport: Arc<dyn RefreshTransport>,
        clock: Arc<dyn Clock>,
        client_id: Option<String>,
    ) -> Self {
        Self {
            state: RwLock::new(state),
            transport,
            clock,
            client_id,
        }
    }

    /// Return an access token ready to use, refreshing first if the
    /// cached one is missing or stale.
    ///
    /// Without a refresh token the cached access token is returned as-is
    /// even when its deadline has passed; the API call itself will
    /// surface the rejection.
    pub async fn valid_token(&self) -> Result<String, BrainError> {
        let (access, has_refresh, expires_at) = {
            let state = self.state.read().await;
            (
                state.access_token.clone(),
                state.refresh_token.is_some(),
                state.expires_at_ms,
            )
        };

        if access.is_none() && !has_refresh {
            return Err(BrainError::Configuration(
                "no access token and no refresh token available".to_string(),
            ));
        }

        if !has_refresh {
            // access is Some here, checked above
            let token = access.unwrap_or_default();
            if expires_at != 0 && self.clock.now_ms() >= expires_at {
                debug!("Access token past deadline but no refresh token; using it anyway");
            }
            return Ok(token);
        }

        let stale = match &access {
            None => true,
            Some(_) => expires_at != 0 && self.clock.now_ms() >= expires_at,
        };

        if stale {
            return self.force_refresh().await;
        }

        Ok(access.unwrap_or_default())
    }

    /// Refresh unconditionally and return the new access token.
    ///
    /// Concurrent refreshes are tolerated rather than serialized; the
    /// last writer wins and every caller still ends up with a token the
    /// server just issued.
    pub async fn force_refresh(&self) -> Result<String, BrainError> {
        let refresh_token = {
            let state = self.state.read().await;
            state.refresh_token.clone()
        };

        let refresh_token = refresh_token.ok_or_else(|| {
            BrainError::Configuration("cannot refresh without a refresh token".to_string())
        })?;

        let client_id = self.client_id.clone().ok_or_else(|| {
            BrainError::Configuration("CLAUDE_CLIENT_ID must be set to refresh tokens".to_string())
        })?;

        let request = RefreshRequest {
            grant_type: "refresh_token".to_string(),
            refresh_token,
            client_id,
        };

        let response = self.transport.refresh(&request).await?;

        let expires_at_ms = self
            .clock
            .now_ms()
            .saturating_add(response.expires_in.saturating_mul(1000))
            .saturating_sub(EXPIRY_MARGIN_MS);

        let mut state = self.state.write().await;
        state.access_token = Some(response.access_token.clone());
        if let Some(rotated) = response.refresh_token {
            state.refresh_token = Some(rotated);
        }
        state.expires_at_ms = expires_at_ms;

        info!(expires_in = response.expires_in, "Refreshed access token");

        Ok(response.access_token)
    }

    /// Snapshot of the current token state.
    pub async fn state(&self) -> TokenState {
        self.state.read().await.clone()
    }
}
