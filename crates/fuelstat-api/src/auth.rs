//! Bearer-token authentication with an expiring cache
//!
//! The token endpoint is not consistent about the request shape it accepts,
//! so [`TokenManager`] tries three shapes in order and keeps the first token
//! it gets. Tokens are cached inside the manager and reused until a safety
//! margin before their advertised expiry.

use chrono::{DateTime, Duration, Utc};
use fuelstat_core::columns;
use fuelstat_core::config::{ApiSettings, Credentials};
use fuelstat_core::error::{FuelstatError, Result};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// TTL assumed when the token endpoint does not send `expires_in`
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3000;

/// A token is not reused within this many seconds of its real expiry
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// Largest TTL taken from the token endpoint; bigger values are clamped
pub const MAX_TOKEN_TTL_SECS: i64 = i32::MAX as i64;

const TOKEN_KEYS: &[&str] = &["token", "access_token", "jwt"];
const TTL_KEYS: &[&str] = &["expires_in"];

/// How long a token with the given server TTL is reused
///
/// The margin is subtracted from the TTL. TTLs too short to absorb the
/// margin are reused for half their length instead.
pub fn effective_lifetime(ttl_secs: i64) -> Duration {
    let ttl_secs = ttl_secs.clamp(0, MAX_TOKEN_TTL_SECS);
    let secs = if ttl_secs > EXPIRY_MARGIN_SECS {
        ttl_secs - EXPIRY_MARGIN_SECS
    } else {
        ttl_secs / 2
    };
    Duration::try_seconds(secs).unwrap_or_else(default_lifetime)
}

fn default_lifetime() -> Duration {
    Duration::seconds(DEFAULT_TOKEN_TTL_SECS - EXPIRY_MARGIN_SECS)
}

/// A token together with the instant it stops being reused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn new(value: impl Into<String>, ttl_secs: i64, fetched_at: DateTime<Utc>) -> Self {
        let expires_at = fetched_at
            .checked_add_signed(effective_lifetime(ttl_secs))
            .or_else(|| fetched_at.checked_add_signed(default_lifetime()))
            .unwrap_or(fetched_at);
        Self {
            value: value.into(),
            expires_at,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the token may still be used at `now`
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Request shapes accepted by different token endpoint deployments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthShape {
    JsonWithBasic,
    FormWithBasic,
    JsonOnly,
}

impl AuthShape {
    const ALL: [AuthShape; 3] = [Self::JsonWithBasic, Self::FormWithBasic, Self::JsonOnly];
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
    cnpj: &'a str,
}

/// Why the last authentication attempt did not produce a token
enum AttemptFailure {
    Status(reqwest::Error),
    NoToken,
}

/// Extract `(token, ttl_secs)` from a token endpoint response body
pub fn parse_token_response(body: &Value) -> Option<(String, i64)> {
    let record = body.as_object()?;
    let token = columns::lookup_with(record, TOKEN_KEYS, |v| {
        v.as_str()
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    })?;
    let ttl = columns::lookup_with(record, TTL_KEYS, |v| match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(ttl_from_float)),
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(ttl_from_float),
        _ => None,
    })
    .unwrap_or(DEFAULT_TOKEN_TTL_SECS);
    Some((token, ttl.clamp(0, MAX_TOKEN_TTL_SECS)))
}

fn ttl_from_float(secs: f64) -> Option<i64> {
    secs.is_finite()
        .then(|| secs.clamp(0.0, MAX_TOKEN_TTL_SECS as f64) as i64)
}

/// Owns the credentials and the token cache for one API deployment
pub struct TokenManager {
    client: reqwest::Client,
    token_url: String,
    credentials: Credentials,
    timeout: std::time::Duration,
    cache: Mutex<Option<CachedToken>>,
}

impl TokenManager {
    pub fn new(client: reqwest::Client, settings: &ApiSettings) -> Self {
        Self {
            client,
            token_url: format!("{}/token", settings.base_url),
            credentials: settings.credentials.clone(),
            timeout: settings.timeout,
            cache: Mutex::new(None),
        }
    }

    /// Current token, fetching a new one on miss, expiry, or `force`
    pub async fn get_token(&self, force: bool) -> Result<String> {
        self.get_token_at(force, Utc::now()).await
    }

    /// `Authorization` header value for the current token
    pub async fn auth_header(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.get_token(false).await?))
    }

    /// Force a new token and return its header value (used after a 401)
    pub async fn refresh_and_get(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.get_token(true).await?))
    }

    async fn get_token_at(&self, force: bool, now: DateTime<Utc>) -> Result<String> {
        // Held across the request so concurrent callers share one refresh
        let mut cache = self.cache.lock().await;

        if !force {
            if let Some(token) = cache.as_ref().filter(|t| t.is_fresh_at(now)) {
                return Ok(token.value.clone());
            }
        }

        let (value, ttl) = self.request_token().await?;
        let token = CachedToken::new(value, ttl, now);
        info!(
            ttl_secs = ttl,
            reuse_until = %token.expires_at,
            "Obtained API token"
        );
        let value = token.value.clone();
        *cache = Some(token);
        Ok(value)
    }

    async fn request_token(&self) -> Result<(String, i64)> {
        let creds = &self.credentials;
        let payload = TokenRequest {
            username: &creds.user,
            password: &creds.password,
            cnpj: &creds.tenant_id,
        };

        let mut last_failure = AttemptFailure::NoToken;

        for shape in AuthShape::ALL {
            let request = self.client.post(&self.token_url).timeout(self.timeout);
            let request = match shape {
                AuthShape::JsonWithBasic => request
                    .json(&payload)
                    .basic_auth(&creds.user, Some(&creds.password)),
                AuthShape::FormWithBasic => request
                    .form(&payload)
                    .basic_auth(&creds.user, Some(&creds.password)),
                AuthShape::JsonOnly => request.json(&payload),
            };

            let response = request.send().await?;
            let status = response.status();

            if let Err(e) = response.error_for_status_ref() {
                debug!(?shape, %status, "Token request rejected");
                last_failure = AttemptFailure::Status(e);
                continue;
            }

            match response.json::<Value>().await {
                Ok(body) => {
                    if let Some(found) = parse_token_response(&body) {
                        debug!(?shape, "Token request accepted");
                        return Ok(found);
                    }
                    warn!(?shape, "Token endpoint answered {} without a token", status);
                }
                Err(e) => warn!(?shape, "Token endpoint answered {} with an unreadable body: {}", status, e),
            }
            last_failure = AttemptFailure::NoToken;
        }

        match last_failure {
            AttemptFailure::Status(e) => Err(FuelstatError::Network(e)),
            AttemptFailure::NoToken => Err(FuelstatError::TokenMissing),
        }
    }
}
