//! Environment configuration
//!
//! Settings come from process environment variables, optionally seeded from a
//! `.env` file in the working directory (or any parent). Variables already set
//! in the environment take precedence over the file.
//!
//! # Example
//!
//! ```no_run
//! use fuelstat_core::config::{ApiSettings, load_dotenv};
//!
//! load_dotenv();
//! let settings = ApiSettings::from_env()?;
//! println!("querying {}", settings.base_url);
//! # Ok::<(), fuelstat_core::FuelstatError>(())
//! ```

use crate::error::{FuelstatError, Result};
use std::fmt;
use std::time::Duration;
use tracing::debug;

pub const ENV_USER: &str = "FULTec_USER";
pub const ENV_PASSWORD: &str = "FULTec_PASS";
pub const ENV_TENANT_ID: &str = "FULTec_CNPJ";
pub const ENV_BASE_URL: &str = "FULTec_BASE_URL";
pub const ENV_TIMEOUT: &str = "FULTec_TIMEOUT";
pub const ENV_TIMEZONE: &str = "FUELSTAT_TIMEZONE";
pub const ENV_CACHE_TTL: &str = "FUELSTAT_CACHE_TTL";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_OPENAI_MODEL: &str = "OPENAI_MODEL";

/// Per-request timeout when `FULTec_TIMEOUT` is unset
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
/// How long fetched tables are memoized when `FUELSTAT_CACHE_TTL` is unset
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(120);
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Load a `.env` file if one exists. Missing files are not an error.
pub fn load_dotenv() {
    match dotenv::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env file loaded: {}", e),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_var(key: &str) -> Option<String> {
    non_blank(std::env::var(key).ok())
}

/// API credentials: user, password, and tenant id (CNPJ)
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
    pub tenant_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

impl Credentials {
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            tenant_id: tenant_id.into(),
        }
    }

    /// Read the three secrets from the environment
    ///
    /// Blank values count as missing. The error names every missing variable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_var)
    }

    /// Read the three secrets through an arbitrary lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let user = non_blank(lookup(ENV_USER));
        let password = non_blank(lookup(ENV_PASSWORD));
        let tenant_id = non_blank(lookup(ENV_TENANT_ID));

        match (user, password, tenant_id) {
            (Some(user), Some(password), Some(tenant_id)) => Ok(Self {
                user,
                password,
                tenant_id,
            }),
            (user, password, tenant_id) => {
                let missing: Vec<&str> = [
                    (ENV_USER, user.is_none()),
                    (ENV_PASSWORD, password.is_none()),
                    (ENV_TENANT_ID, tenant_id.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(FuelstatError::MissingCredentials(missing.join(", ")))
            }
        }
    }
}

/// Everything needed to talk to the transaction API
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Base URL without trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    pub credentials: Credentials,
    /// Memoization window for fetched tables
    pub cache_ttl: Duration,
}

impl ApiSettings {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            credentials,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_var)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::from_lookup(&lookup)?;
        let base_url = non_blank(lookup(ENV_BASE_URL))
            .ok_or_else(|| FuelstatError::Config(format!("{ENV_BASE_URL} is not set")))?;

        let timeout = match non_blank(lookup(ENV_TIMEOUT)) {
            Some(raw) => parse_seconds(ENV_TIMEOUT, &raw)?,
            None => DEFAULT_TIMEOUT,
        };
        let cache_ttl = match non_blank(lookup(ENV_CACHE_TTL)) {
            Some(raw) => parse_seconds(ENV_CACHE_TTL, &raw)?,
            None => DEFAULT_CACHE_TTL,
        };

        Ok(Self::new(base_url, credentials)
            .with_timeout(timeout)
            .with_cache_ttl(cache_ttl))
    }
}

/// Settings for the language-model command interpreter
#[derive(Clone)]
pub struct AssistantSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl fmt::Debug for AssistantSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantSettings")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl AssistantSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_var)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = non_blank(lookup(ENV_OPENAI_API_KEY))
            .ok_or_else(|| FuelstatError::MissingCredentials(ENV_OPENAI_API_KEY.to_string()))?;
        let base_url = non_blank(lookup(ENV_OPENAI_BASE_URL))
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let model =
            non_blank(lookup(ENV_OPENAI_MODEL)).unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());
        Ok(Self {
            api_key,
            base_url,
            model,
        })
    }
}

fn parse_seconds(key: &str, raw: &str) -> Result<Duration> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| FuelstatError::Config(format!("{key} must be a number of seconds, got '{raw}'")))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(FuelstatError::Config(format!(
            "{key} must be positive, got '{raw}'"
        )));
    }
    Ok(Duration::from_secs_f64(secs))
}
