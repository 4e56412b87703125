//! Timezone utilities for date handling
//!
//! Station timestamps are wall-clock times in the station's timezone. This
//! module resolves which timezone that is (configured name, `local` for the
//! system timezone, or the `America/Sao_Paulo` default) and converts
//! offset-carrying timestamps into it.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

/// Timezone used when nothing is configured
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Sao_Paulo;

/// Configuration for timezone handling
#[derive(Debug, Clone)]
pub struct TimezoneConfig {
    /// The timezone to use for date operations
    pub tz: Tz,
    /// Whether the timezone is UTC
    pub is_utc: bool,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            tz: DEFAULT_TIMEZONE,
            is_utc: false,
        }
    }
}

impl TimezoneConfig {
    /// Create a timezone configuration from a user-supplied name
    ///
    /// `None` selects the default, `"local"` detects the system timezone.
    pub fn from_name(timezone_str: Option<&str>) -> crate::error::Result<Self> {
        let tz = match timezone_str.map(str::trim) {
            None | Some("") => DEFAULT_TIMEZONE,
            Some(name) if name.eq_ignore_ascii_case("local") => get_local_timezone(),
            Some(name) => Tz::from_str(name).map_err(|_| {
                crate::error::FuelstatError::InvalidTimezone(format!(
                    "'{}'. Use format like 'America/Sao_Paulo', 'UTC', or 'local'",
                    name
                ))
            })?,
        };
        Ok(Self {
            tz,
            is_utc: tz == Tz::UTC,
        })
    }

    /// Get the display name for the configured timezone
    pub fn display_name(&self) -> &str {
        if self.is_utc { "UTC" } else { self.tz.name() }
    }

    /// Current wall-clock time in the configured timezone
    pub fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.tz).naive_local()
    }

    /// Convert an offset-carrying timestamp to wall-clock time in this timezone
    pub fn localize<Z: TimeZone>(&self, dt: &DateTime<Z>) -> NaiveDateTime {
        dt.with_timezone(&self.tz).naive_local()
    }
}

/// Detect the system's local timezone
///
/// Falls back to UTC when detection fails.
pub fn get_local_timezone() -> Tz {
    #[allow(clippy::collapsible_if)]
    if let Ok(tz_str) = std::env::var("TZ") {
        if let Ok(tz) = Tz::from_str(&tz_str) {
            debug!("Using timezone from TZ environment variable: {}", tz_str);
            return tz;
        }
    }

    match iana_time_zone::get_timezone() {
        Ok(tz_str) => match Tz::from_str(&tz_str) {
            Ok(tz) => {
                debug!("Using system timezone from iana-time-zone: {}", tz_str);
                tz
            }
            Err(_) => {
                debug!(
                    "Could not parse timezone from iana-time-zone: '{}', falling back to UTC",
                    tz_str
                );
                Tz::UTC
            }
        },
        Err(e) => {
            debug!(
                "Could not detect local timezone via iana-time-zone: {:?}, falling back to UTC",
                e
            );
            Tz::UTC
        }
    }
}
