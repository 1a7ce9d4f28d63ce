use crate::error::{Result, SearchServiceError};
use std::fmt;
use std::time::Duration;

const DEFAULT_SCHEMA_UPDATE_INTERVAL: &str = "00:01:00";
const DEFAULT_INITIAL_SYNC_DELAY_MS: u64 = 2000;
const DEFAULT_API_VERSION: &str = "2015-02-28";

/// Timing of the background schema sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchServiceConfig {
    /// Fixed cadence between scheduled schema syncs.
    pub schema_update_interval: Duration,
    /// Grace period before the first scheduled sync after `connect`.
    pub initial_sync_delay: Duration,
}

impl Default for SearchServiceConfig {
    fn default() -> Self {
        Self {
            schema_update_interval: Duration::from_secs(60),
            initial_sync_delay: Duration::from_millis(DEFAULT_INITIAL_SYNC_DELAY_MS),
        }
    }
}

impl SearchServiceConfig {
    /// Config with the given interval (`[d.]hh:mm:ss[.fraction]`) and the
    /// default initial delay.
    pub fn new(schema_update_interval: &str) -> Result<Self> {
        Ok(Self {
            schema_update_interval: parse_interval(schema_update_interval)?,
            ..Default::default()
        })
    }

    pub fn with_initial_sync_delay(mut self, delay: Duration) -> Self {
        self.initial_sync_delay = delay;
        self
    }

    /// Load config from environment variables with sensible defaults.
    ///
    /// - `SEARCHLINK_SCHEMA_UPDATE_INTERVAL` (default `00:01:00`)
    /// - `SEARCHLINK_INITIAL_SYNC_DELAY_MS` (default `2000`)
    pub fn from_env() -> Self {
        let interval_str = std::env::var("SEARCHLINK_SCHEMA_UPDATE_INTERVAL")
            .unwrap_or_else(|_| DEFAULT_SCHEMA_UPDATE_INTERVAL.to_string());

        let schema_update_interval = match parse_interval(&interval_str) {
            Ok(interval) => interval,
            Err(e) => {
                tracing::warn!(
                    "Invalid SEARCHLINK_SCHEMA_UPDATE_INTERVAL '{}': {}, using {}",
                    interval_str,
                    e,
                    DEFAULT_SCHEMA_UPDATE_INTERVAL
                );
                Self::default().schema_update_interval
            }
        };

        let initial_sync_delay = match std::env::var("SEARCHLINK_INITIAL_SYNC_DELAY_MS") {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(e) => {
                    tracing::warn!(
                        "Invalid SEARCHLINK_INITIAL_SYNC_DELAY_MS '{}': {}, using {}",
                        raw,
                        e,
                        DEFAULT_INITIAL_SYNC_DELAY_MS
                    );
                    Duration::from_millis(DEFAULT_INITIAL_SYNC_DELAY_MS)
                }
            },
            Err(_) => Duration::from_millis(DEFAULT_INITIAL_SYNC_DELAY_MS),
        };

        Self {
            schema_update_interval,
            initial_sync_delay,
        }
    }
}

/// Parse a time span in any of the forms `d`, `[d.]hh:mm` or
/// `[d.]hh:mm:ss[.fraction]`, e.g. `00:00:10`, `00:10` (ten minutes) or `1`
/// (one day).
///
/// Zero-length spans are rejected since they would spin the scheduler.
pub fn parse_interval(s: &str) -> Result<Duration> {
    let invalid = || SearchServiceError::Config(format!("Invalid time span: '{}'", s));
    let trimmed = s.trim();

    let parts: Vec<&str> = trimmed.split(':').collect();
    let (days, hours, minutes, seconds, nanos) = match parts.as_slice() {
        [days] => (parse_component(days, u64::MAX).ok_or_else(invalid)?, 0, 0, 0, 0),
        [head, minutes] | [head, minutes, _] => {
            let (days, hours) = match head.split_once('.') {
                Some((d, h)) => (parse_component(d, u64::MAX).ok_or_else(invalid)?, h),
                None => (0, *head),
            };
            let hours = parse_component(hours, 23).ok_or_else(invalid)?;
            let minutes = parse_component(minutes, 59).ok_or_else(invalid)?;
            let (seconds, nanos) = match parts.get(2) {
                Some(tail) => parse_seconds(tail).ok_or_else(invalid)?,
                None => (0, 0),
            };
            (days, hours, minutes, seconds, nanos)
        }
        _ => return Err(invalid()),
    };

    let total_secs = days
        .checked_mul(86_400)
        .and_then(|d| d.checked_add(hours * 3600 + minutes * 60 + seconds))
        .ok_or_else(invalid)?;
    let interval = Duration::new(total_secs, nanos);

    if interval.is_zero() {
        return Err(SearchServiceError::Config(format!(
            "Time span must be greater than zero: '{}'",
            s
        )));
    }
    Ok(interval)
}

/// `ss[.fraction]`, fraction up to nanosecond precision.
fn parse_seconds(s: &str) -> Option<(u64, u32)> {
    match s.split_once('.') {
        Some((sec, frac)) => {
            if frac.is_empty() || frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let nanos: u32 = format!("{:0<9}", frac).parse().ok()?;
            Some((parse_component(sec, 59)?, nanos))
        }
        None => Some((parse_component(s, 59)?, 0)),
    }
}

fn parse_component(s: &str, max: u64) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u64>().ok().filter(|v| *v <= max)
}

/// Parsed `key=value;` connection string for the remote search service.
///
/// Recognized keys (case-insensitive): `serviceUrl` (required), `apiKey`
/// (required), `apiVersion` (optional). Unknown keys are ignored.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    service_url: String,
    host: String,
    api_version: String,
    api_key: String,
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("service_url", &self.service_url)
            .field("api_version", &self.api_version)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ConnectionSettings {
    pub fn parse(connection_string: &str) -> Result<Self> {
        let mut service_url = None;
        let mut api_version = None;
        let mut api_key = None;

        for pair in connection_string.split(';') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                SearchServiceError::Connection(format!("Expected key=value, got '{}'", pair))
            })?;
            let value = value.trim().to_string();
            match key.trim().to_ascii_lowercase().as_str() {
                "serviceurl" => service_url = Some(value),
                "apiversion" => api_version = Some(value),
                "apikey" => api_key = Some(value),
                other => tracing::debug!("Ignoring unknown connection string key '{}'", other),
            }
        }

        let service_url = service_url
            .filter(|v| !v.is_empty())
            .ok_or_else(|| SearchServiceError::Connection("serviceUrl is required".into()))?;
        let api_key = api_key
            .filter(|v| !v.is_empty())
            .ok_or_else(|| SearchServiceError::Connection("apiKey is required".into()))?;

        let uri: http::Uri = service_url.parse().map_err(|e| {
            SearchServiceError::Connection(format!("Invalid serviceUrl '{}': {}", service_url, e))
        })?;
        match uri.scheme_str() {
            Some("http") | Some("https") => {}
            _ => {
                return Err(SearchServiceError::Connection(format!(
                    "serviceUrl must be an absolute http(s) URL, got '{}'",
                    service_url
                )))
            }
        }
        let host = uri
            .host()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| {
                SearchServiceError::Connection(format!("serviceUrl has no host: '{}'", service_url))
            })?
            .to_string();

        Ok(Self {
            service_url,
            host,
            api_version: api_version
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            api_key,
        })
    }

    /// Service identity: the first DNS label of the service host.
    pub fn service_name(&self) -> &str {
        self.host.split('.').next().unwrap_or(&self.host)
    }

    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}
