use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveTime;
use tracing::{info, warn};

pub const MAX_POST_TITLE_LENGTH: usize = 100;
pub const MAX_POST_LENGTH: usize = 5000;
pub const MAX_COMMENT_LENGTH: usize = 1000;

pub const DEFAULT_WINDOW_START: &str = "11:00";
pub const DEFAULT_WINDOW_END: &str = "13:00";
pub const DEFAULT_RECHECK_SECS: u64 = 60;

pub const USERS_PREFIX: &str = "users";
pub const POSTS_PREFIX: &str = "posts";
pub const PUSH_PREFIX: &str = "push-notifications";

/// Dev ports per backend service, keyed by path prefix.
pub const DEV_SERVICE_MAP: [(&str, &str); 3] = [
    (USERS_PREFIX, "http://localhost:8082/"),
    (POSTS_PREFIX, "http://localhost:8080/"),
    (PUSH_PREFIX, "http://localhost:8081/"),
];

/// Anonymous-write bucket for profile pictures (LocalStack in dev).
pub const DEFAULT_PROFILE_BUCKET_URL: &str = "http://localhost:4566/dailygrind-profile-pictures";

pub const DEFAULT_REMINDER_AT: &str = "11:00";
pub const DEFAULT_RELAY_BIND: &str = "0.0.0.0:80";
pub const DAILY_REMINDER_MESSAGE: &str = "Time for your daily grind! Your posting window is open.";

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn try_load<T: FromStr>(key: &str, default: T) -> T
where
    T::Err: Display,
{
    match var(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default");
            default
        }),
        None => {
            info!("{key} not set, using default");
            default
        }
    }
}

/// Parses `HH:MM` (or `HH:MM:SS`) into a time of day.
pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

fn load_clock(key: &str, default: &str) -> NaiveTime {
    let fallback = parse_clock(default).unwrap_or(NaiveTime::MIN);
    match var(key) {
        Some(raw) => parse_clock(&raw).unwrap_or_else(|| {
            warn!("Invalid {key} value {raw:?}, expected HH:MM, using {default}");
            fallback
        }),
        None => fallback,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub recheck: Duration,
}

impl WindowConfig {
    pub fn load() -> Self {
        let start = load_clock("DAILYGRIND_POST_WINDOW_START", DEFAULT_WINDOW_START);
        let end = load_clock("DAILYGRIND_POST_WINDOW_END", DEFAULT_WINDOW_END);
        let (start, end) = if start <= end {
            (start, end)
        } else {
            warn!(%start, %end, "Posting window start is after its end, swapping");
            (end, start)
        };
        Self {
            start,
            end,
            recheck: Duration::from_secs(
                try_load("DAILYGRIND_POSTING_RECHECK_SECS", DEFAULT_RECHECK_SECS).max(1),
            ),
        }
    }
}

/// Where backend calls go: a single production gateway or the dev service map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiConfig {
    Gateway(String),
    Dev,
}

impl ApiConfig {
    pub fn load() -> Self {
        match var("DAILYGRIND_API_URL") {
            Some(url) => {
                info!(url = %url, "Using production API gateway");
                ApiConfig::Gateway(url)
            }
            None => {
                info!("DAILYGRIND_API_URL not set, routing to local dev services");
                ApiConfig::Dev
            }
        }
    }
}

pub fn profile_bucket_url() -> String {
    var("DAILYGRIND_PROFILE_BUCKET_URL").unwrap_or_else(|| DEFAULT_PROFILE_BUCKET_URL.to_string())
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// P-256 private key, either raw base64url (as `web-push generate-vapid-keys`
    /// prints it) or PEM.
    pub vapid_private_key: Option<String>,
    pub vapid_subject: String,
    pub api_hostname: String,
    pub api_port: u16,
    pub reminder_at: NaiveTime,
    pub bind: String,
}

impl RelayConfig {
    pub fn load() -> Self {
        let vapid_private_key = var("PRIVATE_VAPID_KEY");
        if vapid_private_key.is_none() {
            warn!("PRIVATE_VAPID_KEY not set, push delivery will fail");
        }
        Self {
            vapid_private_key,
            vapid_subject: try_load("VAPID_SUBJECT", "mailto:admin@dailygrind.local".to_string()),
            api_hostname: try_load("API_HOSTNAME", "localhost".to_string()),
            api_port: try_load("API_PORT", 8080),
            reminder_at: load_clock("DAILYGRIND_REMINDER_AT", DEFAULT_REMINDER_AT),
            bind: try_load("DAILYGRIND_RELAY_BIND", DEFAULT_RELAY_BIND.to_string()),
        }
    }

    pub fn send_endpoint(&self) -> String {
        format!(
            "http://{}:{}/{}/send",
            self.api_hostname, self.api_port, PUSH_PREFIX
        )
    }
}
