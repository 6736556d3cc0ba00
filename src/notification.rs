//! Turning an incoming push message into something to display.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::helpers::sanitize_text;

pub const DEFAULT_TITLE: &str = "Push Notification";
pub const DEFAULT_BODY: &str = "No message content";
pub const EMPTY_PAYLOAD_BODY: &str = "Default notification message";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Milliseconds since the epoch.
    pub timestamp: i64,
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
    .map(|s| sanitize_text(&s))
    .filter(|s| !s.trim().is_empty())
}

fn timestamp_field(value: &Value) -> Option<i64> {
    match value.get("timestamp")? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl Notification {
    /// Decodes a push payload of the form `{ title?, body?, timestamp? }`.
    ///
    /// Never fails: a payload that is not JSON becomes the body under the
    /// default title, and a missing payload gets default text throughout.
    /// A JSON string is shown as the body; other bare JSON values carry no
    /// title or body and get the defaults.
    pub fn from_push_payload(payload: Option<&[u8]>, now: DateTime<Utc>) -> Self {
        let now_ms = now.timestamp_millis();
        let Some(bytes) = payload else {
            return Self {
                title: DEFAULT_TITLE.to_string(),
                body: EMPTY_PAYLOAD_BODY.to_string(),
                timestamp: now_ms,
            };
        };

        match serde_json::from_slice::<Value>(bytes) {
            Ok(value @ Value::Object(_)) => {
                debug!("Received JSON push payload");
                Self {
                    title: text_field(&value, "title").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
                    body: text_field(&value, "body").unwrap_or_else(|| DEFAULT_BODY.to_string()),
                    timestamp: timestamp_field(&value).unwrap_or(now_ms),
                }
            }
            Ok(Value::String(text)) => Self::plain(&text, now_ms),
            Ok(_) => {
                debug!("Push payload is a bare JSON value, showing defaults");
                Self::plain("", now_ms)
            }
            Err(_) => {
                warn!("Push payload is not JSON, showing it as text");
                Self::plain(&String::from_utf8_lossy(bytes), now_ms)
            }
        }
    }

    fn plain(text: &str, now_ms: i64) -> Self {
        let body = sanitize_text(text);
        Self {
            title: DEFAULT_TITLE.to_string(),
            body: if body.trim().is_empty() {
                DEFAULT_BODY.to_string()
            } else {
                body
            },
            timestamp: now_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 14, 11, 0, 0).unwrap()
    }

    #[test]
    fn json_payload_sets_title_and_body() {
        let n = Notification::from_push_payload(Some(br#"{"title":"T","body":"B"}"#), now());
        assert_eq!(n.title, "T");
        assert_eq!(n.body, "B");
        assert_eq!(n.timestamp, now().timestamp_millis());
    }

    #[test]
    fn plain_text_becomes_body() {
        let n = Notification::from_push_payload(Some(b"plain text"), now());
        assert_eq!(n.title, DEFAULT_TITLE);
        assert_eq!(n.body, "plain text");
    }

    #[test]
    fn missing_payload_uses_defaults() {
        let n = Notification::from_push_payload(None, now());
        assert_eq!(n.title, DEFAULT_TITLE);
        assert_eq!(n.body, EMPTY_PAYLOAD_BODY);
    }

    #[test]
    fn partial_json_falls_back_per_field() {
        let n = Notification::from_push_payload(Some(br#"{"body":"only body","timestamp":"1700000000000"}"#), now());
        assert_eq!(n.title, DEFAULT_TITLE);
        assert_eq!(n.body, "only body");
        assert_eq!(n.timestamp, 1_700_000_000_000);

        let n = Notification::from_push_payload(Some(b"{}"), now());
        assert_eq!(n.body, DEFAULT_BODY);
    }

    #[test]
    fn relayed_string_message_is_unwrapped() {
        // The send relay JSON-encodes plain string messages.
        let n = Notification::from_push_payload(Some(br#""Time to post""#), now());
        assert_eq!(n.title, DEFAULT_TITLE);
        assert_eq!(n.body, "Time to post");
    }

    #[test]
    fn bare_json_values_use_defaults() {
        for payload in ["42", "true", "[1,2]", "null"] {
            let n = Notification::from_push_payload(Some(payload.as_bytes()), now());
            assert_eq!(n.title, DEFAULT_TITLE);
            assert_eq!(n.body, DEFAULT_BODY);
        }
    }

    #[test]
    fn symbols_are_shown_as_written() {
        let n = Notification::from_push_payload(Some(br#"{"title":"Fish & Chips","body":"5 < 6"}"#), now());
        assert_eq!(n.title, "Fish & Chips");
        assert_eq!(n.body, "5 < 6");

        let n = Notification::from_push_payload(Some(b"Tom & Jerry"), now());
        assert_eq!(n.body, "Tom & Jerry");
    }

    #[test]
    fn markup_is_stripped() {
        let n = Notification::from_push_payload(Some(br#"{"title":"<i>Hi</i>","body":"<img src=x onerror=alert(1)>ok"}"#), now());
        assert_eq!(n.title, "Hi");
        assert_eq!(n.body, "ok");
    }
}
