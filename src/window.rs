//! The daily posting window.
//!
//! Every user gets one post per day, and only while the local clock is
//! inside `[start, end]` (both ends inclusive). The backend enforces the
//! one-post rule; everything here is advisory and drives what the header
//! offers: an "Add daily Post" button, a countdown, or "come back tomorrow".

use std::fmt;

use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::config::WindowConfig;
use crate::models::models::Post;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingWindow {
    start: NaiveTime,
    end: NaiveTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingStatus {
    CanPost,
    AlreadyPosted,
    TooEarly { opens_at: NaiveTime },
    TooLate,
}

impl PostingStatus {
    pub fn can_post(&self) -> bool {
        matches!(self, PostingStatus::CanPost)
    }

    /// Header text shown next to the refresh button; empty when posting is open.
    pub fn message(&self) -> String {
        match self {
            PostingStatus::CanPost => String::new(),
            PostingStatus::AlreadyPosted => "You have already posted today".to_string(),
            PostingStatus::TooEarly { opens_at } => {
                format!("Come back at {} to post", opens_at.format("%H:%M"))
            }
            PostingStatus::TooLate => "Come back tomorrow to post".to_string(),
        }
    }
}

impl fmt::Display for PostingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostingStatus::CanPost => write!(f, "Add daily Post"),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl PostingWindow {
    /// Builds a window; a reversed pair is put back in order.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    pub fn from_config(config: &WindowConfig) -> Self {
        Self::new(config.start, config.end)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    fn contains_time(&self, time: NaiveTime) -> bool {
        time >= self.start && time <= self.end
    }

    /// Whether `now`'s local time of day lies inside the window.
    pub fn is_within<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        self.contains_time(now.time())
    }

    /// Whether `instant` falls inside the window instance on `now`'s date.
    pub fn in_todays_window<Tz: TimeZone>(&self, instant: &DateTime<Tz>, now: &DateTime<Tz>) -> bool {
        let local = instant.with_timezone(&now.timezone());
        local.date_naive() == now.date_naive() && self.contains_time(local.time())
    }

    /// True iff any post was made inside today's window. Posts from an
    /// earlier day's window never count, however recent, and unreadable
    /// timestamps are skipped.
    pub fn has_posted_today<Tz: TimeZone>(&self, posts: &[Post], now: &DateTime<Tz>) -> bool {
        let tz = now.timezone();
        posts
            .iter()
            .filter_map(|post| parse_timestamp(&post.timestamp, &tz))
            .any(|posted_at| self.in_todays_window(&posted_at, now))
    }

    /// Combines the clock check with a known "already posted" answer.
    /// Outside the window the clock wins.
    pub fn status<Tz: TimeZone>(&self, now: &DateTime<Tz>, has_posted: bool) -> PostingStatus {
        let time = now.time();
        if time < self.start {
            PostingStatus::TooEarly {
                opens_at: self.start,
            }
        } else if time > self.end {
            PostingStatus::TooLate
        } else if has_posted {
            PostingStatus::AlreadyPosted
        } else {
            PostingStatus::CanPost
        }
    }

    pub fn evaluate<Tz: TimeZone>(&self, posts: &[Post], now: &DateTime<Tz>) -> PostingStatus {
        self.status(now, self.has_posted_today(posts, now))
    }

    /// When the window next opens at or after `now`.
    pub fn next_opening<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        next_occurrence(self.start, now)
    }
}

impl Default for PostingWindow {
    fn default() -> Self {
        Self::from_config(&WindowConfig::load())
    }
}

/// The next instant at or after `now` whose local time of day is `at`.
pub fn next_occurrence<Tz: TimeZone>(at: NaiveTime, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let today = now.date_naive();
    [today, today.succ_opt()?]
        .into_iter()
        .filter_map(|day| tz.from_local_datetime(&day.and_time(at)).earliest())
        .find(|candidate| candidate >= now)
}

/// Reads a post timestamp: epoch milliseconds, RFC 3339, or a naive
/// `YYYY-MM-DDTHH:MM:SS` taken to be in `tz`.
pub fn parse_timestamp<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.bytes().all(|b| b.is_ascii_digit()) {
        let millis: i64 = raw.parse().ok()?;
        return Utc
            .timestamp_millis_opt(millis)
            .single()
            .map(|dt| dt.with_timezone(tz));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(tz));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
}
