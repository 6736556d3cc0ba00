//! Client core and notification relay for DailyGrind, a social network where
//! everyone gets one post per day inside a fixed posting window.
//!
//! The library is split the way the app is used:
//! - [`window`] decides whether "now" is a valid posting time,
//! - [`store`] holds the signed-in user's cached profile and posts,
//! - [`core::client::ApiClient`] plus the domain modules ([`users`], [`posts`],
//!   [`friends`], [`push`]) talk to the backend services,
//! - [`session`] composes those into the flows the screens drive,
//! - [`relay`] hosts the two push-notification functions.

pub mod auth;
pub mod config;
pub mod core;
pub mod friends;
pub mod models;
pub mod notification;
pub mod posts;
pub mod push;
pub mod relay;
pub mod session;
pub mod store;
pub mod users;
pub mod validation;
pub mod window;
