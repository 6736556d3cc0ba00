//! The two notification relay functions.
//!
//! `send` pushes one message to one browser subscription. `schedule` is the
//! daily timer that asks the push service to notify every subscriber. Both
//! take a spin [`Request`](spin_sdk::http::Request) and always answer with a
//! JSON [`Response`](spin_sdk::http::Response), so they can run behind the
//! native host in `src/bin/main.rs` or any other adapter.

use async_trait::async_trait;

use crate::models::models::PushSubscription;

pub mod schedule;
pub mod send;
pub mod webpush;

pub use schedule::{run_daily, trigger_daily};
pub use send::handle_send;
pub use webpush::VapidDelivery;

/// Delivers an encrypted payload to a single push subscription.
#[async_trait]
pub trait PushDelivery: Send + Sync {
    async fn deliver(&self, subscription: &PushSubscription, payload: &str) -> anyhow::Result<()>;
}
