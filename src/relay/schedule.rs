use std::time::Duration;

use chrono::{Local, TimeDelta};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::json;
use spin_sdk::http::Response;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::{RelayConfig, DAILY_REMINDER_MESSAGE};
use crate::core::errors::RelayError;
use crate::core::helpers::json_response;
use crate::window::next_occurrence;

const RETRY_AFTER_GAP: Duration = Duration::from_secs(60 * 60);

async fn post_reminder(client: &Client, url: &str) -> Result<(u16, String), reqwest::Error> {
    let response = client
        .post(url)
        .header(CONTENT_TYPE, "text/plain")
        .body(DAILY_REMINDER_MESSAGE)
        .send()
        .await?;
    let status = response.status().as_u16();
    let body = response.text().await?;
    Ok((status, body))
}

/// The schedule relay: asks the push service to broadcast the daily
/// reminder. Any HTTP answer from the service counts as triggered; only a
/// transport failure is an error.
pub async fn trigger_daily(config: &RelayConfig, client: &Client) -> Response {
    let url = config.send_endpoint();
    info!(url = %url, "Starting scheduled notification trigger");

    match post_reminder(client, &url).await {
        Ok((status_code, body)) => {
            info!(status_code, "Push notification triggered");
            json_response(
                200,
                &json!({
                    "message": "Daily notification successfully triggered",
                    "serviceResponse": { "statusCode": status_code, "body": body },
                }),
            )
        }
        Err(err) => {
            error!(error = %err, "Error triggering push notification");
            RelayError::TriggerFailed(err.to_string()).into()
        }
    }
}

/// Fires [`trigger_daily`] at `config.reminder_at` local time every day
/// until `cancel` fires.
pub async fn run_daily(config: RelayConfig, client: Client, cancel: CancellationToken) {
    loop {
        let now = Local::now();
        let wait = match next_occurrence(config.reminder_at, &(now + TimeDelta::seconds(1))) {
            Some(next) => {
                info!(next = %next, "Next daily reminder scheduled");
                (next - now).to_std().unwrap_or_default()
            }
            None => {
                warn!(at = %config.reminder_at, "Reminder time does not exist today, retrying later");
                RETRY_AFTER_GAP
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Daily reminder schedule stopped");
                return;
            }
            _ = tokio::time::sleep(wait) => {
                let response = trigger_daily(&config, &client).await;
                if *response.status() != 200 {
                    warn!(status = *response.status(), "Daily reminder was not triggered");
                }
            }
        }
    }
}
