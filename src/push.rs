use reqwest::Method;
use tracing::info;

use crate::core::client::ApiClient;
use crate::core::errors::GatewayError;
use crate::models::models::PushSubscription;

impl ApiClient {
    /// Registers this device's push subscription with the signed-in user.
    pub async fn register_push_subscription(&self, subscription: &PushSubscription) -> Result<(), GatewayError> {
        info!(endpoint = %subscription.endpoint, "Registering push subscription");
        self.send_json_unit(Method::POST, "push-notifications/subscribe", subscription)
            .await
    }

    /// Asks the push service to fan `message` out to every subscriber.
    pub async fn trigger_push(&self, message: &str) -> Result<(), GatewayError> {
        self.send_text_unit(Method::POST, "push-notifications/send", message)
            .await
    }
}
