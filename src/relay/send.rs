use serde_json::{json, Value};
use spin_sdk::http::{Request, Response};
use tracing::{error, info, warn};

use crate::core::errors::RelayError;
use crate::core::helpers::json_response;
use crate::models::models::PushSubscription;
use crate::relay::PushDelivery;

/// Accepts either `{ subscription, message }` directly or an event whose
/// `body` holds it, as a JSON string or an object.
fn extract_payload(raw: &[u8]) -> Result<Value, RelayError> {
    let invalid = |err: serde_json::Error| {
        warn!(error = %err, "Error parsing body");
        RelayError::BadRequest("Invalid body format".to_string())
    };
    let event: Value = serde_json::from_slice(raw).map_err(invalid)?;
    match event.get("body") {
        Some(Value::String(inner)) if !inner.is_empty() => serde_json::from_str(inner).map_err(invalid),
        Some(inner @ Value::Object(_)) => Ok(inner.clone()),
        _ => Ok(event),
    }
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(_) => true,
    }
}

async fn deliver(subscription: &Value, message: &Value, delivery: &dyn PushDelivery) -> anyhow::Result<()> {
    let subscription: PushSubscription = serde_json::from_value(subscription.clone())?;
    info!(endpoint = %subscription.endpoint, "Sending notification to subscription");
    let body = serde_json::to_string(message)?;
    delivery.deliver(&subscription, &body).await
}

async fn send(req: &Request, delivery: &dyn PushDelivery) -> Result<Response, RelayError> {
    let payload = extract_payload(req.body())?;
    let (subscription, message) = (payload.get("subscription"), payload.get("message"));
    if !is_present(subscription) || !is_present(message) {
        warn!(payload = %payload, "Missing subscription or message in payload");
        return Err(RelayError::BadRequest(
            "Missing subscription or message".to_string(),
        ));
    }

    let delivered = deliver(
        subscription.unwrap_or(&Value::Null),
        message.unwrap_or(&Value::Null),
        delivery,
    )
    .await;

    match delivered {
        Ok(()) => {
            info!("Notification sent successfully");
            Ok(json_response(
                200,
                &json!({ "message": "Notification sent successfully" }),
            ))
        }
        Err(err) => {
            error!(error = %err, "Error sending notification");
            Err(RelayError::DeliveryFailed {
                error: err.to_string(),
                stack: format!("{err:?}"),
            })
        }
    }
}

/// The send relay: validates the request and pushes the JSON-encoded
/// `message` to `subscription`.
pub async fn handle_send(req: &Request, delivery: &dyn PushDelivery) -> Response {
    send(req, delivery).await.unwrap_or_else(Response::from)
}
