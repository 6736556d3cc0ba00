use anyhow::Context;
use async_trait::async_trait;
use tracing::debug;
use web_push::{
    ContentEncoding, IsahcWebPushClient, SubscriptionInfo, VapidSignatureBuilder, WebPushClient,
    WebPushMessageBuilder,
};

use crate::config::RelayConfig;
use crate::models::models::PushSubscription;
use crate::relay::PushDelivery;

/// The two forms a VAPID private key is handed out in.
#[derive(Debug, Clone, PartialEq, Eq)]
enum VapidKey {
    /// Raw 32-byte key in URL-safe base64, as key generators print it.
    Base64(String),
    Pem(String),
}

impl VapidKey {
    fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("-----BEGIN") {
            VapidKey::Pem(raw.to_string())
        } else {
            VapidKey::Base64(raw.trim_end_matches('=').to_string())
        }
    }

    fn signer<'a>(&self, info: &'a SubscriptionInfo) -> anyhow::Result<VapidSignatureBuilder<'a>> {
        let builder = match self {
            VapidKey::Pem(pem) => VapidSignatureBuilder::from_pem(pem.as_bytes(), info),
            VapidKey::Base64(encoded) => {
                VapidSignatureBuilder::from_base64(encoded, base64::URL_SAFE_NO_PAD, info)
            }
        };
        builder.context("Invalid VAPID private key")
    }
}

/// Web Push delivery signed with the relay's VAPID key.
pub struct VapidDelivery {
    client: IsahcWebPushClient,
    private_key: Option<VapidKey>,
    subject: String,
}

impl VapidDelivery {
    pub fn new(config: &RelayConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: IsahcWebPushClient::new().context("Failed to create push client")?,
            private_key: config.vapid_private_key.as_deref().map(VapidKey::parse),
            subject: config.vapid_subject.clone(),
        })
    }
}

#[async_trait]
impl PushDelivery for VapidDelivery {
    async fn deliver(&self, subscription: &PushSubscription, payload: &str) -> anyhow::Result<()> {
        let key = self
            .private_key
            .as_ref()
            .context("PRIVATE_VAPID_KEY is not configured")?;
        let info = SubscriptionInfo::new(
            &subscription.endpoint,
            &subscription.keys.p256dh,
            &subscription.keys.auth,
        );

        let mut signature = key.signer(&info)?;
        signature.add_claim("sub", self.subject.as_str());

        let mut message = WebPushMessageBuilder::new(&info);
        message.set_payload(ContentEncoding::Aes128Gcm, payload.as_bytes());
        message.set_vapid_signature(signature.build()?);

        debug!(endpoint = %subscription.endpoint, bytes = payload.len(), "Pushing message");
        self.client.send(message.build()?).await?;
        Ok(())
    }
}
