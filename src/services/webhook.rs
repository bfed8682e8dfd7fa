//! Signed status-change notifications to the merchant's system.
//!
//! Delivery is best-effort and fire-and-forget: the status transition that
//! triggered a notification is already persisted, so a failed delivery is
//! logged and discarded, never surfaced to the caller.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;

use crate::services::retry::RetryPolicy;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub transaction_id: String,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct WebhookDispatcher {
    client: reqwest::Client,
    secret: String,
    callback_url: Option<String>,
    retry: RetryPolicy,
}

impl WebhookDispatcher {
    pub fn new(
        secret: String,
        callback_url: Option<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            secret,
            callback_url,
            retry: RetryPolicy::new(3, Duration::from_millis(200)),
        })
    }

    /// Hex HMAC-SHA256 over the exact serialized payload bytes. Receivers
    /// recompute over the raw body to verify.
    pub fn sign(&self, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Submit a notification without blocking the caller. A no-op when no
    /// callback URL is configured.
    pub fn notify(&self, transaction_id: &str, status: &str, updated_at: DateTime<Utc>) {
        let Some(url) = self.callback_url.clone() else {
            tracing::debug!(transaction_id, "no merchant callback URL, skipping webhook");
            return;
        };

        let payload = WebhookPayload {
            transaction_id: transaction_id.to_string(),
            status: status.to_string(),
            updated_at,
        };
        let dispatcher = self.clone();

        tokio::spawn(async move {
            if let Err(e) = dispatcher.deliver(&url, &payload).await {
                tracing::warn!(
                    transaction_id = %payload.transaction_id,
                    status = %payload.status,
                    error = %e,
                    "webhook delivery failed, dropping notification"
                );
            }
        });
    }

    /// Deliver one payload, retrying under the dispatcher's policy. Exposed
    /// for tests; production flows go through `notify`.
    pub async fn deliver(&self, url: &str, payload: &WebhookPayload) -> anyhow::Result<()> {
        let body = serde_json::to_string(payload)?;
        let signature = self.sign(body.as_bytes());

        self.retry
            .run(|| {
                let request = self
                    .client
                    .post(url)
                    .header("content-type", "application/json")
                    .header("x-signature", signature.clone())
                    .body(body.clone());

                async move {
                    let response = request.send().await?;
                    let status = response.status();
                    if !status.is_success() {
                        anyhow::bail!("webhook endpoint returned {}", status);
                    }
                    Ok(())
                }
            })
            .await
    }
}
