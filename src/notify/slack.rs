use std::sync::Arc;

use anyhow::{Context, Result};

use super::{DeliveryResult, WebhookTransport};
use crate::render::RenderedPayload;

/// Posts a rendered digest to a Slack incoming webhook. One attempt, no retry.
pub struct SlackPublisher {
    webhook_url: String,
    transport: Arc<dyn WebhookTransport>,
}

impl SlackPublisher {
    pub fn new(webhook_url: impl Into<String>, transport: Arc<dyn WebhookTransport>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            transport,
        }
    }

    /// Delivered iff the webhook answers 200; any other status is a failed
    /// `DeliveryResult`. A post that never gets a response is an `Err`.
    pub async fn publish(&self, payload: &RenderedPayload) -> Result<DeliveryResult> {
        let body = serde_json::to_value(payload).context("serialize slack payload")?;

        let rsp = self
            .transport
            .post_json(&self.webhook_url, &body)
            .await
            .context("slack post")?;
        let result = if rsp.status == 200 {
            DeliveryResult::ok(rsp.status)
        } else {
            DeliveryResult::rejected(rsp.status, rsp.body)
        };

        match result.diagnostic() {
            None => tracing::info!(status = result.status, "slack webhook accepted digest"),
            Some(diag) => tracing::warn!(%diag, "slack webhook delivery failed"),
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{MockTransport, WebhookResponse};
    use crate::pipeline::Digest;
    use crate::render::render_digest;
    use chrono::Utc;

    fn payload() -> RenderedPayload {
        render_digest(&Digest::new("*TLDR* test"), &Utc::now())
    }

    #[tokio::test]
    async fn status_200_is_delivered() {
        let t = Arc::new(MockTransport::responding(200, "ok"));
        let p = SlackPublisher::new("https://hooks.example/abc", t.clone());
        let r = p.publish(&payload()).await.unwrap();
        assert!(r.delivered);
        assert_eq!(t.call_count(), 1);
        assert_eq!(t.posts()[0].0, "https://hooks.example/abc");
    }

    #[tokio::test]
    async fn other_statuses_fail_with_code_in_diagnostic() {
        for code in [201u16, 400, 403, 500] {
            let t = Arc::new(MockTransport::responding(code, "nope"));
            let p = SlackPublisher::new("https://hooks.example/abc", t);
            let r = p.publish(&payload()).await.unwrap();
            assert!(!r.delivered, "status {code} must not count as delivered");
            let diag = r.diagnostic().unwrap();
            assert!(diag.contains(&code.to_string()), "{diag}");
            assert!(diag.contains("nope"));
        }
    }

    struct Refused;

    #[async_trait::async_trait]
    impl WebhookTransport for Refused {
        async fn post_json(
            &self,
            _url: &str,
            _body: &serde_json::Value,
        ) -> Result<WebhookResponse> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn transport_error_propagates() {
        let p = SlackPublisher::new("http://127.0.0.1:9", Arc::new(Refused));
        let err = p.publish(&payload()).await.unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("slack post"), "{msg}");
        assert!(msg.contains("connection refused"), "{msg}");
    }
}
