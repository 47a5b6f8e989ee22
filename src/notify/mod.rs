pub mod slack;

use std::sync::Mutex;

use anyhow::{Context, Result};
use reqwest::Client;

pub use slack::SlackPublisher;

/// Outcome of one webhook delivery. Console reporting only; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResult {
    pub delivered: bool,
    pub status: u16,
    pub body: Option<String>,
}

impl DeliveryResult {
    pub fn ok(status: u16) -> Self {
        Self {
            delivered: true,
            status,
            body: None,
        }
    }

    pub fn rejected(status: u16, body: String) -> Self {
        Self {
            delivered: false,
            status,
            body: Some(body),
        }
    }

    /// "{status} - {body}" for failures; `None` when delivered.
    pub fn diagnostic(&self) -> Option<String> {
        if self.delivered {
            return None;
        }
        let body = self.body.as_deref().unwrap_or("");
        Some(format!("{} - {body}", self.status))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: u16,
    pub body: String,
}

/// Outbound JSON POST. Split out so delivery can be exercised without a network.
#[async_trait::async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<WebhookResponse>;
}

/// reqwest-backed transport with the client's default timeouts.
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl WebhookTransport for HttpTransport {
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<WebhookResponse> {
        let rsp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("webhook post")?;
        let status = rsp.status().as_u16();
        let body = rsp.text().await.context("webhook response body")?;
        Ok(WebhookResponse { status, body })
    }
}

/// Answers every post with a fixed status and records the bodies it was sent.
pub struct MockTransport {
    status: u16,
    body: String,
    posts: Mutex<Vec<(String, serde_json::Value)>>,
}

impl MockTransport {
    pub fn responding(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            posts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.posts.lock().expect("poisoned mock posts").len()
    }

    pub fn posts(&self) -> Vec<(String, serde_json::Value)> {
        self.posts.lock().expect("poisoned mock posts").clone()
    }
}

#[async_trait::async_trait]
impl WebhookTransport for MockTransport {
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<WebhookResponse> {
        self.posts
            .lock()
            .expect("poisoned mock posts")
            .push((url.to_string(), body.clone()));
        Ok(WebhookResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}
