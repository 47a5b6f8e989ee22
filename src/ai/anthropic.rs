use anyhow::{anyhow, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

use super::types::{CompletionRequest, CompletionResponse};
use super::CompletionClient;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API client. No retries; errors surface to the caller as-is.
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(api_key: &str, base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("news-digest-agent/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building reqwest client")?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key).context("api key is not a valid header value")?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl CompletionClient for AnthropicClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        tracing::debug!(
            model = %request.model,
            max_tokens = request.max_tokens,
            tools = request.tools.as_ref().map_or(0, Vec::len),
            "anthropic messages request"
        );

        let resp = self
            .http
            .post(self.messages_url())
            .headers(self.headers()?)
            .json(request)
            .send()
            .await
            .context("anthropic request")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Anthropic API error ({}): {}", status.as_u16(), body));
        }

        resp.json::<CompletionResponse>()
            .await
            .context("decoding anthropic response")
    }

    fn provider_name(&self) -> &'static str {
        "anthropic"
    }
}
