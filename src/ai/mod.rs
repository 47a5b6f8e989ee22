//! AI completion seam: provider trait, the Anthropic client, and a mock for tests/local runs.

pub mod anthropic;
pub mod types;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::config::AgentConfig;

pub use anthropic::AnthropicClient;
pub use types::{CompletionRequest, CompletionResponse, ContentBlock, Message, Role, WebSearchTool};

/// A completion service. One request in, one structured response out.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynCompletionClient = Arc<dyn CompletionClient>;

/// Factory: build the client for this run.
///
/// * If `config.mock_completions`, returns a deterministic mock client.
/// * Else the real Anthropic client.
pub fn build_client(config: &AgentConfig) -> Result<DynCompletionClient> {
    if config.mock_completions {
        tracing::warn!("mock completions enabled: using canned completions");
        return Ok(Arc::new(MockCompletionClient::fixed(MOCK_DIGEST)));
    }
    Ok(Arc::new(AnthropicClient::new(&config.api_key, &config.base_url)?))
}

const MOCK_DIGEST: &str = "*TLDR:* A quiet week (mock).\n\n\
*1. Mock model release*\nA placeholder story so the pipeline can run offline. Source: mock\n\n\
*Worth Watching*\n• Nothing real, this is test mode.";

/// Replays scripted responses in order, then repeats the fallback. Records every request.
pub struct MockCompletionClient {
    script: Mutex<VecDeque<Result<CompletionResponse, String>>>,
    fallback: CompletionResponse,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionClient {
    pub fn fixed(text: &str) -> Self {
        Self::scripted(Vec::new(), CompletionResponse::from_text(text))
    }

    pub fn scripted(responses: Vec<CompletionResponse>, fallback: CompletionResponse) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().map(Ok).collect()),
            fallback,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Next call fails with `message`.
    pub fn push_error(&self, message: &str) {
        self.script
            .lock()
            .expect("poisoned mock script")
            .push_back(Err(message.to_string()));
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("poisoned mock requests").len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("poisoned mock requests").clone()
    }
}

#[async_trait::async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.requests
            .lock()
            .expect("poisoned mock requests")
            .push(request.clone());
        let next = self.script.lock().expect("poisoned mock script").pop_front();
        match next {
            Some(Ok(resp)) => Ok(resp),
            Some(Err(msg)) => Err(anyhow::anyhow!(msg)),
            None => Ok(self.fallback.clone()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
