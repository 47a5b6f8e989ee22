//! Gatherer: the web-search call that researches the week.

use anyhow::Result;

use crate::ai::{CompletionRequest, ContentBlock, DynCompletionClient};
use crate::config::AgentConfig;
use crate::pipeline::curate::format_requirements;
use crate::window::TimeWindow;

const FOCUS_AREAS: &[&str] = &[
    "Major model releases or announcements (OpenAI, Anthropic, Google, Meta, etc.)",
    "Significant research breakthroughs",
    "AI policy and regulation news",
    "Notable AI product launches",
    "Important industry moves (funding, acquisitions, partnerships)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatherMode {
    /// Raw findings with sources, curated later.
    Research,
    /// Findings already shaped into the digest format.
    Combined,
}

pub fn research_prompt(window: &TimeWindow) -> String {
    let mut p = format!(
        "Search for the most significant AI news and developments from the past week \
         ({} to {}).\n\nFocus on:\n",
        window.start_label(),
        window.end_label()
    );
    for area in FOCUS_AREAS {
        p.push_str("- ");
        p.push_str(area);
        p.push('\n');
    }
    p.push_str(
        "\nSearch multiple times if needed to get comprehensive coverage.\n\
         Return a detailed summary of what you find with sources.",
    );
    p
}

pub fn combined_prompt(window: &TimeWindow, max_words: u32) -> String {
    format!(
        "{}\n\nThen, instead of the raw summary, write a weekly AI newsletter from your findings \
         with exactly 5-7 of the most important stories.\n\n{}\n\nWrite the newsletter now:",
        research_prompt(window),
        format_requirements(max_words)
    )
}

/// Concatenates every text segment in order. Tool records are skipped; no text yields "".
pub fn extract_text(blocks: &[ContentBlock]) -> String {
    blocks.iter().filter_map(ContentBlock::as_text).collect()
}

pub struct Gatherer {
    client: DynCompletionClient,
    model: String,
    max_tokens: u32,
    max_searches: u32,
    max_words: u32,
}

impl Gatherer {
    pub fn new(client: DynCompletionClient, config: &AgentConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            max_tokens: config.research_max_tokens,
            max_searches: config.max_searches,
            max_words: config.max_words,
        }
    }

    pub fn request(&self, window: &TimeWindow, mode: GatherMode) -> CompletionRequest {
        let prompt = match mode {
            GatherMode::Research => research_prompt(window),
            GatherMode::Combined => combined_prompt(window, self.max_words),
        };
        CompletionRequest::new(&self.model, self.max_tokens)
            .web_search(self.max_searches)
            .user(prompt)
    }

    pub async fn gather(&self, window: &TimeWindow, mode: GatherMode) -> Result<String> {
        let req = self.request(window, mode);
        let resp = self.client.complete(&req).await?;
        tracing::debug!(
            provider = self.client.provider_name(),
            blocks = resp.content.len(),
            stop_reason = ?resp.stop_reason,
            "gather response"
        );
        Ok(extract_text(&resp.content))
    }
}
