//! Curator: turns raw findings into the newsletter format.
//!
//! The format is a soft contract. The model is asked for 5-7 stories under a word
//! budget; nothing here enforces that (see `Digest::shape` for the advisory check).

use anyhow::Result;

use crate::ai::{CompletionRequest, ContentBlock, DynCompletionClient};
use crate::config::AgentConfig;
use crate::pipeline::digest::Digest;

pub(crate) fn format_requirements(max_words: u32) -> String {
    format!(
        "FORMAT REQUIREMENTS:\n\
         - Start with a one-line \"TLDR\" of the week's theme\n\
         - Each story should have:\n  \
           - A bold headline (use *bold* for Slack)\n  \
           - 2-3 sentence summary explaining why it matters\n  \
           - Source attribution\n\
         - End with a \"Worth Watching\" section with 1-2 developing stories\n\
         - Keep total length under {max_words} words\n\
         - Use plain text with Slack-compatible formatting (*bold*, _italic_, • for bullets)\n\
         - No emoji overload - keep it professional"
    )
}

pub fn curation_prompt(findings: &str, max_words: u32) -> String {
    format!(
        "You are curating a weekly AI newsletter. Based on the following news gathered \
         from the past week, create a concise newsletter with exactly 5-7 of the most \
         important stories.\n\nRAW NEWS:\n{findings}\n\n{}\n\nWrite the newsletter now:",
        format_requirements(max_words)
    )
}

/// First text segment, verbatim.
pub fn first_text(blocks: &[ContentBlock]) -> Option<&str> {
    blocks.iter().find_map(ContentBlock::as_text)
}

pub struct Curator {
    client: DynCompletionClient,
    model: String,
    max_tokens: u32,
    max_words: u32,
}

impl Curator {
    pub fn new(client: DynCompletionClient, config: &AgentConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            max_tokens: config.curate_max_tokens,
            max_words: config.max_words,
        }
    }

    pub fn request(&self, findings: &str) -> CompletionRequest {
        CompletionRequest::new(&self.model, self.max_tokens)
            .user(curation_prompt(findings, self.max_words))
    }

    /// Empty findings still go out; the model will say it found nothing.
    pub async fn curate(&self, findings: &str) -> Result<Digest> {
        if findings.trim().is_empty() {
            tracing::warn!("curating empty findings report");
        }
        let resp = self.client.complete(&self.request(findings)).await?;
        match first_text(&resp.content) {
            Some(text) => Ok(Digest::new(text)),
            None => {
                tracing::warn!(blocks = resp.content.len(), "curation returned no text segment");
                Ok(Digest::new(""))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{CompletionResponse, MockCompletionClient};
    use std::sync::Arc;

    #[test]
    fn prompt_embeds_findings_and_rules() {
        let p = curation_prompt("OpenAI shipped X.", 800);
        assert!(p.contains("RAW NEWS:\nOpenAI shipped X."));
        assert!(p.contains("exactly 5-7"));
        assert!(p.contains("TLDR"));
        assert!(p.contains("*bold*"));
        assert!(p.contains("Worth Watching"));
        assert!(p.contains("under 800 words"));
    }

    #[tokio::test]
    async fn takes_only_the_first_text_segment() {
        let mock = Arc::new(MockCompletionClient::scripted(
            vec![CompletionResponse::from_blocks(vec![
                ContentBlock::Other,
                ContentBlock::text("digest body"),
                ContentBlock::text("trailing note"),
            ])],
            CompletionResponse::default(),
        ));
        let c = Curator::new(mock.clone(), &AgentConfig::new("k"));
        let d = c.curate("findings").await.unwrap();
        assert_eq!(d.as_str(), "digest body");

        let req = &mock.requests()[0];
        assert!(req.tools.is_none());
        assert_eq!(req.max_tokens, 2048);
    }

    #[tokio::test]
    async fn empty_findings_still_calls_the_service() {
        let mock = Arc::new(MockCompletionClient::fixed("Nothing notable this week."));
        let c = Curator::new(mock.clone(), &AgentConfig::new("k"));
        let d = c.curate("").await.unwrap();
        assert_eq!(mock.call_count(), 1);
        assert_eq!(d.as_str(), "Nothing notable this week.");
    }

    #[tokio::test]
    async fn no_text_segment_gives_empty_digest() {
        let mock = Arc::new(MockCompletionClient::scripted(
            Vec::new(),
            CompletionResponse::from_blocks(vec![ContentBlock::Other]),
        ));
        let c = Curator::new(mock, &AgentConfig::new("k"));
        assert!(c.curate("x").await.unwrap().is_empty());
    }
}
