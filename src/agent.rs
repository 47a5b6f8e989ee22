//! Orchestrator: gather → (curate) → render → publish, or print a preview when no
//! webhook is configured. Every stage is awaited in turn; nothing runs concurrently.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::ai::DynCompletionClient;
use crate::config::{AgentConfig, ConfigError, PipelineMode};
use crate::notify::{DeliveryResult, SlackPublisher, WebhookTransport};
use crate::pipeline::{Curator, Digest, GatherMode, Gatherer};
use crate::render::render_digest;
use crate::window::TimeWindow;

const RULE: &str = "==================================================";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Webhook configured; `delivery` says whether it took.
    Published {
        digest: Digest,
        delivery: DeliveryResult,
    },
    /// No webhook; the digest went to stdout.
    Previewed { digest: Digest },
}

impl RunOutcome {
    pub fn digest(&self) -> &Digest {
        match self {
            RunOutcome::Published { digest, .. } | RunOutcome::Previewed { digest } => digest,
        }
    }

    /// A preview counts as success.
    pub fn succeeded(&self) -> bool {
        match self {
            RunOutcome::Published { delivery, .. } => delivery.delivered,
            RunOutcome::Previewed { .. } => true,
        }
    }
}

pub struct DigestAgent {
    config: AgentConfig,
    gatherer: Gatherer,
    curator: Curator,
    publisher: Option<SlackPublisher>,
}

impl DigestAgent {
    /// Refuses to build without a credential, so no call can go out.
    pub fn new(
        config: AgentConfig,
        ai: DynCompletionClient,
        transport: Arc<dyn WebhookTransport>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let publisher = config
            .webhook_url
            .as_ref()
            .map(|url| SlackPublisher::new(url.clone(), transport));
        if publisher.is_none() {
            warn!("SLACK_WEBHOOK_URL not set - will print newsletter instead of posting");
        }
        Ok(Self {
            gatherer: Gatherer::new(ai.clone(), &config),
            curator: Curator::new(ai, &config),
            publisher,
            config,
        })
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        self.run_at(Utc::now()).await
    }

    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunOutcome> {
        println!("{RULE}\nAI Newsletter Agent\n{RULE}");

        let digest = self.produce_digest(&now).await?;
        self.log_shape(&digest);

        let Some(publisher) = &self.publisher else {
            println!("\n{RULE}\nNEWSLETTER PREVIEW\n{RULE}\n{digest}");
            return Ok(RunOutcome::Previewed { digest });
        };

        println!("\n[{0}/{0}] Posting to Slack...", self.total_steps());
        let payload = render_digest(&digest, &now);
        let delivery = publisher.publish(&payload).await?;

        match delivery.diagnostic() {
            None => {
                println!("✓ Newsletter posted to Slack successfully");
                println!("\n{RULE}\nNewsletter delivered! ✓\n{RULE}");
            }
            Some(diag) => println!("✗ Failed to post to Slack: {diag}"),
        }
        Ok(RunOutcome::Published { digest, delivery })
    }

    async fn produce_digest(&self, now: &DateTime<Utc>) -> Result<Digest> {
        let window = TimeWindow::ending_at(now);
        let steps = self.total_steps();
        info!(
            start = %window.start,
            end = %window.end,
            mode = ?self.config.mode,
            "starting digest run"
        );

        match self.config.mode {
            PipelineMode::TwoStep => {
                println!("\n[1/{steps}] Searching for AI news from the past week...");
                let findings = self
                    .gatherer
                    .gather(&window, GatherMode::Research)
                    .await
                    .context("gathering news")?;
                println!("     Found {} characters of news content", findings.chars().count());

                println!("\n[2/{steps}] Curating newsletter...");
                let digest = self
                    .curator
                    .curate(&findings)
                    .await
                    .context("curating newsletter")?;
                println!("     Newsletter ready ({} characters)", digest.char_count());
                Ok(digest)
            }
            PipelineMode::Combined => {
                println!("\n[1/{steps}] Searching and writing newsletter in one pass...");
                let text = self
                    .gatherer
                    .gather(&window, GatherMode::Combined)
                    .await
                    .context("gathering news")?;
                let digest = Digest::new(text);
                println!("     Newsletter ready ({} characters)", digest.char_count());
                Ok(digest)
            }
        }
    }

    fn total_steps(&self) -> usize {
        let calls = match self.config.mode {
            PipelineMode::TwoStep => 2,
            PipelineMode::Combined => 1,
        };
        calls + usize::from(self.publisher.is_some())
    }

    fn log_shape(&self, digest: &Digest) {
        let shape = digest.shape();
        let concerns = shape.concerns(self.config.max_words);
        if concerns.is_empty() {
            info!(words = shape.words, stories = shape.stories, "digest shape ok");
        } else {
            warn!(
                words = shape.words,
                stories = shape.stories,
                concerns = %concerns.join("; "),
                "digest deviates from requested format (not enforced)"
            );
        }
    }
}
