//! Slack Block Kit rendering of a digest. Pure; no I/O.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::pipeline::Digest;
use crate::window::month_day_year;

pub const TITLE_LABEL: &str = "🤖 AI Weekly";
pub const FOOTER_TEXT: &str = "Curated by your AI Newsletter Agent • Powered by Claude";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TextObject {
    #[serde(rename = "plain_text")]
    PlainText { text: String, emoji: bool },
    #[serde(rename = "mrkdwn")]
    Mrkdwn { text: String },
}

impl TextObject {
    pub fn text(&self) -> &str {
        match self {
            TextObject::PlainText { text, .. } | TextObject::Mrkdwn { text } => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header { text: TextObject },
    Divider,
    Section { text: TextObject },
    Context { elements: Vec<TextObject> },
}

/// Message body posted to the webhook: `{"blocks": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedPayload {
    pub blocks: Vec<Block>,
}

impl RenderedPayload {
    /// Text of the section block carrying the digest.
    pub fn section_text(&self) -> Option<&str> {
        self.blocks.iter().find_map(|b| match b {
            Block::Section { text } => Some(text.text()),
            _ => None,
        })
    }

    pub fn header_text(&self) -> Option<&str> {
        self.blocks.iter().find_map(|b| match b {
            Block::Header { text } => Some(text.text()),
            _ => None,
        })
    }
}

pub fn title_for<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    format!("{TITLE_LABEL} — {}", month_day_year(now.date_naive()))
}

/// header, divider, section (digest verbatim), divider, context footer.
pub fn render_digest<Tz: TimeZone>(digest: &Digest, now: &DateTime<Tz>) -> RenderedPayload {
    RenderedPayload {
        blocks: vec![
            Block::Header {
                text: TextObject::PlainText {
                    text: title_for(now),
                    emoji: true,
                },
            },
            Block::Divider,
            Block::Section {
                text: TextObject::Mrkdwn {
                    text: digest.as_str().to_string(),
                },
            },
            Block::Divider,
            Block::Context {
                elements: vec![TextObject::Mrkdwn {
                    text: FOOTER_TEXT.to_string(),
                }],
            },
        ],
    }
}
