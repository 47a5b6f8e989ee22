use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

// A story line opens with a *bold* headline, optionally after a bullet or number.
static RE_STORY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:[•\-][ \t]*|\d+[.)][ \t]*)?\*[^*\n]+\*").expect("story regex")
});
static RE_TLDR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\btl;?dr\b").expect("tldr regex"));
static RE_WATCHING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)worth\s+watching").expect("watching regex"));

/// The curated newsletter text, exactly as the model wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Digest(String);

impl Digest {
    pub fn new(text: impl Into<String>) -> Self {
        Digest(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub fn shape(&self) -> DigestShape {
        let text = self.as_str();
        // Headings like "*TLDR:*" and "*Worth Watching*" also look bold; don't count them as stories.
        let stories = RE_STORY
            .find_iter(text)
            .filter(|m| !RE_TLDR.is_match(m.as_str()) && !RE_WATCHING.is_match(m.as_str()))
            .count();
        DigestShape {
            words: text.split_whitespace().count(),
            stories,
            has_tldr: RE_TLDR.is_match(text),
            has_worth_watching: RE_WATCHING.is_match(text),
        }
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Digest {
    fn from(s: String) -> Self {
        Digest(s)
    }
}

/// Rough structure of a digest. Advisory only, never used to reject one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestShape {
    pub words: usize,
    pub stories: usize,
    pub has_tldr: bool,
    pub has_worth_watching: bool,
}

impl DigestShape {
    pub const MIN_STORIES: usize = 5;
    pub const MAX_STORIES: usize = 7;

    pub fn concerns(&self, max_words: u32) -> Vec<String> {
        let mut out = Vec::new();
        if self.words > max_words as usize {
            out.push(format!("{} words exceeds target of {}", self.words, max_words));
        }
        if !(Self::MIN_STORIES..=Self::MAX_STORIES).contains(&self.stories) {
            out.push(format!(
                "{} stories detected (expected {}-{})",
                self.stories,
                Self::MIN_STORIES,
                Self::MAX_STORIES
            ));
        }
        if !self.has_tldr {
            out.push("no TLDR line".to_string());
        }
        if !self.has_worth_watching {
            out.push("no Worth Watching section".to_string());
        }
        out
    }
}
