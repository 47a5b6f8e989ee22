// src/config/agent.rs
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, str::FromStr};
use thiserror::Error;

pub const ENV_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";
pub const ENV_MAX_SEARCHES: &str = "DIGEST_MAX_SEARCHES";
pub const ENV_MAX_WORDS: &str = "DIGEST_MAX_WORDS";
pub const ENV_MODEL: &str = "DIGEST_MODEL";
pub const ENV_MODE: &str = "DIGEST_MODE";
pub const ENV_BASE_URL: &str = "ANTHROPIC_BASE_URL";
pub const ENV_CONFIG_PATH: &str = "DIGEST_CONFIG_PATH";
pub const ENV_TEST_MODE: &str = "DIGEST_TEST_MODE";

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MAX_SEARCHES: u32 = 5;
pub const DEFAULT_MAX_WORDS: u32 = 800;
pub const DEFAULT_RESEARCH_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_CURATE_MAX_TOKENS: u32 = 2048;

const MIN_MAX_WORDS: u32 = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ANTHROPIC_API_KEY environment variable not set")]
    MissingApiKey,
    #[error("unknown pipeline mode `{0}` (expected `two-step` or `combined`)")]
    UnknownMode(String),
    #[error("reading config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// How many completion calls one run makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineMode {
    /// Research call, then a separate curation call.
    #[default]
    TwoStep,
    /// One search call that returns the formatted digest directly.
    Combined,
}

impl FromStr for PipelineMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "two-step" | "two_step" | "twostep" => Ok(PipelineMode::TwoStep),
            "combined" | "single" => Ok(PipelineMode::Combined),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

/// Explicit runtime configuration handed to the agent at construction.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub api_key: String,
    /// `None` switches the agent to preview mode.
    pub webhook_url: Option<String>,
    pub max_searches: u32,
    pub max_words: u32,
    pub model: String,
    pub mode: PipelineMode,
    pub base_url: String,
    pub research_max_tokens: u32,
    pub curate_max_tokens: u32,
    /// Canned completions instead of the real provider (`DIGEST_TEST_MODE=mock`).
    pub mock_completions: bool,
}

impl AgentConfig {
    /// Config with defaults for everything but the credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            webhook_url: None,
            max_searches: DEFAULT_MAX_SEARCHES,
            max_words: DEFAULT_MAX_WORDS,
            model: DEFAULT_MODEL.to_string(),
            mode: PipelineMode::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            research_max_tokens: DEFAULT_RESEARCH_MAX_TOKENS,
            curate_max_tokens: DEFAULT_CURATE_MAX_TOKENS,
            mock_completions: false,
        }
    }

    pub fn with_webhook(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    pub fn with_mode(mut self, mode: PipelineMode) -> Self {
        self.mode = mode;
        self
    }

    /// Read from the process environment, layered over `$DIGEST_CONFIG_PATH` if set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_lookup(|k| std::env::var(k).ok())
    }

    /// Like [`from_env`](Self::from_env) but with an injectable lookup. A missing
    /// credential is reported ahead of any config file error.
    pub fn from_env_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match lookup(ENV_CONFIG_PATH).filter(|p| !p.trim().is_empty()) {
            Some(p) => match FileConfig::load_from_file(p.trim()) {
                Ok(file) => file,
                Err(e) => {
                    let has_key = lookup(ENV_API_KEY).is_some_and(|k| !k.trim().is_empty());
                    return Err(if has_key { e } else { ConfigError::MissingApiKey });
                }
            },
            None => FileConfig::default(),
        };
        Self::from_lookup(file, lookup)
    }

    /// Build from a key lookup (env-like) layered over file values. Env wins.
    pub fn from_lookup<F>(file: FileConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get(ENV_API_KEY)
            .or(file.api_key.filter(|k| !k.trim().eq_ignore_ascii_case("env")))
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut cfg = AgentConfig::new(api_key);
        cfg.webhook_url = get(ENV_WEBHOOK_URL).or(file.webhook_url.filter(|u| !u.trim().is_empty()));
        cfg.model = get(ENV_MODEL).or(file.model).unwrap_or(cfg.model);
        cfg.base_url = get(ENV_BASE_URL).or(file.base_url).unwrap_or(cfg.base_url);
        cfg.mock_completions = get(ENV_TEST_MODE).is_some_and(|v| v.eq_ignore_ascii_case("mock"));
        cfg.mode = match get(ENV_MODE) {
            Some(m) => m.parse()?,
            None => file.mode.unwrap_or_default(),
        };

        cfg.max_searches = parse_or(get(ENV_MAX_SEARCHES), file.max_searches, DEFAULT_MAX_SEARCHES);
        if cfg.max_searches == 0 {
            tracing::warn!("{ENV_MAX_SEARCHES} must be at least 1; using {DEFAULT_MAX_SEARCHES}");
            cfg.max_searches = DEFAULT_MAX_SEARCHES;
        }

        cfg.max_words = parse_or(get(ENV_MAX_WORDS), file.max_words, DEFAULT_MAX_WORDS);
        if cfg.max_words < MIN_MAX_WORDS {
            tracing::warn!("{ENV_MAX_WORDS} below {MIN_MAX_WORDS}; using {DEFAULT_MAX_WORDS}");
            cfg.max_words = DEFAULT_MAX_WORDS;
        }

        if let Some(t) = file.research_max_tokens.filter(|t| *t > 0) {
            cfg.research_max_tokens = t;
        }
        if let Some(t) = file.curate_max_tokens.filter(|t| *t > 0) {
            cfg.curate_max_tokens = t;
        }

        Ok(cfg)
    }

    /// Fails with [`ConfigError::MissingApiKey`] if the credential is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }

    /// Key length only; never log the key itself.
    pub fn redacted_summary(&self) -> String {
        format!(
            "model={}, mode={:?}, max_searches={}, max_words={}, webhook={}, mock={}, key_len={}",
            self.model,
            self.mode,
            self.max_searches,
            self.max_words,
            self.webhook_url.is_some(),
            self.mock_completions,
            self.api_key.len()
        )
    }
}

fn parse_or(raw: Option<String>, file: Option<u32>, default: u32) -> u32 {
    match raw {
        Some(s) => s.parse().unwrap_or_else(|_| {
            tracing::warn!(value = %s, "not a number; using default {default}");
            default
        }),
        None => file.unwrap_or(default),
    }
}

/// Optional TOML overlay. `api_key = "ENV"` means "read from the environment".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub api_key: Option<String>,
    pub webhook_url: Option<String>,
    pub max_searches: Option<u32>,
    pub max_words: Option<u32>,
    pub model: Option<String>,
    pub mode: Option<PipelineMode>,
    pub base_url: Option<String>,
    pub research_max_tokens: Option<u32>,
    pub curate_max_tokens: Option<u32>,
}

impl FileConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = AgentConfig::from_lookup(FileConfig::default(), lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));

        let err = AgentConfig::from_lookup(FileConfig::default(), lookup(&[(ENV_API_KEY, "  ")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let cfg = AgentConfig::from_lookup(FileConfig::default(), lookup(&[(ENV_API_KEY, "sk-test")]))
            .unwrap();
        assert_eq!(cfg.api_key, "sk-test");
        assert_eq!(cfg.webhook_url, None);
        assert_eq!(cfg.max_searches, DEFAULT_MAX_SEARCHES);
        assert_eq!(cfg.max_words, DEFAULT_MAX_WORDS);
        assert_eq!(cfg.mode, PipelineMode::TwoStep);
        assert_eq!(cfg.model, DEFAULT_MODEL);
    }

    #[test]
    fn empty_webhook_counts_as_absent() {
        let cfg = AgentConfig::from_lookup(
            FileConfig::default(),
            lookup(&[(ENV_API_KEY, "k"), (ENV_WEBHOOK_URL, "")]),
        )
        .unwrap();
        assert!(cfg.webhook_url.is_none());
    }

    #[test]
    fn bad_numbers_fall_back_to_defaults() {
        let cfg = AgentConfig::from_lookup(
            FileConfig::default(),
            lookup(&[
                (ENV_API_KEY, "k"),
                (ENV_MAX_SEARCHES, "0"),
                (ENV_MAX_WORDS, "lots"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.max_searches, DEFAULT_MAX_SEARCHES);
        assert_eq!(cfg.max_words, DEFAULT_MAX_WORDS);
    }

    #[test]
    fn env_overrides_file_values() {
        let file = FileConfig {
            api_key: Some("ENV".into()),
            max_searches: Some(3),
            mode: Some(PipelineMode::Combined),
            ..Default::default()
        };
        let cfg = AgentConfig::from_lookup(
            file.clone(),
            lookup(&[(ENV_API_KEY, "k"), (ENV_MAX_SEARCHES, "9")]),
        )
        .unwrap();
        assert_eq!(cfg.max_searches, 9);
        assert_eq!(cfg.mode, PipelineMode::Combined);

        // "ENV" placeholder without the env var is still a missing key
        let err = AgentConfig::from_lookup(file, lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn test_mode_comes_from_lookup() {
        let cfg = AgentConfig::from_lookup(FileConfig::default(), lookup(&[(ENV_API_KEY, "k")]))
            .unwrap();
        assert!(!cfg.mock_completions);

        let cfg = AgentConfig::from_lookup(
            FileConfig::default(),
            lookup(&[(ENV_API_KEY, "k"), (ENV_TEST_MODE, "mock")]),
        )
        .unwrap();
        assert!(cfg.mock_completions);
    }

    #[test]
    fn missing_key_wins_over_bad_config_path() {
        let err = AgentConfig::from_env_lookup(lookup(&[(ENV_CONFIG_PATH, "/no/such/digest.toml")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey), "{err}");

        let err = AgentConfig::from_env_lookup(lookup(&[
            (ENV_API_KEY, "k"),
            (ENV_CONFIG_PATH, "/no/such/digest.toml"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }), "{err}");
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("combined".parse::<PipelineMode>().unwrap(), PipelineMode::Combined);
        assert_eq!(" Two-Step ".parse::<PipelineMode>().unwrap(), PipelineMode::TwoStep);
        assert!(matches!(
            "triple".parse::<PipelineMode>(),
            Err(ConfigError::UnknownMode(_))
        ));
    }

    #[test]
    fn summary_does_not_leak_key() {
        let cfg = AgentConfig::new("sk-secret-value");
        let s = cfg.redacted_summary();
        assert!(!s.contains("sk-secret-value"));
        assert!(s.contains("key_len=15"));
    }
}
