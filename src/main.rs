//! Weekly AI news digest — binary entrypoint.
//! Meant to be fired by an external scheduler (cron or similar); one run per invocation.

use std::process::ExitCode;
use std::sync::Arc;

use news_digest_agent::ai::build_client;
use news_digest_agent::config::{AgentConfig, ConfigError};
use news_digest_agent::notify::HttpTransport;
use news_digest_agent::DigestAgent;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_digest_agent=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = match AgentConfig::from_env() {
        Ok(cfg) => cfg,
        Err(ConfigError::MissingApiKey) => {
            eprintln!("ERROR: ANTHROPIC_API_KEY environment variable not set");
            eprintln!("Set it with: export ANTHROPIC_API_KEY='your-key-here'");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("ERROR: {e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("config loaded: {}", config.redacted_summary());

    let ai = match build_client(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let agent = match DigestAgent::new(config, ai, Arc::new(HttpTransport::new())) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return ExitCode::FAILURE;
        }
    };

    match agent.run().await {
        // A failed delivery is logged above and still exits 0.
        Ok(outcome) => {
            if !outcome.succeeded() {
                tracing::warn!("run finished without delivering the newsletter");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = ?e, "digest run failed");
            eprintln!("ERROR: {e:#}");
            ExitCode::FAILURE
        }
    }
}
