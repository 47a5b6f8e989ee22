// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod agent;
pub mod ai;
pub mod config;
pub mod notify;
pub mod pipeline;
pub mod render;
pub mod window;

// ---- Re-exports for stable public API ----
pub use crate::agent::{DigestAgent, RunOutcome};
pub use crate::config::{AgentConfig, ConfigError, PipelineMode};
pub use crate::notify::DeliveryResult;
pub use crate::pipeline::Digest;
pub use crate::render::{render_digest, RenderedPayload};
pub use crate::window::TimeWindow;
