pub mod agent;

pub use agent::{AgentConfig, ConfigError, FileConfig, PipelineMode};
