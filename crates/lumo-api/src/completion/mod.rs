//! Tool-calling completion service (Anthropic Messages or OpenAI-compatible).

pub mod client;
pub mod types;
