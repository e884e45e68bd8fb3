use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

/// Completion provider wire format.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
pub enum Provider {
    #[default]
    #[serde(rename = "anthropic")]
    #[strum(serialize = "anthropic")]
    Anthropic,
    #[serde(rename = "openai")]
    #[strum(serialize = "openai")]
    OpenAiCompatible,
}

/// A tool offered to the model, in provider-neutral form.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments object.
    pub parameters: Value,
}

/// Single-turn request: a system prompt, one user message, and tools.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub tools: Vec<ToolDefinition>,
}

/// A function call requested by the model. `arguments` is always an object
/// (or `Null` when the provider sent something unparseable).
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Value,
}

/// Normalised reply: concatenated text plus any tool calls, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionResponse {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}
