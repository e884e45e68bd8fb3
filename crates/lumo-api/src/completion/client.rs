// Completion service client
//
// Builds provider-specific request bodies and normalises the two response
// shapes into `CompletionResponse`. Anthropic answers with content blocks
// (`text`, `tool_use`); OpenAI-compatible services answer with
// `choices[0].message` carrying `content` and `tool_calls` whose
// `arguments` is a JSON-encoded string.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::debug;

use crate::completion::types::{
    CompletionRequest, CompletionResponse, Provider, ToolCall, ToolDefinition,
};
use crate::error::Error;
use crate::transport::TransportConfig;

const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const MAX_TOKENS: u32 = 1024;

pub struct CompletionClient {
    http: reqwest::Client,
    url: String,
    api_key: SecretString,
    model: String,
    provider: Provider,
}

impl CompletionClient {
    /// Resolve URL and model defaults for `provider`.
    ///
    /// `base_url` only applies to OpenAI-compatible services; Anthropic
    /// accepts it as a full endpoint override.
    pub fn new(
        provider: Provider,
        api_key: SecretString,
        model: Option<String>,
        base_url: Option<&str>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, provider, api_key, model, base_url))
    }

    pub fn with_client(
        http: reqwest::Client,
        provider: Provider,
        api_key: SecretString,
        model: Option<String>,
        base_url: Option<&str>,
    ) -> Self {
        let (url, default_model) = match provider {
            Provider::Anthropic => (
                base_url.map_or_else(|| ANTHROPIC_URL.to_string(), String::from),
                "claude-sonnet-4-20250514",
            ),
            Provider::OpenAiCompatible => {
                let base = base_url.unwrap_or(OPENAI_BASE_URL).trim_end_matches('/');
                (format!("{base}/chat/completions"), "gpt-4o")
            }
        };

        Self {
            http,
            url,
            api_key,
            model: model.unwrap_or_else(|| default_model.to_string()),
            provider,
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one request and normalise the reply.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, Error> {
        debug!("POST {} (model {})", self.url, self.model);

        let builder = match self.provider {
            Provider::Anthropic => self
                .http
                .post(&self.url)
                .header("x-api-key", self.api_key.expose_secret())
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&anthropic_body(&self.model, request)),
            Provider::OpenAiCompatible => self
                .http
                .post(&self.url)
                .bearer_auth(self.api_key.expose_secret())
                .json(&openai_body(&self.model, request)),
        };

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;

        if status == 401 || status == 403 {
            return Err(Error::Authentication {
                message: format!("completion service rejected the API key (HTTP {status})"),
            });
        }
        if !(200..300).contains(&status) {
            let preview: String = text.chars().take(200).collect();
            return Err(Error::Completion {
                status,
                message: preview,
            });
        }

        let json: Value =
            serde_json::from_str(&text).map_err(|e| Error::deserialization(&e, text))?;

        match self.provider {
            Provider::Anthropic => Ok(parse_anthropic(&json)),
            Provider::OpenAiCompatible => parse_openai(&json),
        }
    }
}

// ── Anthropic ────────────────────────────────────────────────────────

fn anthropic_body(model: &str, request: &CompletionRequest) -> Value {
    let tools: Vec<Value> = request
        .tools
        .iter()
        .map(|t| {
            json!({
                "name": t.name,
                "description": t.description,
                "input_schema": t.parameters,
            })
        })
        .collect();

    json!({
        "model": model,
        "max_tokens": MAX_TOKENS,
        "system": request.system,
        "tools": tools,
        "messages": [{ "role": "user", "content": request.user }],
    })
}

fn parse_anthropic(json: &Value) -> CompletionResponse {
    let mut text_parts = Vec::new();
    let mut tool_calls = Vec::new();

    for block in json
        .get("content")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        match block.get("type").and_then(Value::as_str) {
            Some("text") => {
                if let Some(t) = block.get("text").and_then(Value::as_str) {
                    text_parts.push(t);
                }
            }
            Some("tool_use") => tool_calls.push(ToolCall {
                name: block
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                arguments: block.get("input").cloned().unwrap_or(Value::Null),
            }),
            _ => {}
        }
    }

    CompletionResponse {
        text: (!text_parts.is_empty()).then(|| text_parts.join("\n")),
        tool_calls,
    }
}

// ── OpenAI-compatible ────────────────────────────────────────────────

fn openai_tool(t: &ToolDefinition) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": t.name,
            "description": t.description,
            "parameters": t.parameters,
        }
    })
}

fn openai_body(model: &str, request: &CompletionRequest) -> Value {
    json!({
        "model": model,
        "max_tokens": MAX_TOKENS,
        "messages": [
            { "role": "system", "content": request.system },
            { "role": "user", "content": request.user },
        ],
        "tools": request.tools.iter().map(openai_tool).collect::<Vec<_>>(),
    })
}

fn parse_openai(json: &Value) -> Result<CompletionResponse, Error> {
    let message = json
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| Error::Deserialization {
            message: "no choices[0].message in completion response".into(),
            body: json.to_string(),
        })?;

    let text = message
        .get("content")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(String::from);

    let tool_calls = message
        .get("tool_calls")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|tc| {
            let func = tc.get("function").unwrap_or(&Value::Null);
            let arguments = func
                .get("arguments")
                .and_then(Value::as_str)
                .and_then(|raw| serde_json::from_str(raw).ok())
                .unwrap_or(Value::Null);
            ToolCall {
                name: func
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                arguments,
            }
        })
        .collect();

    Ok(CompletionResponse { text, tool_calls })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn anthropic_mixed_blocks() {
        let resp = parse_anthropic(&json!({
            "content": [
                { "type": "text", "text": "Sure." },
                { "type": "tool_use", "id": "t1", "name": "set_light_state",
                  "input": { "lightName": "all", "on": false } }
            ],
            "stop_reason": "tool_use"
        }));
        assert_eq!(resp.text.as_deref(), Some("Sure."));
        assert_eq!(resp.tool_calls.len(), 1);
        assert_eq!(resp.tool_calls[0].arguments["lightName"], "all");
    }

    #[test]
    fn openai_arguments_are_decoded() {
        let resp = parse_openai(&json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "c1",
                        "type": "function",
                        "function": {
                            "name": "set_light_state",
                            "arguments": "{\"lightName\":\"lamp\",\"brightness\":40}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }))
        .unwrap();
        assert!(resp.text.is_none());
        assert_eq!(resp.tool_calls[0].arguments["brightness"], 40);
    }

    #[test]
    fn openai_without_choices_is_error() {
        assert!(parse_openai(&json!({ "choices": [] })).is_err());
    }

    #[test]
    fn default_models_and_urls() {
        let c = CompletionClient::with_client(
            reqwest::Client::new(),
            Provider::OpenAiCompatible,
            SecretString::from("k".to_string()),
            None,
            Some("http://localhost:11434/v1/"),
        );
        assert_eq!(c.url, "http://localhost:11434/v1/chat/completions");
        assert_eq!(c.model(), "gpt-4o");
    }
}
