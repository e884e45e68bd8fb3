// ── Natural-language command translator ──
//
// Sends the user's text to a completion service with a single
// `set_light_state` tool, then executes each returned call against the
// cached lights through the controller. Service failures never escape:
// the caller always gets a printable reply.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use lumo_api::CompletionClient;
use lumo_api::completion::types::{
    CompletionRequest, CompletionResponse, ToolCall, ToolDefinition,
};
use lumo_api::transport::{TlsMode, TransportConfig};

use crate::color::named_color;
use crate::config::AssistantConfig;
use crate::controller::Controller;
use crate::error::CoreError;
use crate::model::LightUpdate;

pub const SET_LIGHT_STATE: &str = "set_light_state";
pub const APOLOGY: &str = "Sorry, I had trouble reaching the assistant service.";
pub const NOT_UNDERSTOOD: &str = "I didn't understand that.";
pub const DONE: &str = "Done.";

/// Completion backend seam.
pub trait CompletionService: Send + Sync {
    fn complete<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> BoxFuture<'a, Result<CompletionResponse, lumo_api::Error>>;
}

impl CompletionService for CompletionClient {
    fn complete<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> BoxFuture<'a, Result<CompletionResponse, lumo_api::Error>> {
        Box::pin(CompletionClient::complete(self, request))
    }
}

/// Arguments of one `set_light_state` call.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetLightState {
    light_name: String,
    on: Option<bool>,
    brightness: Option<f64>,
    color_name: Option<String>,
}

fn set_light_state_tool() -> ToolDefinition {
    ToolDefinition {
        name: SET_LIGHT_STATE.into(),
        description: "Control a specific light or all lights. Can turn on/off, set brightness, \
                      and set color."
            .into(),
        parameters: json!({
            "type": "object",
            "properties": {
                "lightName": {
                    "type": "string",
                    "description": "The name of the light to control. Use \"all\" to control all lights."
                },
                "on": {
                    "type": "boolean",
                    "description": "Whether to turn the light on (true) or off (false)."
                },
                "brightness": {
                    "type": "number",
                    "description": "Brightness level from 0 to 100."
                },
                "colorName": {
                    "type": "string",
                    "description": "Color name (e.g., red, blue, warm, cool, white)."
                }
            },
            "required": ["lightName"]
        }),
    }
}

fn system_prompt(light_names: &[&str]) -> String {
    format!(
        "You are lumo, a smart home assistant.\n\
         You have access to the following lights: {}.\n\
         If the user asks to change lights, use the '{SET_LIGHT_STATE}' tool.\n\
         If the user just wants to chat, reply helpfully.\n\
         Keep responses concise and friendly.",
        light_names.join(", ")
    )
}

pub struct Assistant {
    controller: Controller,
    service: Arc<dyn CompletionService>,
}

impl Assistant {
    pub fn new(controller: Controller, service: Arc<dyn CompletionService>) -> Self {
        Self {
            controller,
            service,
        }
    }

    /// Build an assistant backed by a real completion client. Completion
    /// endpoints are always verified against the system CA store.
    pub fn from_config(
        controller: Controller,
        config: &AssistantConfig,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: TlsMode::System,
            timeout,
        };
        let client = CompletionClient::new(
            config.provider,
            config.api_key.clone(),
            config.model.clone(),
            config.base_url.as_deref(),
            &transport,
        )?;
        Ok(Self::new(controller, Arc::new(client)))
    }

    /// Translate free text into light changes and return the reply.
    pub async fn process_user_request(&self, text: &str) -> String {
        let snapshot = self.controller.snapshot();
        let names: Vec<&str> = snapshot.lights.iter().map(|l| l.name.as_str()).collect();

        let request = CompletionRequest {
            system: system_prompt(&names),
            user: text.to_owned(),
            tools: vec![set_light_state_tool()],
        };

        let response = match self.service.complete(&request).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "completion request failed");
                return APOLOGY.into();
            }
        };

        if response.tool_calls.is_empty() {
            return response
                .text
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| NOT_UNDERSTOOD.into());
        }

        let mut replies = Vec::new();
        for call in &response.tool_calls {
            match self.execute_call(call).await {
                Ok(Some(reply)) => replies.push(reply),
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "assistant light command failed");
                    return APOLOGY.into();
                }
            }
        }

        if replies.is_empty() {
            DONE.into()
        } else {
            replies.join(" ")
        }
    }

    /// Run one tool call. `Ok(None)` means the call was not usable.
    async fn execute_call(&self, call: &ToolCall) -> Result<Option<String>, CoreError> {
        if call.name != SET_LIGHT_STATE {
            debug!(tool = %call.name, "ignoring unknown tool call");
            return Ok(None);
        }
        let args: SetLightState = match serde_json::from_value(call.arguments.clone()) {
            Ok(a) => a,
            Err(e) => {
                debug!(error = %e, "malformed set_light_state arguments");
                return Ok(None);
            }
        };

        let snapshot = self.controller.snapshot();
        let targets = snapshot.match_lights(&args.light_name);
        if targets.is_empty() {
            return Ok(Some(format!(
                "I couldn't find a light named \"{}\".",
                args.light_name
            )));
        }

        let mut update = LightUpdate::new();
        let mut actions = Vec::new();
        if let Some(on) = args.on {
            update = update.with_on(on);
            actions.push(String::from(if on { "turned on" } else { "turned off" }));
        }
        if let Some(brightness) = args.brightness {
            update = update.with_brightness(brightness);
            actions.push(format!("set to {}%", update.brightness().unwrap_or(brightness)));
        }
        if let Some(ref color) = args.color_name {
            match named_color(color) {
                Some(xy) => {
                    update = update.with_xy(xy);
                    actions.push(format!("changed to {}", color.trim().to_lowercase()));
                }
                None => debug!(color = %color, "unknown color name"),
            }
        }

        if update.is_empty() {
            return Ok(Some(match args.color_name {
                Some(color) => format!("I don't know the color \"{color}\"."),
                None => NOT_UNDERSTOOD.into(),
            }));
        }

        let ids: Vec<String> = targets.iter().map(|l| l.id.clone()).collect();
        let names: Vec<&str> = targets.iter().map(|l| l.name.as_str()).collect();
        self.controller.update_lights(&ids, update).await?;

        Ok(Some(format!(
            "OK, {} {}.",
            names.join(", "),
            actions.join(", ")
        )))
    }
}
