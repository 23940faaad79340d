use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Map, Value};
use std::time::Duration;

use super::base::{Provider, Usage};
use super::configs::AnthropicProviderConfig;
use super::utils::INVALID_TOOL_NAME;
use crate::models::content::contents_to_text;
use crate::models::message::{Message, MessageContent};
use crate::models::role::Role;
use crate::models::tool::{Tool, ToolCall};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: i32 = 16_384;

pub struct AnthropicProvider {
    client: Client,
    config: AnthropicProviderConfig,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    fn get_usage(data: &Value) -> Usage {
        let Some(usage) = data.get("usage") else {
            return Usage::default();
        };

        let input_tokens = usage
            .get("input_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);
        let output_tokens = usage
            .get("output_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);
        let total_tokens = match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        };

        Usage::new(input_tokens, output_tokens, total_tokens)
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!("{}/v1/messages", self.config.host.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(anyhow!("Server error: {}", status))
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                Err(anyhow!("Request failed: {} - {}", status, error_text))
            }
        }
    }
}

/// Convert the transcript into anthropic content blocks
pub fn messages_to_anthropic_spec(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .filter_map(|message| {
            let content: Vec<Value> = message
                .content
                .iter()
                .filter_map(|content| match content {
                    MessageContent::Text(text) if text.text.is_empty() => None,
                    MessageContent::Text(text) => Some(json!({
                        "type": "text",
                        "text": text.text
                    })),
                    MessageContent::ToolRequest(request) => Some(match &request.tool_call {
                        Ok(call) => json!({
                            "type": "tool_use",
                            "id": request.id,
                            "name": call.name,
                            "input": call.arguments
                        }),
                        // keep the id so the matching tool_result still has a partner
                        Err(_) => json!({
                            "type": "tool_use",
                            "id": request.id,
                            "name": INVALID_TOOL_NAME,
                            "input": {}
                        }),
                    }),
                    MessageContent::ToolResponse(response) => Some(match &response.tool_result {
                        Ok(contents) => json!({
                            "type": "tool_result",
                            "tool_use_id": response.id,
                            "content": contents_to_text(contents)
                        }),
                        Err(e) => json!({
                            "type": "tool_result",
                            "tool_use_id": response.id,
                            "content": e.to_string(),
                            "is_error": true
                        }),
                    }),
                })
                .collect();

            if content.is_empty() {
                return None;
            }
            let role = match message.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            Some(json!({"role": role, "content": content}))
        })
        .collect()
}

/// Provider defined tools only send their type, everything else is a custom tool
pub fn tools_to_anthropic_spec(tools: &[Tool]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| match &tool.builtin {
            Some(builtin) => {
                let mut spec = Map::new();
                spec.insert("type".to_string(), json!(builtin.kind));
                spec.insert("name".to_string(), json!(tool.name));
                if let Some(options) = builtin.options.as_object() {
                    spec.extend(options.clone());
                }
                Value::Object(spec)
            }
            None => json!({
                "name": tool.name,
                "description": tool.description,
                "input_schema": tool.input_schema
            }),
        })
        .collect()
}

pub fn anthropic_response_to_message(response: &Value) -> Result<Message> {
    let blocks = response
        .get("content")
        .and_then(|c| c.as_array())
        .ok_or_else(|| anyhow!("Invalid response format from Anthropic API: {}", response))?;

    let mut message = Message::assistant();
    for block in blocks {
        match block.get("type").and_then(|t| t.as_str()) {
            Some("text") => {
                if let Some(text) = block.get("text").and_then(|t| t.as_str()) {
                    message = message.with_text(text);
                }
            }
            Some("tool_use") => {
                let id = block["id"].as_str().unwrap_or_default();
                let name = block["name"].as_str().unwrap_or_default();
                let input = block.get("input").cloned().unwrap_or_else(|| json!({}));
                message = message.with_tool_request(id, Ok(ToolCall::new(name, input)));
            }
            // thinking and other block types are not replayed
            _ => {}
        }
    }
    Ok(message)
}

#[async_trait]
impl Provider for AnthropicProvider {
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<(Message, Usage)> {
        let mut payload = json!({
            "model": self.config.model,
            "system": system,
            "messages": messages_to_anthropic_spec(messages),
            "max_tokens": self.config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
        });

        if !tools.is_empty() {
            payload["tools"] = json!(tools_to_anthropic_spec(tools));
        }
        if let Some(temp) = self.config.temperature {
            payload["temperature"] = json!(temp);
        }

        let response = self.post(payload).await?;

        let message = anthropic_response_to_message(&response)?;
        let usage = Self::get_usage(&response);

        Ok((message, usage))
    }
}
