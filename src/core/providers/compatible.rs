//! Generic OpenAI-compatible provider.
//! OpenAI, OpenRouter, Ollama and most self-hosted gateways expose the same
//! `/chat/completions` format, so one implementation serves all of them.

use super::http_client::build_provider_client;
use super::response::{ContentBlock, MessageRole, ProviderMessage, ProviderResponse, StopReason};
use super::scrub::{api_error, scrub_secret_patterns};
use super::traits::{Provider, ToolChatRequest, ToolChoice};
use crate::core::tools::traits::ToolSpec;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub struct OpenAiCompatibleProvider {
    pub(crate) name: String,
    pub(crate) base_url: String,
    /// Pre-computed `"Bearer <key>"` header value.
    cached_auth_header: Option<String>,
    /// Local servers such as Ollama accept unauthenticated requests.
    requires_key: bool,
    cached_chat_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Debug, Clone, Serialize)]
struct OpenAiTool {
    r#type: &'static str,
    function: OpenAiToolDefinition,
}

#[derive(Debug, Clone, Serialize)]
struct OpenAiToolDefinition {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    r#type: String,
    function: OpenAiToolCallFunction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiToolCallFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

impl OpenAiCompatibleProvider {
    pub fn new(name: &str, base_url: &str, api_key: Option<&str>, requires_key: bool) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let cached_chat_url = if base_url.ends_with("chat/completions") {
            base_url.clone()
        } else {
            format!("{base_url}/chat/completions")
        };

        Self {
            name: name.to_string(),
            base_url,
            cached_auth_header: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(|k| format!("Bearer {k}")),
            requires_key,
            cached_chat_url,
            client: build_provider_client(),
        }
    }

    fn text_message(role: &'static str, content: String) -> Message {
        Message {
            role,
            content: Some(content),
            tool_calls: None,
        }
    }

    fn map_provider_message(provider_message: &ProviderMessage) -> Option<Message> {
        let mut text_parts = Vec::new();
        let mut tool_calls = Vec::new();

        for block in &provider_message.content {
            match block {
                ContentBlock::Text { text } => {
                    text_parts.push(scrub_secret_patterns(text).into_owned());
                }
                ContentBlock::ToolUse { id, name, input } => tool_calls.push(OpenAiToolCall {
                    id: id.clone(),
                    r#type: "function".to_string(),
                    function: OpenAiToolCallFunction {
                        name: name.clone(),
                        arguments: input.to_string(),
                    },
                }),
            }
        }

        let content = (!text_parts.is_empty()).then(|| text_parts.join("\n"));
        match provider_message.role {
            MessageRole::Assistant if content.is_some() || !tool_calls.is_empty() => {
                Some(Message {
                    role: "assistant",
                    content,
                    tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
                })
            }
            MessageRole::Assistant => None,
            MessageRole::User => content.map(|c| Self::text_message("user", c)),
            MessageRole::System => content.map(|c| Self::text_message("system", c)),
        }
    }

    fn build_openai_tools(tools: &[ToolSpec]) -> Option<Vec<OpenAiTool>> {
        if tools.is_empty() {
            return None;
        }
        Some(
            tools
                .iter()
                .map(|tool| OpenAiTool {
                    r#type: "function",
                    function: OpenAiToolDefinition {
                        name: tool.name.clone(),
                        description: tool.description.clone(),
                        parameters: tool.parameters.clone(),
                    },
                })
                .collect(),
        )
    }

    fn build_tools_request(request: &ToolChatRequest<'_>) -> ChatRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(sys) = request.system_prompt {
            messages.push(Self::text_message(
                "system",
                scrub_secret_patterns(sys).into_owned(),
            ));
        }
        messages.extend(request.messages.iter().filter_map(Self::map_provider_message));

        let tools = Self::build_openai_tools(request.tools);
        ChatRequest {
            model: request.model.to_string(),
            messages,
            temperature: request.temperature,
            tool_choice: tools.as_ref().map(|_| request.tool_choice.as_str()),
            tools,
        }
    }

    fn map_finish_reason(finish_reason: Option<&str>) -> StopReason {
        match finish_reason {
            Some("stop") => StopReason::EndTurn,
            Some("tool_calls") => StopReason::ToolUse,
            Some("length") => StopReason::MaxTokens,
            Some(_) | None => StopReason::Error,
        }
    }

    fn parse_tool_calls(tool_calls: Vec<OpenAiToolCall>) -> anyhow::Result<Vec<ContentBlock>> {
        tool_calls
            .into_iter()
            .map(|tool_call| {
                let input: Value = if tool_call.function.arguments.trim().is_empty() {
                    Value::Object(serde_json::Map::new())
                } else {
                    serde_json::from_str(&tool_call.function.arguments).with_context(|| {
                        format!(
                            "tool call arguments were not valid JSON for {}",
                            tool_call.function.name
                        )
                    })?
                };
                Ok(ContentBlock::ToolUse {
                    id: tool_call.id,
                    name: tool_call.function.name,
                    input,
                })
            })
            .collect()
    }

    async fn call_api(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse> {
        let mut builder = self.client.post(&self.cached_chat_url).json(request);
        match &self.cached_auth_header {
            Some(auth) => builder = builder.header("Authorization", auth),
            None if self.requires_key => anyhow::bail!(
                "{} API key not set. Set TWENTYQ_API_KEY or edit config.toml.",
                self.name
            ),
            None => {}
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("{} request failed", self.name))?;

        if !response.status().is_success() {
            return Err(api_error(&self.name, response).await);
        }

        response
            .json()
            .await
            .with_context(|| format!("{} response JSON decode failed", self.name))
    }

    fn parse_response(&self, chat_response: ChatResponse) -> anyhow::Result<ProviderResponse> {
        let ChatResponse {
            choices,
            usage,
            model,
        } = chat_response;
        let choice = choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No response from {}", self.name))?;

        let text = scrub_secret_patterns(&choice.message.content.unwrap_or_default()).into_owned();
        let mut content_blocks = Vec::new();
        if !text.is_empty() {
            content_blocks.push(ContentBlock::Text { text: text.clone() });
        }
        content_blocks.extend(Self::parse_tool_calls(
            choice.message.tool_calls.unwrap_or_default(),
        )?);

        let mut response = ProviderResponse::text_only(text);
        response.content_blocks = content_blocks;
        response.stop_reason = Some(Self::map_finish_reason(choice.finish_reason.as_deref()));
        if let Some(usage) = usage {
            response = response.with_usage(usage.prompt_tokens, usage.completion_tokens);
        }
        if let Some(model) = model {
            response = response.with_model(model);
        }
        Ok(response)
    }
}

#[async_trait]
impl Provider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat_with_system(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String> {
        let messages = [ProviderMessage::user(message)];
        let request = Self::build_tools_request(&ToolChatRequest {
            system_prompt,
            messages: &messages,
            tools: &[],
            tool_choice: ToolChoice::Auto,
            model,
            temperature,
        });
        let chat_response = self.call_api(&request).await?;
        let response = self.parse_response(chat_response)?;
        if response.text.is_empty() {
            anyhow::bail!("No response from {}", self.name);
        }
        Ok(response.text)
    }

    async fn chat_with_tools(
        &self,
        request: ToolChatRequest<'_>,
    ) -> anyhow::Result<ProviderResponse> {
        let chat_request = Self::build_tools_request(&request);
        let chat_response = self.call_api(&chat_request).await?;
        self.parse_response(chat_response)
    }

    fn supports_tool_calling(&self) -> bool {
        true
    }
}
