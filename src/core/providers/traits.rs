use super::response::{ContentBlock, MessageRole, ProviderMessage, ProviderResponse};
use crate::core::tools::traits::ToolSpec;
use async_trait::async_trait;

/// Concatenate `ProviderMessages` into a single text string for providers
/// that don't support structured messages.
///
/// Only `ContentBlock::Text` is kept. Messages are prefixed with role labels
/// ("User:", "Assistant:", "System:") and joined with newlines.
pub fn messages_to_text(messages: &[ProviderMessage]) -> String {
    messages
        .iter()
        .filter_map(|msg| {
            let role_label = match msg.role {
                MessageRole::User => "User:",
                MessageRole::Assistant => "Assistant:",
                MessageRole::System => "System:",
            };

            let text_parts: Vec<&str> = msg
                .content
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::Text { text } => Some(text.as_str()),
                    ContentBlock::ToolUse { .. } => None,
                })
                .collect();

            if text_parts.is_empty() {
                None
            } else {
                Some(format!("{} {}", role_label, text_parts.join(" ")))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether the model may answer in plain text or must call a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolChoice {
    #[default]
    Auto,
    Required,
}

impl ToolChoice {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Required => "required",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolChatRequest<'a> {
    pub system_prompt: Option<&'a str>,
    pub messages: &'a [ProviderMessage],
    pub tools: &'a [ToolSpec],
    pub tool_choice: ToolChoice,
    pub model: &'a str,
    pub temperature: f64,
}

#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    async fn chat(&self, message: &str, model: &str, temperature: f64) -> anyhow::Result<String> {
        self.chat_with_system(None, message, model, temperature)
            .await
    }

    async fn chat_with_system(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String>;

    /// Chat with structured tool support.
    /// Default: concatenates messages into text, ignores tools, falls back to text-only chat.
    async fn chat_with_tools(
        &self,
        request: ToolChatRequest<'_>,
    ) -> anyhow::Result<ProviderResponse> {
        let text = messages_to_text(request.messages);
        let reply = self
            .chat_with_system(
                request.system_prompt,
                &text,
                request.model,
                request.temperature,
            )
            .await?;
        Ok(ProviderResponse::text_only(reply))
    }

    /// Whether this provider supports native structured tool calling.
    fn supports_tool_calling(&self) -> bool {
        false
    }
}
