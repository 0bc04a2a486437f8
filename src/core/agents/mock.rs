use crate::core::providers::{
    ContentBlock, MessageRole, Provider, ProviderResponse, StopReason, ToolChatRequest, ToolChoice,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// What a provider was asked, copied out of the borrowed request.
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub system_prompt: Option<String>,
    pub roles: Vec<MessageRole>,
    pub message: String,
    pub tool_names: Vec<String>,
    pub tool_choice: Option<ToolChoice>,
    pub model: String,
}

/// Replays queued responses in order and records every call.
#[derive(Default)]
pub(crate) struct MockProvider {
    responses: Mutex<VecDeque<ProviderResponse>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockProvider {
    pub fn with_responses(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn next_response(&self) -> anyhow::Result<ProviderResponse> {
        self.responses
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("mock provider exhausted"))
    }

    fn record(&self, call: RecordedCall) {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(call);
    }
}

pub(crate) fn tool_call_response(
    calls: &[(&str, &str, Value)],
    tokens: (u64, u64),
) -> ProviderResponse {
    let mut response = ProviderResponse::text_only(String::new()).with_usage(tokens.0, tokens.1);
    response.content_blocks = calls
        .iter()
        .map(|(id, name, input)| ContentBlock::ToolUse {
            id: (*id).to_string(),
            name: (*name).to_string(),
            input: input.clone(),
        })
        .collect();
    response.stop_reason = Some(StopReason::ToolUse);
    response
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat_with_system(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        _temperature: f64,
    ) -> anyhow::Result<String> {
        self.record(RecordedCall {
            system_prompt: system_prompt.map(str::to_string),
            roles: vec![MessageRole::User],
            message: message.to_string(),
            tool_names: Vec::new(),
            tool_choice: None,
            model: model.to_string(),
        });
        Ok(self.next_response()?.text)
    }

    async fn chat_with_tools(
        &self,
        request: ToolChatRequest<'_>,
    ) -> anyhow::Result<ProviderResponse> {
        self.record(RecordedCall {
            system_prompt: request.system_prompt.map(str::to_string),
            roles: request.messages.iter().map(|m| m.role).collect(),
            message: crate::core::providers::traits::messages_to_text(request.messages),
            tool_names: request.tools.iter().map(|t| t.name.clone()).collect(),
            tool_choice: Some(request.tool_choice),
            model: request.model.to_string(),
        });
        self.next_response()
    }

    fn supports_tool_calling(&self) -> bool {
        true
    }
}
