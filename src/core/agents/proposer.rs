use super::models::RoleModels;
use crate::core::game::{
    ActionProposer, ActionRequest, HistoryEntry, Proposal, ProposalRequest, Speaker,
};
use crate::core::providers::{ProviderMessage, ToolChatRequest, ToolChoice};
use crate::core::tools::tool_specs_for;
use crate::prompt::PromptBook;
use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Asks each role's model for its next move. Tool use is forced so every
/// turn yields at least one action request.
pub struct LlmProposer {
    models: RoleModels,
    prompts: Arc<PromptBook>,
}

impl LlmProposer {
    pub fn new(models: RoleModels, prompts: Arc<PromptBook>) -> Self {
        Self { models, prompts }
    }
}

pub(crate) fn to_provider_messages(history: &[HistoryEntry]) -> Vec<ProviderMessage> {
    history
        .iter()
        .map(|entry| match entry.speaker {
            Speaker::Ai => ProviderMessage::assistant(entry.content.clone()),
            Speaker::Human => ProviderMessage::user(entry.content.clone()),
        })
        .collect()
}

#[async_trait]
impl ActionProposer for LlmProposer {
    async fn propose(&self, request: &ProposalRequest) -> anyhow::Result<Proposal> {
        let role_model = self.models.for_role(request.role);
        let tools = tool_specs_for(request.role);
        let tool_names: Vec<&str> = tools.iter().map(|tool| tool.name.as_str()).collect();
        let system_prompt = self.prompts.role_system(
            request.role,
            &tool_names,
            request.host_context.as_ref(),
        )?;
        let messages = to_provider_messages(&request.history);

        let response = role_model
            .provider
            .chat_with_tools(ToolChatRequest {
                system_prompt: Some(&system_prompt),
                messages: &messages,
                tools: &tools,
                tool_choice: ToolChoice::Required,
                model: &role_model.model,
                temperature: role_model.temperature,
            })
            .await
            .with_context(|| format!("{} proposal failed", request.role))?;

        let actions: Vec<ActionRequest> = response
            .tool_calls()
            .into_iter()
            .map(|(id, name, input)| ActionRequest::new(id, name, input.clone()))
            .collect();

        debug!(
            role = %request.role,
            actions = actions.len(),
            tokens = ?response.total_tokens(),
            "proposal received"
        );

        Ok(Proposal {
            content: response.text.trim().to_string(),
            actions,
            tokens_used: response.total_tokens(),
        })
    }
}
