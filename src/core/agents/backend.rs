use super::models::{RoleModel, RoleModels};
use crate::core::game::ActionBackend;
use crate::prompt::PromptBook;
use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;

/// Runs the model-backed actions: topic and answers on the host's model,
/// questions and guesses on the player's.
pub struct LlmActionBackend {
    models: RoleModels,
    prompts: Arc<PromptBook>,
}

impl LlmActionBackend {
    pub fn new(models: RoleModels, prompts: Arc<PromptBook>) -> Self {
        Self { models, prompts }
    }

    async fn complete(
        &self,
        model: &RoleModel,
        action: &str,
        prompt: String,
    ) -> anyhow::Result<String> {
        let reply = model
            .provider
            .chat(&prompt, &model.model, model.temperature)
            .await
            .with_context(|| format!("{action} call failed"))?;
        Ok(reply.trim().to_string())
    }
}

#[async_trait]
impl ActionBackend for LlmActionBackend {
    async fn generate_topic(&self, samples: &[String]) -> anyhow::Result<String> {
        let prompt = self.prompts.generate_topic(samples)?;
        self.complete(&self.models.host, "generate_topic", prompt).await
    }

    async fn answer_question(&self, topic: &str, question: &str) -> anyhow::Result<String> {
        let prompt = self.prompts.answer_question(topic, question)?;
        self.complete(&self.models.host, "answer_question", prompt).await
    }

    async fn generate_question(&self, transcript: &str) -> anyhow::Result<String> {
        let prompt = self.prompts.generate_question(transcript)?;
        self.complete(&self.models.player, "generate_question", prompt)
            .await
    }

    async fn make_guess(&self, transcript: &str) -> anyhow::Result<String> {
        let prompt = self.prompts.make_guess(transcript)?;
        self.complete(&self.models.player, "make_guess", prompt).await
    }
}
