use async_trait::async_trait;
use serde::Serialize;

use super::action::ActionRequest;
use super::history::HistoryEntry;
use super::state::{HostTask, Role};

/// What the host is told about the game besides the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostContext {
    pub topic: String,
    pub task_for_host: HostTask,
    pub guess: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposalRequest {
    pub role: Role,
    pub history: Vec<HistoryEntry>,
    /// Present only when `role` is [`Role::Host`].
    pub host_context: Option<HostContext>,
}

/// A role's move: free text, action requests, or both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Proposal {
    pub content: String,
    pub actions: Vec<ActionRequest>,
    pub tokens_used: Option<u64>,
}

impl Proposal {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn action(request: ActionRequest) -> Self {
        Self {
            actions: vec![request],
            ..Self::default()
        }
    }
}

/// Produces the next move for a role. Implementations call a model; tests
/// script the answers.
#[async_trait]
pub trait ActionProposer: Send + Sync {
    async fn propose(&self, request: &ProposalRequest) -> anyhow::Result<Proposal>;
}

/// The model-backed halves of the action vocabulary. `check_guess` is
/// decided locally and has no backend call.
#[async_trait]
pub trait ActionBackend: Send + Sync {
    /// Pick a secret topic, optionally inspired by `samples`.
    async fn generate_topic(&self, samples: &[String]) -> anyhow::Result<String>;

    /// Answer `question` about `topic` with YES or NO.
    async fn answer_question(&self, topic: &str, question: &str) -> anyhow::Result<String>;

    async fn generate_question(&self, transcript: &str) -> anyhow::Result<String>;

    async fn make_guess(&self, transcript: &str) -> anyhow::Result<String>;
}
