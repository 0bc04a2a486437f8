use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use super::action::{ActionKind, ActionRequest};
use crate::error::{GameError, Result};

/// Opening line seeded into every transcript.
pub const GAME_OPENER: &str = "Let's play a game of 20 questions";

/// Case-folded form used whenever a guess is compared with the topic.
pub fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Host,
    Player,
}

impl Role {
    pub fn other(self) -> Self {
        match self {
            Self::Host => Self::Player,
            Self::Player => Self::Host,
        }
    }
}

/// The host's current obligation. Exactly one host action is valid per task.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HostTask {
    GenerateTopic,
    AnswerQuestion,
    CheckGuess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "action", rename_all = "snake_case")]
pub enum Author {
    System,
    Host,
    Player,
    Tool(ActionKind),
}

impl From<Role> for Author {
    fn from(role: Role) -> Self {
        match role {
            Role::Host => Self::Host,
            Role::Player => Self::Player,
        }
    }
}

impl Author {
    pub fn role(self) -> Option<Role> {
        match self {
            Self::Host => Some(Role::Host),
            Self::Player => Some(Role::Player),
            Self::System | Self::Tool(_) => None,
        }
    }
}

/// One transcript entry. Never edited once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub author: Author,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionRequest>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            author: Author::System,
            content: content.into(),
            actions: Vec::new(),
        }
    }

    pub fn from_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            author: role.into(),
            content: content.into(),
            actions: Vec::new(),
        }
    }

    pub fn tool(action: ActionKind, content: impl Into<String>) -> Self {
        Self {
            author: Author::Tool(action),
            content: content.into(),
            actions: Vec::new(),
        }
    }

    pub fn with_actions(mut self, actions: Vec<ActionRequest>) -> Self {
        self.actions = actions;
        self
    }

    pub fn has_pending_actions(&self) -> bool {
        !self.actions.is_empty()
    }

    pub fn is_tool(&self) -> bool {
        matches!(self.author, Author::Tool(_))
    }
}

/// Serializable view of everything in [`GameState`] except the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub active_role: Role,
    pub topic: String,
    pub guess: String,
    pub task_for_host: HostTask,
    pub most_recent_question: String,
    pub questions_asked: u32,
    pub questions_answered: u32,
}

impl Default for GameStateSnapshot {
    fn default() -> Self {
        Self {
            active_role: Role::Host,
            topic: String::new(),
            guess: String::new(),
            task_for_host: HostTask::GenerateTopic,
            most_recent_question: String::new(),
            questions_asked: 0,
            questions_answered: 0,
        }
    }
}

/// Shared record threaded through every turn of one game.
///
/// Fields are private so the counters and the topic can only move the way
/// the effect applier moves them; readers use the accessors.
#[derive(Debug, Clone)]
pub struct GameState {
    transcript: Vec<Message>,
    active_role: Role,
    topic: String,
    guess: String,
    task_for_host: HostTask,
    most_recent_question: String,
    questions_asked: u32,
    questions_answered: u32,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            transcript: vec![Message::system(GAME_OPENER)],
            active_role: Role::Host,
            topic: String::new(),
            guess: String::new(),
            task_for_host: HostTask::GenerateTopic,
            most_recent_question: String::new(),
            questions_asked: 0,
            questions_answered: 0,
        }
    }

    /// Rebuild a state from a snapshot, e.g. to resume or replay a game.
    ///
    /// The topic and the host task must agree: no topic means the host still
    /// has to generate one, and a generated topic means it never has to again.
    pub fn restore(snapshot: GameStateSnapshot, transcript: Vec<Message>) -> Result<Self> {
        let topic_missing = snapshot.topic.trim().is_empty();
        let generating = snapshot.task_for_host == HostTask::GenerateTopic;
        if topic_missing != generating {
            return Err(anyhow::anyhow!(
                "inconsistent snapshot: topic {} but task_for_host is {}",
                if topic_missing { "missing" } else { "set" },
                snapshot.task_for_host
            )
            .into());
        }

        Ok(Self {
            transcript,
            active_role: snapshot.active_role,
            topic: snapshot.topic,
            guess: snapshot.guess,
            task_for_host: snapshot.task_for_host,
            most_recent_question: snapshot.most_recent_question,
            questions_asked: snapshot.questions_asked,
            questions_answered: snapshot.questions_answered,
        })
    }

    pub fn snapshot(&self) -> GameStateSnapshot {
        GameStateSnapshot {
            active_role: self.active_role,
            topic: self.topic.clone(),
            guess: self.guess.clone(),
            task_for_host: self.task_for_host,
            most_recent_question: self.most_recent_question.clone(),
            questions_asked: self.questions_asked,
            questions_answered: self.questions_answered,
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.transcript.last()
    }

    pub fn active_role(&self) -> Role {
        self.active_role
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn guess(&self) -> &str {
        &self.guess
    }

    pub fn task_for_host(&self) -> HostTask {
        self.task_for_host
    }

    pub fn most_recent_question(&self) -> &str {
        &self.most_recent_question
    }

    pub fn questions_asked(&self) -> u32 {
        self.questions_asked
    }

    pub fn questions_answered(&self) -> u32 {
        self.questions_answered
    }

    pub(crate) fn push_message(&mut self, message: Message) {
        self.transcript.push(message);
    }

    pub(crate) fn set_active_role(&mut self, role: Role) {
        self.active_role = role;
    }

    pub(crate) fn flip_active_role(&mut self) -> Role {
        self.active_role = self.active_role.other();
        self.active_role
    }

    pub(crate) fn set_topic(&mut self, topic: String) -> Result<()> {
        if !self.topic.is_empty() {
            return Err(GameError::TopicAlreadySet);
        }
        self.topic = topic;
        Ok(())
    }

    pub(crate) fn set_guess(&mut self, guess: String) {
        self.guess = guess;
    }

    pub(crate) fn set_task_for_host(&mut self, task: HostTask) {
        self.task_for_host = task;
    }

    pub(crate) fn record_question(&mut self, question: String) {
        self.questions_asked = self.questions_asked.saturating_add(1);
        self.most_recent_question = question;
    }

    pub(crate) fn record_answer(&mut self) {
        self.questions_answered = self.questions_answered.saturating_add(1);
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
