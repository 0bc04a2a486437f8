use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString, IntoStaticStr};

use super::state::{HostTask, Role};
use crate::error::{GameError, Result};

/// The five actions a role may request. Names match the tool names the
/// models are given.
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
pub enum ActionKind {
    GenerateTopic,
    AnswerQuestion,
    CheckGuess,
    GenerateQuestion,
    MakeGuess,
}

impl ActionKind {
    pub const HOST: [Self; 3] = [Self::GenerateTopic, Self::AnswerQuestion, Self::CheckGuess];
    pub const PLAYER: [Self; 2] = [Self::GenerateQuestion, Self::MakeGuess];

    /// Parse a model-supplied tool name.
    pub fn parse(name: &str) -> Result<Self> {
        name.parse()
            .map_err(|_| GameError::UnknownAction(name.to_string()))
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// The only role allowed to request this action.
    pub fn scope(self) -> Role {
        match self {
            Self::GenerateTopic | Self::AnswerQuestion | Self::CheckGuess => Role::Host,
            Self::GenerateQuestion | Self::MakeGuess => Role::Player,
        }
    }

    /// The host task this action is gated on, if any.
    pub fn required_task(self) -> Option<HostTask> {
        match self {
            Self::GenerateTopic => Some(HostTask::GenerateTopic),
            Self::AnswerQuestion => Some(HostTask::AnswerQuestion),
            Self::CheckGuess => Some(HostTask::CheckGuess),
            Self::GenerateQuestion | Self::MakeGuess => None,
        }
    }

    pub fn for_role(role: Role) -> &'static [Self] {
        match role {
            Role::Host => &Self::HOST,
            Role::Player => &Self::PLAYER,
        }
    }
}

/// An action request exactly as the model produced it. Arguments stay
/// untyped until [`Action::decode`] runs at the executor boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl ActionRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, args: Value) -> Self {
        let args = match args {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            id: id.into(),
            name: name.into(),
            args,
        }
    }

    /// Build a well-formed `answer_question` request from authoritative values.
    pub fn answer_question(
        id: impl Into<String>,
        topic: &str,
        question: &str,
        task_for_host: HostTask,
    ) -> Self {
        Self::new(
            id,
            ActionKind::AnswerQuestion.as_str(),
            serde_json::json!({
                "topic": topic,
                "question": question,
                "task_for_host": task_for_host,
            }),
        )
    }

    pub fn kind(&self) -> Option<ActionKind> {
        self.name.parse().ok()
    }

    pub fn arg_str(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(Value::as_str)
    }

    pub fn set_arg(&mut self, key: &str, value: impl Into<String>) {
        self.args.insert(key.to_string(), Value::String(value.into()));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenerateTopicArgs {
    pub task_for_host: HostTask,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnswerQuestionArgs {
    pub topic: String,
    pub question: String,
    pub task_for_host: HostTask,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckGuessArgs {
    pub topic: String,
    pub guess: String,
    pub task_for_host: HostTask,
}

/// Player actions receive the conversation so far. Models send it under
/// either name and not always as a string.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TranscriptArgs {
    #[serde(default, alias = "messages")]
    pub transcript: Option<Value>,
}

impl TranscriptArgs {
    pub fn text(&self) -> Option<String> {
        match self.transcript.as_ref()? {
            Value::Null => None,
            Value::String(text) if text.trim().is_empty() => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// A decoded action with typed arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    GenerateTopic(GenerateTopicArgs),
    AnswerQuestion(AnswerQuestionArgs),
    CheckGuess(CheckGuessArgs),
    GenerateQuestion(TranscriptArgs),
    MakeGuess(TranscriptArgs),
}

impl Action {
    pub fn decode(request: &ActionRequest) -> Result<Self> {
        let kind = ActionKind::parse(&request.name)?;
        Ok(match kind {
            ActionKind::GenerateTopic => Self::GenerateTopic(decode_args(kind, request)?),
            ActionKind::AnswerQuestion => Self::AnswerQuestion(decode_args(kind, request)?),
            ActionKind::CheckGuess => Self::CheckGuess(decode_args(kind, request)?),
            ActionKind::GenerateQuestion => Self::GenerateQuestion(decode_args(kind, request)?),
            ActionKind::MakeGuess => Self::MakeGuess(decode_args(kind, request)?),
        })
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Self::GenerateTopic(_) => ActionKind::GenerateTopic,
            Self::AnswerQuestion(_) => ActionKind::AnswerQuestion,
            Self::CheckGuess(_) => ActionKind::CheckGuess,
            Self::GenerateQuestion(_) => ActionKind::GenerateQuestion,
            Self::MakeGuess(_) => ActionKind::MakeGuess,
        }
    }

    /// The `task_for_host` argument carried by host actions.
    pub fn claimed_task(&self) -> Option<HostTask> {
        match self {
            Self::GenerateTopic(args) => Some(args.task_for_host),
            Self::AnswerQuestion(args) => Some(args.task_for_host),
            Self::CheckGuess(args) => Some(args.task_for_host),
            Self::GenerateQuestion(_) | Self::MakeGuess(_) => None,
        }
    }
}

fn decode_args<T: DeserializeOwned>(kind: ActionKind, request: &ActionRequest) -> Result<T> {
    serde_json::from_value(Value::Object(request.args.clone())).map_err(|error| {
        GameError::InvalidArguments {
            action: kind,
            reason: error.to_string(),
        }
    })
}
