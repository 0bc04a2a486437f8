use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use super::action::{Action, ActionKind};
use super::collaborators::ActionBackend;
use super::corrector::PendingAction;
use super::history::{chat_history, render_history};
use super::state::{GameState, Role, fold_name};
use crate::core::topics::ReferenceTopics;
use crate::error::{GameError, Result};
use crate::runtime::observability::traits::duration_ms;
use crate::runtime::observability::{Observer, ObserverEvent};

pub const CORRECT_GUESS_REPLY: &str = "Congratulations, you are right!";
pub const WRONG_GUESS_REPLY: &str = "Sorry, you are wrong. Please ask another question.";

/// Raw result of one executed action, before any state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedAction {
    pub kind: ActionKind,
    pub request_id: String,
    pub output: String,
    /// The role whose request this was; it regains control afterwards.
    pub origin: Role,
}

pub struct ActionExecutor {
    backend: Arc<dyn ActionBackend>,
    topics: Arc<ReferenceTopics>,
    topic_sample_size: usize,
    observer: Arc<dyn Observer>,
}

impl ActionExecutor {
    pub fn new(
        backend: Arc<dyn ActionBackend>,
        topics: Arc<ReferenceTopics>,
        topic_sample_size: usize,
        observer: Arc<dyn Observer>,
    ) -> Self {
        Self {
            backend,
            topics,
            topic_sample_size,
            observer,
        }
    }

    /// Run one corrected request. Reads `state` but never writes it.
    pub async fn execute(
        &self,
        pending: &PendingAction,
        state: &GameState,
    ) -> Result<ExecutedAction> {
        let started = Instant::now();
        let kind = pending.request.kind();
        let result = self.run(pending, state).await;

        if let Some(action) = kind {
            self.observer.record_event(&ObserverEvent::ActionExecuted {
                action,
                origin: pending.origin,
                duration_ms: duration_ms(started.elapsed()),
                success: result.is_ok(),
            });
        }
        result
    }

    async fn run(&self, pending: &PendingAction, state: &GameState) -> Result<ExecutedAction> {
        let action = Action::decode(&pending.request)?;
        let kind = action.kind();

        if kind.scope() != pending.origin {
            return Err(GameError::ScopeViolation {
                role: pending.origin,
                action: kind,
            });
        }
        check_task(&action, state)?;

        debug!(action = %kind, origin = %pending.origin, "executing action");
        let output = match action {
            Action::GenerateTopic(_) => {
                let samples = self.topics.sample(self.topic_sample_size)?;
                let topic = self
                    .backend
                    .generate_topic(&samples)
                    .await
                    .map_err(|source| backend_error(kind, source))?;
                let topic = topic.trim().trim_matches('"').trim().to_string();
                if topic.is_empty() {
                    return Err(backend_error(
                        kind,
                        anyhow::anyhow!("backend returned an empty topic"),
                    ));
                }
                topic
            }
            Action::AnswerQuestion(args) => {
                let raw = self
                    .backend
                    .answer_question(&args.topic, &args.question)
                    .await
                    .map_err(|source| backend_error(kind, source))?;
                normalize_answer(&raw)
            }
            Action::CheckGuess(args) => judge_guess(&args.topic, &args.guess).to_string(),
            Action::GenerateQuestion(args) => {
                let transcript = args
                    .text()
                    .unwrap_or_else(|| rendered_transcript(state, pending.origin));
                self.backend
                    .generate_question(&transcript)
                    .await
                    .map_err(|source| backend_error(kind, source))?
                    .trim()
                    .to_string()
            }
            Action::MakeGuess(args) => {
                let transcript = args
                    .text()
                    .unwrap_or_else(|| rendered_transcript(state, pending.origin));
                self.backend
                    .make_guess(&transcript)
                    .await
                    .map_err(|source| backend_error(kind, source))?
                    .trim()
                    .to_string()
            }
        };

        Ok(ExecutedAction {
            kind,
            request_id: pending.request.id.clone(),
            output,
            origin: pending.origin,
        })
    }
}

/// Host actions are valid only for the matching task, and both the task the
/// model claims and the task in state must agree.
fn check_task(action: &Action, state: &GameState) -> Result<()> {
    let kind = action.kind();
    let Some(required) = kind.required_task() else {
        return Ok(());
    };

    for actual in [action.claimed_task(), Some(state.task_for_host())]
        .into_iter()
        .flatten()
    {
        if actual != required {
            return Err(GameError::Precondition {
                action: kind,
                expected: required,
                actual,
            });
        }
    }

    if kind == ActionKind::GenerateTopic && !state.topic().is_empty() {
        return Err(GameError::TopicAlreadySet);
    }
    Ok(())
}

fn rendered_transcript(state: &GameState, role: Role) -> String {
    render_history(&chat_history(state.transcript(), role))
}

fn backend_error(action: ActionKind, source: anyhow::Error) -> GameError {
    GameError::Backend { action, source }
}

/// A guess is right when it equals the topic or names it, ignoring case.
pub fn judge_guess(topic: &str, guess: &str) -> &'static str {
    let topic = fold_name(topic);
    let guess = fold_name(guess);
    if !topic.is_empty() && (guess == topic || guess.contains(&topic)) {
        CORRECT_GUESS_REPLY
    } else {
        WRONG_GUESS_REPLY
    }
}

/// Reduce a model answer to `YES` or `NO` when it leads with either word.
pub fn normalize_answer(raw: &str) -> String {
    let trimmed = raw.trim();
    let first_word: String = trimmed
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphabetic)
        .collect::<String>()
        .to_ascii_uppercase();

    match first_word.as_str() {
        "YES" | "NO" => first_word,
        _ => {
            warn!(answer = %trimmed, "answer is not a plain YES/NO");
            trimmed.to_string()
        }
    }
}
