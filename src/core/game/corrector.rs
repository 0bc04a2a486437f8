use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use super::action::{ActionKind, ActionRequest};
use super::state::{GameState, HostTask, Role};
use crate::runtime::observability::{Observer, ObserverEvent};

/// One repair applied to a proposed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Correction {
    /// Only the first request of a turn is kept.
    DroppedExtraRequests { kept: String, dropped: Vec<String> },
    /// `check_guess` was requested while the host still owed an answer.
    Rerouted {
        from: ActionKind,
        to: ActionKind,
        question: String,
    },
    /// An argument disagreed with the authoritative state.
    OverwroteArgument {
        action: ActionKind,
        argument: String,
        supplied: Option<String>,
        authoritative: String,
    },
}

/// A request ready for the executor, with the repairs that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAction {
    pub request: ActionRequest,
    pub origin: Role,
    pub corrections: Vec<Correction>,
}

/// Reconciles proposed actions with the game state before anything runs.
///
/// Models are unreliable at filling structured calls, so the executor never
/// sees a topic, guess or question that did not come from [`GameState`].
pub struct ActionCorrector {
    observer: Arc<dyn Observer>,
}

impl ActionCorrector {
    pub fn new(observer: Arc<dyn Observer>) -> Self {
        Self { observer }
    }

    /// Returns `None` when the turn carried no request at all.
    pub fn correct(
        &self,
        mut requests: Vec<ActionRequest>,
        state: &GameState,
        origin: Role,
    ) -> Option<PendingAction> {
        if requests.is_empty() {
            return None;
        }

        let mut corrections = Vec::new();
        let dropped: Vec<ActionRequest> = requests.drain(1..).collect();
        let mut request = requests.pop()?;

        if !dropped.is_empty() {
            corrections.push(Correction::DroppedExtraRequests {
                kept: request.name.clone(),
                dropped: dropped.into_iter().map(|r| r.name).collect(),
            });
        }

        if origin == Role::Host {
            repair_host_request(&mut request, state, &mut corrections);
        }

        for correction in &corrections {
            warn!(role = %origin, correction = ?correction, "corrected action request");
            self.observer.record_event(&ObserverEvent::Correction {
                role: origin,
                correction: correction.clone(),
            });
        }

        Some(PendingAction {
            request,
            origin,
            corrections,
        })
    }
}

fn repair_host_request(
    request: &mut ActionRequest,
    state: &GameState,
    corrections: &mut Vec<Correction>,
) {
    let task = state.task_for_host();
    match (request.kind(), task) {
        (Some(ActionKind::CheckGuess), HostTask::AnswerQuestion) => {
            *request = ActionRequest::answer_question(
                request.id.clone(),
                state.topic(),
                state.most_recent_question(),
                task,
            );
            corrections.push(Correction::Rerouted {
                from: ActionKind::CheckGuess,
                to: ActionKind::AnswerQuestion,
                question: state.most_recent_question().to_string(),
            });
        }
        (Some(ActionKind::CheckGuess), HostTask::CheckGuess) => {
            let topic_drift = request.arg_str("topic") != Some(state.topic());
            let guess_drift = request.arg_str("guess") != Some(state.guess());
            if topic_drift || guess_drift {
                overwrite(request, ActionKind::CheckGuess, "topic", state.topic(), corrections);
                overwrite(request, ActionKind::CheckGuess, "guess", state.guess(), corrections);
            }
        }
        (Some(ActionKind::AnswerQuestion), _) => {
            overwrite(
                request,
                ActionKind::AnswerQuestion,
                "topic",
                state.topic(),
                corrections,
            );
        }
        _ => {}
    }
}

fn overwrite(
    request: &mut ActionRequest,
    action: ActionKind,
    argument: &str,
    authoritative: &str,
    corrections: &mut Vec<Correction>,
) {
    let supplied = request.arg_str(argument).map(str::to_string);
    if supplied.as_deref() == Some(authoritative) {
        return;
    }
    request.set_arg(argument, authoritative);
    corrections.push(Correction::OverwroteArgument {
        action,
        argument: argument.to_string(),
        supplied,
        authoritative: authoritative.to_string(),
    });
}
