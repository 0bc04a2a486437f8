use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use super::corrector::{ActionCorrector, PendingAction};
use super::state::{GameState, fold_name};
use crate::runtime::observability::{Observer, ObserverEvent};

/// Default number of questions (asked and answered) that ends a game.
pub const DEFAULT_QUESTION_QUOTA: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    QuotaReached,
    GuessedCorrectly,
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaReached => write!(f, "quota_reached"),
            Self::GuessedCorrectly => write!(f, "guessed_correctly"),
        }
    }
}

/// Router verdict after a role turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// Hand the turn to the other role.
    Continue,
    /// Run the corrected action, then return to its origin.
    Execute(PendingAction),
    End(EndReason),
}

/// Fieldless label of a [`Route`] for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    Continue,
    CallTool,
    End,
}

impl Route {
    pub fn kind(&self) -> RouteKind {
        match self {
            Self::Continue => RouteKind::Continue,
            Self::Execute(_) => RouteKind::CallTool,
            Self::End(_) => RouteKind::End,
        }
    }
}

pub struct TurnRouter {
    question_quota: u32,
    corrector: ActionCorrector,
    observer: Arc<dyn Observer>,
}

impl TurnRouter {
    pub fn new(question_quota: u32, observer: Arc<dyn Observer>) -> Self {
        Self {
            question_quota,
            corrector: ActionCorrector::new(Arc::clone(&observer)),
            observer,
        }
    }

    /// Decide what follows the turn that just ended. Checks run in priority
    /// order: quota, pending action, correct guess, then hand-over.
    pub fn route(&self, state: &mut GameState) -> Route {
        let role = state.active_role();
        let (route, reason) = self.decide(state);

        if route == Route::Continue {
            state.flip_active_role();
        }

        info!(role = %role, route = ?route.kind(), reason = %reason, "route decision");
        self.observer.record_event(&ObserverEvent::RouteDecision {
            role,
            route: route.kind(),
            reason,
        });
        route
    }

    fn decide(&self, state: &GameState) -> (Route, String) {
        if state.questions_asked() >= self.question_quota
            && state.questions_answered() >= self.question_quota
        {
            return (
                Route::End(EndReason::QuotaReached),
                format!(
                    "{} questions asked and {} answered (quota {})",
                    state.questions_asked(),
                    state.questions_answered(),
                    self.question_quota
                ),
            );
        }

        if let Some(message) = state.last_message()
            && message.has_pending_actions()
        {
            let names: Vec<&str> = message.actions.iter().map(|a| a.name.as_str()).collect();
            let reason = format!("pending action request: {}", names.join(", "));
            if let Some(pending) =
                self.corrector
                    .correct(message.actions.clone(), state, state.active_role())
            {
                return (Route::Execute(pending), reason);
            }
        }

        if !state.guess().is_empty() && fold_name(state.guess()) == fold_name(state.topic()) {
            return (
                Route::End(EndReason::GuessedCorrectly),
                format!("guess '{}' matches the topic", state.guess()),
            );
        }

        (
            Route::Continue,
            format!("no action requested; handing turn to {}", state.active_role().other()),
        )
    }
}
