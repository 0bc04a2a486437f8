use super::action::ActionKind;
use super::executor::ExecutedAction;
use super::state::{GameState, HostTask, Message, Role};
use crate::error::Result;

/// What the host says after choosing a topic. The topic itself never enters
/// the shared transcript.
pub const TOPIC_HANDSHAKE: &str = "I have a secret topic for you to guess. Let's start the game.";

/// Result of folding an executed action into the state. The loop hands
/// control to `control`, whose visit emits `message`.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedEffect {
    /// Message the originating role emits for this turn.
    pub message: Message,
    /// Role that holds control afterwards.
    pub control: Role,
}

/// Fold an executed action into `state`. The returned message is not
/// appended; the caller owns the transcript order.
pub fn apply(executed: &ExecutedAction, state: &mut GameState) -> Result<AppliedEffect> {
    let origin = executed.origin;
    let raw = executed.output.clone();

    let content = match executed.kind {
        ActionKind::GenerateTopic => {
            state.set_topic(raw)?;
            state.set_task_for_host(HostTask::AnswerQuestion);
            TOPIC_HANDSHAKE.to_string()
        }
        ActionKind::AnswerQuestion => {
            state.record_answer();
            raw
        }
        ActionKind::CheckGuess => raw,
        ActionKind::MakeGuess => {
            state.set_guess(raw.clone());
            state.set_task_for_host(HostTask::CheckGuess);
            raw
        }
        ActionKind::GenerateQuestion => {
            state.record_question(raw.clone());
            state.set_task_for_host(HostTask::AnswerQuestion);
            raw
        }
    };

    state.set_active_role(origin);
    Ok(AppliedEffect {
        message: Message::from_role(origin, content),
        control: origin,
    })
}
