use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use super::action::ActionKind;
use super::audit::{Node, NodeOrderAnomaly, NodeOrderValidator};
use super::collaborators::{ActionBackend, ActionProposer, HostContext, ProposalRequest};
use super::corrector::PendingAction;
use super::effects::{self, AppliedEffect};
use super::executor::ActionExecutor;
use super::history::chat_history;
use super::router::{DEFAULT_QUESTION_QUOTA, EndReason, Route, TurnRouter};
use super::state::{GameState, GameStateSnapshot, Message, Role};
use crate::config::GameConfig;
use crate::core::topics::ReferenceTopics;
use crate::error::{GameError, Result};
use crate::runtime::observability::traits::duration_ms;
use crate::runtime::observability::{Observer, ObserverEvent, ObserverMetric};

/// Transcript text stored for the `generate_topic` tool result.
pub const REDACTED_TOPIC: &str = "[topic recorded]";

const UPDATE_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub question_quota: u32,
    /// Node visits before the game is abandoned as runaway.
    pub max_transitions: u32,
    pub topic_sample_size: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            question_quota: DEFAULT_QUESTION_QUOTA,
            max_transitions: 200,
            topic_sample_size: 5,
        }
    }
}

impl From<&GameConfig> for SessionLimits {
    fn from(config: &GameConfig) -> Self {
        Self {
            question_quota: config.question_quota,
            max_transitions: config.max_transitions,
            topic_sample_size: config.topic_sample_size,
        }
    }
}

/// One node visit, streamed to whoever drives the game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnUpdate {
    pub game_id: String,
    pub step: u32,
    pub node: Node,
    pub message: Option<Message>,
    pub snapshot: GameStateSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSummary {
    pub game_id: String,
    pub end_reason: EndReason,
    pub snapshot: GameStateSnapshot,
    pub transitions: u32,
    pub anomalies: Vec<NodeOrderAnomaly>,
    pub transcript: Vec<Message>,
    pub duration_ms: u64,
}

impl GameSummary {
    pub fn guessed_correctly(&self) -> bool {
        self.end_reason == EndReason::GuessedCorrectly
    }
}

pub fn new_game_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Drives one game from the opener to a terminal route.
///
/// Turns run strictly in sequence on the calling task; the only await points
/// are the proposer and backend calls.
pub struct GameSession {
    game_id: String,
    state: GameState,
    proposer: Arc<dyn ActionProposer>,
    router: TurnRouter,
    executor: ActionExecutor,
    observer: Arc<dyn Observer>,
    limits: SessionLimits,
    updates: Option<mpsc::Sender<TurnUpdate>>,
    cancel: CancellationToken,
    transitions: u32,
}

impl GameSession {
    pub fn new(
        game_id: impl Into<String>,
        proposer: Arc<dyn ActionProposer>,
        backend: Arc<dyn ActionBackend>,
        topics: Arc<ReferenceTopics>,
        observer: Arc<dyn Observer>,
        limits: SessionLimits,
    ) -> Self {
        Self {
            game_id: game_id.into(),
            state: GameState::new(),
            proposer,
            router: TurnRouter::new(limits.question_quota, Arc::clone(&observer)),
            executor: ActionExecutor::new(
                backend,
                topics,
                limits.topic_sample_size,
                Arc::clone(&observer),
            ),
            observer,
            limits,
            updates: None,
            cancel: CancellationToken::new(),
            transitions: 0,
        }
    }

    pub fn with_updates(mut self, updates: mpsc::Sender<TurnUpdate>) -> Self {
        self.updates = Some(updates);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Start from a restored state instead of a fresh one.
    pub fn with_state(mut self, state: GameState) -> Self {
        self.state = state;
        self
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub async fn run(mut self) -> Result<GameSummary> {
        let started = Instant::now();
        info!(game_id = %self.game_id, "game started");
        self.observer.record_event(&ObserverEvent::GameStart {
            game_id: self.game_id.clone(),
        });

        let mut validator = NodeOrderValidator::new().with_observer(Arc::clone(&self.observer));
        let outcome = self.drive(&mut validator).await;
        let elapsed = duration_ms(started.elapsed());

        let result = match outcome {
            Ok(end_reason) => {
                let transitions = self.transitions;
                info!(
                    game_id = %self.game_id,
                    reason = %end_reason,
                    transitions,
                    topic = %self.state.topic(),
                    guess = %self.state.guess(),
                    "game finished"
                );
                self.observer.record_event(&ObserverEvent::GameEnd {
                    outcome: end_reason.to_string(),
                    transitions,
                    duration_ms: elapsed,
                });
                Ok(GameSummary {
                    game_id: self.game_id.clone(),
                    end_reason,
                    snapshot: self.state.snapshot(),
                    transitions,
                    anomalies: validator.into_anomalies(),
                    transcript: self.state.transcript().to_vec(),
                    duration_ms: elapsed,
                })
            }
            Err(e) => {
                warn!(game_id = %self.game_id, error = %e, "game aborted");
                self.observer.record_event(&ObserverEvent::Error {
                    component: "session".into(),
                    message: e.to_string(),
                });
                self.observer.record_event(&ObserverEvent::GameEnd {
                    outcome: "aborted".into(),
                    transitions: self.transitions,
                    duration_ms: elapsed,
                });
                Err(e)
            }
        };

        self.observer.flush();
        result
    }

    async fn drive(&mut self, validator: &mut NodeOrderValidator) -> Result<EndReason> {
        let mut node = Node::from(self.state.active_role());
        let mut pending_action: Option<PendingAction> = None;
        let mut pending_effect: Option<AppliedEffect> = None;

        loop {
            if self.cancel.is_cancelled() {
                return Err(GameError::Cancelled);
            }
            if self.transitions >= self.limits.max_transitions {
                return Err(GameError::Runaway {
                    limit: self.limits.max_transitions,
                });
            }
            self.transitions += 1;
            let step = self.transitions;
            validator.observe(node);

            let role = match node.role() {
                Some(role) => role,
                None => {
                    let action = pending_action.take().ok_or(GameError::NoPendingAction)?;
                    let executed = self.executor.execute(&action, &self.state).await?;
                    let content = if executed.kind == ActionKind::GenerateTopic {
                        REDACTED_TOPIC.to_string()
                    } else {
                        executed.output.clone()
                    };
                    let message = Message::tool(executed.kind, content);
                    self.state.push_message(message.clone());
                    let effect = effects::apply(&executed, &mut self.state)?;
                    self.emit(step, node, Some(message)).await;

                    node = Node::from(effect.control);
                    pending_effect = Some(effect);
                    continue;
                }
            };

            let message = match pending_effect.take() {
                Some(effect) => effect.message,
                None => self.propose(role).await?,
            };

            self.state.set_active_role(role);
            self.state.push_message(message.clone());
            if !message.content.trim().is_empty() {
                self.observer.record_event(&ObserverEvent::MessageEmitted {
                    author: message.author,
                    content: message.content.clone(),
                });
            }
            self.emit(step, node, Some(message)).await;

            match self.router.route(&mut self.state) {
                Route::Continue => node = Node::from(self.state.active_role()),
                Route::Execute(action) => {
                    pending_action = Some(action);
                    node = Node::CallTool;
                }
                Route::End(reason) => return Ok(reason),
            }
        }
    }

    async fn propose(&self, role: Role) -> Result<Message> {
        let request = ProposalRequest {
            role,
            history: chat_history(self.state.transcript(), role),
            host_context: (role == Role::Host).then(|| HostContext {
                topic: self.state.topic().to_string(),
                task_for_host: self.state.task_for_host(),
                guess: self.state.guess().to_string(),
            }),
        };

        let started = Instant::now();
        let proposal = self
            .proposer
            .propose(&request)
            .await
            .map_err(|source| GameError::Proposer { role, source })?;
        self.observer
            .record_metric(&ObserverMetric::request_latency(role, started.elapsed()));
        if let Some(tokens) = proposal.tokens_used {
            self.observer
                .record_metric(&ObserverMetric::TokensUsed { role, tokens });
        }

        debug!(
            role = %role,
            content = %proposal.content,
            actions = proposal.actions.len(),
            "proposal received"
        );
        Ok(Message::from_role(role, proposal.content).with_actions(proposal.actions))
    }

    async fn emit(&self, step: u32, node: Node, message: Option<Message>) {
        let Some(updates) = &self.updates else {
            return;
        };
        let update = TurnUpdate {
            game_id: self.game_id.clone(),
            step,
            node,
            message,
            snapshot: self.state.snapshot(),
        };
        if updates.send(update).await.is_err() {
            debug!(game_id = %self.game_id, "update receiver dropped");
        }
    }
}

/// Run `session` on its own task inside a `game` span, streaming every node
/// visit.
pub fn spawn_game(
    session: GameSession,
) -> (JoinHandle<Result<GameSummary>>, ReceiverStream<TurnUpdate>) {
    let (tx, rx) = mpsc::channel(UPDATE_BUFFER);
    let span = info_span!("game", game_id = %session.game_id());
    let handle = tokio::spawn(session.with_updates(tx).run().instrument(span));
    (handle, ReceiverStream::new(rx))
}
