//! The turn-coordination engine: shared state, the five-action vocabulary,
//! request correction, routing, execution and effect application, driven by
//! [`session::GameSession`].

pub mod action;
pub mod audit;
pub mod collaborators;
pub mod corrector;
pub mod effects;
pub mod executor;
pub mod history;
pub mod router;
pub mod session;
pub mod state;

pub use action::{Action, ActionKind, ActionRequest};
pub use audit::{EXPECTED_NODE_CYCLE, Node, NodeOrderAnomaly, NodeOrderValidator};
pub use collaborators::{ActionBackend, ActionProposer, HostContext, Proposal, ProposalRequest};
pub use corrector::{ActionCorrector, Correction, PendingAction};
pub use effects::{AppliedEffect, TOPIC_HANDSHAKE};
pub use executor::{ActionExecutor, ExecutedAction};
pub use history::{HistoryEntry, Speaker};
pub use router::{EndReason, Route, TurnRouter};
pub use session::{
    GameSession, GameSummary, SessionLimits, TurnUpdate, new_game_id, spawn_game,
};
pub use state::{Author, GAME_OPENER, GameState, GameStateSnapshot, HostTask, Message, Role};
