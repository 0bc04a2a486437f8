use thiserror::Error;

use crate::core::game::action::ActionKind;
use crate::core::game::state::{HostTask, Role};

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for a single game.
///
/// Every variant here is fatal to the game instance that raised it. The
/// recoverable cases (duplicate requests, stale arguments) never surface as
/// errors: the corrector repairs them in place and reports them through the
/// observer instead.
#[derive(Debug, Error)]
pub enum GameError {
    // ── Executor preconditions ──────────────────────────────────────────
    #[error("precondition violated for {action}: task_for_host is {actual}, expected {expected}")]
    Precondition {
        action: ActionKind,
        expected: HostTask,
        actual: HostTask,
    },

    #[error("topic already set; generate_topic may only run once")]
    TopicAlreadySet,

    // ── Schema drift between proposer and executor ──────────────────────
    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("invalid arguments for {action}: {reason}")]
    InvalidArguments { action: ActionKind, reason: String },

    #[error("{role} may not request {action}")]
    ScopeViolation { role: Role, action: ActionKind },

    #[error("no pending action to execute")]
    NoPendingAction,

    // ── Loop control ────────────────────────────────────────────────────
    #[error("transition ceiling of {limit} reached without termination")]
    Runaway { limit: u32 },

    #[error("game cancelled at turn boundary")]
    Cancelled,

    // ── Collaborators ───────────────────────────────────────────────────
    #[error("{role} proposer failed: {source}")]
    Proposer {
        role: Role,
        #[source]
        source: anyhow::Error,
    },

    #[error("{action} backend failed: {source}")]
    Backend {
        action: ActionKind,
        #[source]
        source: anyhow::Error,
    },

    #[error("topics: {0}")]
    Topics(#[from] TopicError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Reference topic errors ─────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TopicError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no reference topics found in {0}")]
    Empty(String),

    #[error("requested {requested} topics but only {available} are loaded")]
    Exhausted { requested: usize, available: usize },
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl GameError {
    /// Whether the error came from outside the state machine (model calls,
    /// topic loading, config) rather than from a broken invariant.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            Self::Proposer { .. } | Self::Backend { .. } | Self::Topics(_) | Self::Config(_)
        )
    }
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, GameError>;
