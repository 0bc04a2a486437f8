//! Model-backed implementations of the game's collaborator traits.

pub mod backend;
#[cfg(test)]
pub(crate) mod mock;
pub mod models;
pub mod proposer;

pub use backend::LlmActionBackend;
pub use models::{RoleModel, RoleModels};
pub use proposer::LlmProposer;
