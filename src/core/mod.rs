pub mod agents;
pub mod game;
pub mod providers;
pub mod tools;
pub mod topics;
