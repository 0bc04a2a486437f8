mod builder;
mod engine;

pub use builder::PromptBook;
pub use engine::TeraEngine;
