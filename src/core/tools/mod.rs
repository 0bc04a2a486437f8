pub mod specs;
pub mod traits;

pub use specs::{host_tool_specs, player_tool_specs, tool_specs_for};
pub use traits::ToolSpec;
