pub mod dispatch;
pub mod play;
pub mod status;

pub use dispatch::dispatch;
