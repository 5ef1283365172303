pub mod chat;
pub mod dispatch;
pub mod status;
pub mod wiring;

pub use dispatch::dispatch;
