pub mod store;
pub mod types;
pub mod window;

pub use store::{SessionContext, SessionGuard, SessionStore};
pub use types::{Role, Turn, transcript};
pub use window::ConversationWindow;
