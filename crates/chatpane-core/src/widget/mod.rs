pub mod conversation;
pub mod session;
#[allow(clippy::module_inception)]
pub mod widget;

pub use conversation::{Completion, ConversationController, PendingRequest, Settlement};
pub use session::{Draft, Session, SessionState, Transcript};
pub use widget::ChatWidget;
