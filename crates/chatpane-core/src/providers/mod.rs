pub mod anthropic;
pub mod outcome;
pub mod provider;
#[cfg(test)]
pub(crate) mod scripted;

pub use anthropic::AnthropicEndpoint;
pub use outcome::{classify, Outcome};
pub use provider::{ChatEndpoint, ChatRequest, Role, Turn};
