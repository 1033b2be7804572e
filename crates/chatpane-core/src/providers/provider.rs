use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Credential;
use crate::error::EndpointError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Body of one outbound call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Turn>,
}

impl ChatRequest {
    /// A request whose only context is `text` as a single user turn.
    pub fn single_turn(model: impl Into<String>, max_tokens: u32, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            messages: vec![Turn::user(text)],
        }
    }
}

/// Remote text-generation endpoint.
///
/// Returns the reply text on success. Implementations must not retry.
#[async_trait]
pub trait ChatEndpoint: Send + Sync {
    async fn complete(
        &self,
        credential: &Credential,
        request: &ChatRequest,
    ) -> Result<String, EndpointError>;
}
