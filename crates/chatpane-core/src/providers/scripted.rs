use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::provider::{ChatEndpoint, ChatRequest};
use crate::config::Credential;
use crate::error::EndpointError;

/// Test endpoint answering from a queue and recording every request.
#[derive(Clone, Default)]
pub(crate) struct ScriptedEndpoint {
    replies: Arc<Mutex<VecDeque<Result<String, EndpointError>>>>,
    pub(crate) seen: Arc<Mutex<Vec<(String, ChatRequest)>>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedEndpoint {
    pub(crate) fn new(replies: Vec<Result<String, EndpointError>>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            ..Default::default()
        }
    }

    /// Holds every reply until `gate` is notified.
    pub(crate) fn gated(replies: Vec<Result<String, EndpointError>>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(replies)
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatEndpoint for ScriptedEndpoint {
    async fn complete(
        &self,
        credential: &Credential,
        request: &ChatRequest,
    ) -> Result<String, EndpointError> {
        self.seen
            .lock()
            .unwrap()
            .push((credential.expose().to_string(), request.clone()));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(EndpointError::Transport("no scripted reply".into())))
    }
}
