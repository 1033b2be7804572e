use std::sync::Arc;

use tracing::{debug, info, warn};

use super::session::Session;
use crate::config::{Credential, CredentialManager, WidgetConfig};
use crate::error::SubmitRejected;
use crate::providers::{classify, ChatEndpoint, ChatRequest, Outcome, Turn};

/// What a settlement did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Replied,
    Failed { credential_invalidated: bool },
    /// No request was in flight; nothing changed.
    Stale,
}

/// A settled request together with the key it was sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub credential: Credential,
    pub outcome: Outcome,
}

/// A dispatched request waiting on the endpoint. Owns everything it needs so
/// it can run on another task while the session keeps handling input.
pub struct PendingRequest {
    endpoint: Arc<dyn ChatEndpoint>,
    credential: Credential,
    request: ChatRequest,
}

impl PendingRequest {
    pub fn request(&self) -> &ChatRequest {
        &self.request
    }

    /// Performs the call and classifies the result. Never fails: every error
    /// becomes an [`Outcome`].
    pub async fn send(self) -> Completion {
        debug!(model = %self.request.model, "dispatching request");
        let outcome = classify(
            self.endpoint
                .complete(&self.credential, &self.request)
                .await,
        );
        Completion {
            credential: self.credential,
            outcome,
        }
    }
}

/// Owns the message-send protocol: draft → user turn → one request → one
/// assistant turn.
pub struct ConversationController {
    endpoint: Arc<dyn ChatEndpoint>,
    model: String,
    max_tokens: u32,
    failure_notice: String,
}

impl ConversationController {
    pub fn new(endpoint: Arc<dyn ChatEndpoint>, config: &WidgetConfig) -> Self {
        Self {
            endpoint,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            failure_notice: config.failure_notice.clone(),
        }
    }

    pub fn failure_notice(&self) -> &str {
        &self.failure_notice
    }

    /// `Idle -> Sending`. Takes the draft, appends it as a user turn and marks
    /// the session in flight. A rejected submission leaves the draft alone.
    pub fn begin(&self, session: &mut Session) -> Result<PendingRequest, SubmitRejected> {
        if session.state.in_flight {
            return Err(SubmitRejected::InFlight);
        }
        if session.state.draft.is_blank() {
            return Err(SubmitRejected::EmptyDraft);
        }
        let credential = match (&session.credential, session.state.capture_active) {
            (Some(c), false) => c.clone(),
            _ => return Err(SubmitRejected::CaptureActive),
        };

        let text = session.state.draft.take().trim().to_string();
        session.state.in_flight = true;
        session.append(Turn::user(text.clone()));

        // Only the newest user turn is sent; earlier turns stay local.
        Ok(PendingRequest {
            endpoint: Arc::clone(&self.endpoint),
            credential,
            request: ChatRequest::single_turn(&self.model, self.max_tokens, text),
        })
    }

    /// `Sending -> Settled -> Idle`. Appends exactly one assistant turn and
    /// clears the in-flight flag. An auth failure drops the key only if it is
    /// still the one the request used; a key entered meanwhile is kept.
    pub fn settle(
        &self,
        session: &mut Session,
        credentials: &mut CredentialManager,
        completion: Completion,
    ) -> Settlement {
        let Completion {
            credential: used,
            outcome,
        } = completion;
        if !session.state.in_flight {
            warn!("settlement arrived with no request in flight; ignored");
            return Settlement::Stale;
        }
        session.state.in_flight = false;

        match outcome {
            Outcome::Success(text) => {
                session.append(Turn::assistant(text));
                Settlement::Replied
            }
            Outcome::AuthFailure(err) => {
                warn!("request rejected as unauthorized: {err}");
                session.append(Turn::assistant(self.failure_notice.clone()));
                let replaced = session.credential.as_ref().is_some_and(|c| *c != used);
                if replaced {
                    info!("rejected key was already replaced; keeping the new one");
                } else {
                    credentials.invalidate(session);
                    info!("returning to api key capture");
                }
                Settlement::Failed {
                    credential_invalidated: !replaced,
                }
            }
            Outcome::OtherFailure(err) => {
                warn!("request failed: {err}");
                session.append(Turn::assistant(self.failure_notice.clone()));
                Settlement::Failed {
                    credential_invalidated: false,
                }
            }
        }
    }

    /// Runs one full cycle in place. The session is borrowed for the whole
    /// call; front-ends that keep handling input should use [`begin`] and
    /// [`settle`] around their own task instead.
    ///
    /// [`begin`]: Self::begin
    /// [`settle`]: Self::settle
    pub async fn submit(
        &self,
        session: &mut Session,
        credentials: &mut CredentialManager,
    ) -> Result<Settlement, SubmitRejected> {
        let pending = self.begin(session)?;
        let completion = pending.send().await;
        Ok(self.settle(session, credentials, completion))
    }
}
