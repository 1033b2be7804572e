use crate::error::EndpointError;

/// Settlement of one request, classified once at the endpoint boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(String),
    /// The key was refused; the caller must drop it.
    AuthFailure(EndpointError),
    OtherFailure(EndpointError),
}

impl Outcome {
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Outcome::AuthFailure(_))
    }
}

const AUTH_ERROR_TYPE: &str = "authentication_error";

pub fn classify(result: Result<String, EndpointError>) -> Outcome {
    match result {
        Ok(text) => Outcome::Success(text),
        Err(err) if is_auth_failure(&err) => Outcome::AuthFailure(err),
        Err(err) => Outcome::OtherFailure(err),
    }
}

fn is_auth_failure(err: &EndpointError) -> bool {
    match err {
        EndpointError::Api {
            status,
            kind,
            message,
        } => *status == 401 || kind == AUTH_ERROR_TYPE || mentions_auth(message),
        EndpointError::Status { status, .. } => *status == 401,
        // No structured body to inspect: fall back to the message text.
        EndpointError::Transport(message) | EndpointError::Decode(message) => {
            mentions_auth(message)
        }
    }
}

/// Best-effort marker match: a standalone `401` token or the word
/// "unauthorized" in any case.
fn mentions_auth(message: &str) -> bool {
    message.to_lowercase().contains("unauthorized")
        || message
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|token| token == "401")
}
