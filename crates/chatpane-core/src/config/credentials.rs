use std::fmt;

use tracing::{info, warn};

use crate::error::{CredentialError, ValidationError};
use crate::storage::KeyValueStore;
use crate::widget::session::Session;

/// Every accepted API key starts with this literal.
pub const CREDENTIAL_PREFIX: &str = "sk-ant-api";

/// Storage key of the single persisted API key.
pub const CREDENTIAL_STORE_KEY: &str = "anthropic_api_key";

/// An API key that passed the format check. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Trims `raw` and accepts it only if it carries [`CREDENTIAL_PREFIX`].
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.starts_with(CREDENTIAL_PREFIX) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(ValidationError)
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Gates the endpoint behind a validated, persisted API key.
///
/// Owns the durable slot; the in-memory copy and the capture-mode flag live
/// on the [`Session`] passed into each call.
pub struct CredentialManager {
    store: Box<dyn KeyValueStore>,
}

impl CredentialManager {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Validates and persists `raw`. On any error the stored key and capture
    /// mode are left as they were.
    pub fn capture(&mut self, session: &mut Session, raw: &str) -> Result<(), CredentialError> {
        let credential = Credential::parse(raw)?;
        self.store.set(CREDENTIAL_STORE_KEY, credential.expose())?;
        session.credential = Some(credential);
        session.state.capture_active = false;
        session.state.capture_draft.clear();
        session.state.validation_notice = None;
        info!("api key captured");
        Ok(())
    }

    /// Reads the persisted key into the session, entering capture mode when
    /// there is none. An unreadable store counts as empty.
    pub fn load(&self, session: &mut Session) -> Option<Credential> {
        let stored = match self.store.get(CREDENTIAL_STORE_KEY) {
            Ok(v) => v,
            Err(e) => {
                warn!("could not read stored api key: {e}");
                None
            }
        };
        let credential = stored
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(Credential);
        session.state.capture_active = credential.is_none();
        session.credential = credential.clone();
        info!(present = credential.is_some(), "api key loaded");
        credential
    }

    /// Clears the stored and in-memory key and re-enters capture mode.
    /// Safe to call with nothing stored.
    pub fn invalidate(&mut self, session: &mut Session) {
        if let Err(e) = self.store.delete(CREDENTIAL_STORE_KEY) {
            warn!("could not delete stored api key: {e}");
        }
        session.credential = None;
        session.state.capture_active = true;
        session.state.capture_draft.clear();
        info!("api key invalidated");
    }
}
