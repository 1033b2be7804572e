use std::sync::Arc;

use tracing::info;

use super::conversation::{Completion, ConversationController, PendingRequest, Settlement};
use super::session::Session;
use crate::config::{CredentialManager, WidgetConfig};
use crate::error::{CredentialError, SubmitRejected};
use crate::providers::ChatEndpoint;
use crate::storage::KeyValueStore;

/// The widget controller: single owner of the session, driven by named user
/// intents.
pub struct ChatWidget {
    session: Session,
    credentials: CredentialManager,
    conversation: ConversationController,
}

impl ChatWidget {
    /// Builds the widget and reads the stored key to pick the initial mode.
    pub fn mount(
        config: &WidgetConfig,
        store: impl KeyValueStore + 'static,
        endpoint: Arc<dyn ChatEndpoint>,
    ) -> Self {
        let mut session = Session::new();
        let credentials = CredentialManager::new(store);
        credentials.load(&mut session);
        Self {
            session,
            credentials,
            conversation: ConversationController::new(endpoint, config),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable access for draft editing and scroll bookkeeping.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    // ── intents ───────────────────────────────────────────────────────────────

    /// Submits the capture draft as the API key. A rejection leaves the draft
    /// in place and sets a validation notice.
    pub fn submit_credential(&mut self) -> Result<(), CredentialError> {
        let raw = self.session.state.capture_draft.text().to_string();
        let result = self.credentials.capture(&mut self.session, &raw);
        if let Err(e) = &result {
            self.session.state.validation_notice = Some(e.to_string());
        }
        result
    }

    /// Dispatches the chat draft. The returned request must be sent and its
    /// completion passed back through [`settle`](Self::settle).
    pub fn submit_message(&mut self) -> Result<PendingRequest, SubmitRejected> {
        self.conversation.begin(&mut self.session)
    }

    pub fn settle(&mut self, completion: Completion) -> Settlement {
        self.conversation
            .settle(&mut self.session, &mut self.credentials, completion)
    }

    /// Submit, wait for the reply, settle.
    pub async fn send_message(&mut self) -> Result<Settlement, SubmitRejected> {
        self.conversation
            .submit(&mut self.session, &mut self.credentials)
            .await
    }

    /// Drops the key unconditionally and returns to capture mode. An
    /// in-flight request is left to settle normally.
    pub fn request_reset(&mut self) {
        info!("api key reset requested");
        self.credentials.invalidate(&mut self.session);
        self.session.state.validation_notice = None;
    }

    pub fn toggle_open(&mut self) {
        self.session.state.open = !self.session.state.open;
    }

    /// Closes the widget, as on a click outside it.
    pub fn dismiss(&mut self) {
        self.session.state.open = false;
    }

    /// Editing the key field hides a stale validation notice.
    pub fn edit_capture_draft(&mut self, edit: impl FnOnce(&mut super::session::Draft)) {
        edit(&mut self.session.state.capture_draft);
        self.session.state.validation_notice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CREDENTIAL_STORE_KEY;
    use crate::error::EndpointError;
    use crate::providers::scripted::ScriptedEndpoint;
    use crate::providers::Turn;
    use crate::storage::MemoryStore;
    use tokio::sync::Notify;

    fn mount(store: MemoryStore, ep: ScriptedEndpoint) -> ChatWidget {
        ChatWidget::mount(&WidgetConfig::default(), store, Arc::new(ep))
    }

    fn with_key(ep: ScriptedEndpoint) -> ChatWidget {
        mount(
            MemoryStore::with_entry(CREDENTIAL_STORE_KEY, "sk-ant-api-XYZ"),
            ep,
        )
    }

    fn stored(w: &ChatWidget) -> Option<String> {
        w.credentials().store().get(CREDENTIAL_STORE_KEY).unwrap()
    }

    fn type_key(w: &mut ChatWidget, raw: &str) {
        w.edit_capture_draft(|d| d.set(raw));
    }

    #[test]
    fn mount_without_key_starts_in_capture_mode() {
        let w = mount(MemoryStore::new(), ScriptedEndpoint::default());
        assert!(w.session().is_capture_active());
        assert!(!w.session().is_open());
        assert!(w.session().transcript().is_empty());
    }

    #[test]
    fn valid_key_is_persisted_and_capture_exits() {
        let mut w = mount(MemoryStore::new(), ScriptedEndpoint::default());
        type_key(&mut w, "sk-ant-api-XYZ");
        w.submit_credential().unwrap();

        assert!(!w.session().is_capture_active());
        assert_eq!(stored(&w).as_deref(), Some("sk-ant-api-XYZ"));
        assert_eq!(w.session().state.capture_draft.text(), "");
    }

    #[test]
    fn invalid_key_is_rejected_with_notice() {
        let ep = ScriptedEndpoint::default();
        let mut w = mount(MemoryStore::new(), ep.clone());
        type_key(&mut w, "bad-key");

        assert!(w.submit_credential().is_err());
        assert!(w.session().is_capture_active());
        assert_eq!(stored(&w), None);
        assert_eq!(w.session().state.capture_draft.text(), "bad-key");
        assert!(w
            .session()
            .state
            .validation_notice
            .as_deref()
            .unwrap()
            .contains("sk-ant-api"));
        assert_eq!(ep.calls(), 0);

        type_key(&mut w, "sk-ant-api-fixed");
        assert!(w.session().state.validation_notice.is_none());
    }

    #[test]
    fn capture_property_holds_for_assorted_inputs() {
        let cases = [
            ("sk-ant-api", true),
            ("  sk-ant-api03-abc  ", true),
            ("\tsk-ant-api-x\n", true),
            ("sk-ant-", false),
            ("sk-proj-abc", false),
            ("", false),
            ("   ", false),
        ];
        for (raw, accepted) in cases {
            let mut w = mount(MemoryStore::new(), ScriptedEndpoint::default());
            type_key(&mut w, raw);
            assert_eq!(w.submit_credential().is_ok(), accepted, "{raw:?}");
            assert_eq!(w.session().is_capture_active(), !accepted, "{raw:?}");
            assert_eq!(
                stored(&w),
                accepted.then(|| raw.trim().to_string()),
                "{raw:?}"
            );
        }
    }

    #[tokio::test]
    async fn hello_round_trip() {
        let gate = Arc::new(Notify::new());
        let ep = ScriptedEndpoint::gated(vec![Ok("Hi there".into())], gate.clone());
        let mut w = with_key(ep.clone());
        w.session_mut().state.draft.set("Hello");

        let pending = w.submit_message().unwrap();
        assert_eq!(w.session().transcript().turns(), &[Turn::user("Hello")]);
        assert!(w.session().is_in_flight());

        let task = tokio::spawn(pending.send());
        gate.notify_one();
        let completion = task.await.unwrap();
        assert_eq!(w.settle(completion), Settlement::Replied);

        assert_eq!(
            w.session().transcript().turns(),
            &[Turn::user("Hello"), Turn::assistant("Hi there")]
        );
        assert!(!w.session().is_in_flight());
        assert_eq!(ep.calls(), 1);
    }

    #[tokio::test]
    async fn structured_auth_error_clears_key() {
        let ep = ScriptedEndpoint::new(vec![Err(EndpointError::Api {
            status: 401,
            kind: "authentication_error".into(),
            message: "unauthorized".into(),
        })]);
        let mut w = with_key(ep);
        w.session_mut().state.draft.set("Hello");

        let settled = w.send_message().await.unwrap();

        assert_eq!(
            settled,
            Settlement::Failed {
                credential_invalidated: true
            }
        );
        let turns = w.session().transcript().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1], Turn::assistant(crate::config::config::DEFAULT_FAILURE_NOTICE));
        assert_eq!(stored(&w), None);
        assert!(w.session().credential().is_none());
        assert!(w.session().is_capture_active());
        assert!(!w.session().is_in_flight());
    }

    #[tokio::test]
    async fn transport_error_keeps_key() {
        let ep = ScriptedEndpoint::new(vec![Err(EndpointError::Transport(
            "error sending request".into(),
        ))]);
        let mut w = with_key(ep);
        w.session_mut().state.draft.set("Hello");

        let settled = w.send_message().await.unwrap();

        assert_eq!(
            settled,
            Settlement::Failed {
                credential_invalidated: false
            }
        );
        assert_eq!(w.session().transcript().len(), 2);
        assert_eq!(stored(&w).as_deref(), Some("sk-ant-api-XYZ"));
        assert!(!w.session().is_capture_active());
    }

    #[tokio::test]
    async fn transport_error_with_auth_marker_clears_key() {
        let ep = ScriptedEndpoint::new(vec![Err(EndpointError::Transport(
            "proxy said 401".into(),
        ))]);
        let mut w = with_key(ep);
        w.session_mut().state.draft.set("Hello");
        w.send_message().await.unwrap();
        assert_eq!(stored(&w), None);
        assert!(w.session().is_capture_active());
    }

    #[tokio::test]
    async fn each_cycle_adds_exactly_two_turns() {
        let ep = ScriptedEndpoint::new(vec![
            Ok("a".into()),
            Err(EndpointError::Decode("reply has no content".into())),
            Ok("c".into()),
        ]);
        let mut w = with_key(ep);
        for (i, msg) in ["one", "two", "three"].into_iter().enumerate() {
            w.session_mut().state.draft.set(msg);
            w.send_message().await.unwrap();
            assert_eq!(w.session().transcript().len(), 2 * (i + 1));
            assert!(!w.session().is_in_flight());
        }
    }

    #[tokio::test]
    async fn blank_submission_dispatches_nothing() {
        let ep = ScriptedEndpoint::default();
        let mut w = with_key(ep.clone());
        w.session_mut().state.draft.set("   ");
        assert_eq!(w.send_message().await, Err(SubmitRejected::EmptyDraft));
        assert_eq!(ep.calls(), 0);
        assert!(w.session().transcript().is_empty());
    }

    #[tokio::test]
    async fn single_flight_while_other_intents_proceed() {
        let gate = Arc::new(Notify::new());
        let ep = ScriptedEndpoint::gated(vec![Ok("done".into())], gate.clone());
        let mut w = with_key(ep.clone());

        w.session_mut().state.draft.set("first");
        let pending = w.submit_message().unwrap();
        let task = tokio::spawn(pending.send());

        w.toggle_open();
        w.session_mut().state.draft.set("second");
        assert!(matches!(w.submit_message(), Err(SubmitRejected::InFlight)));
        w.dismiss();
        assert!(!w.session().is_open());

        gate.notify_one();
        w.settle(task.await.unwrap());
        assert_eq!(ep.calls(), 1);
        assert_eq!(w.session().transcript().len(), 2);
        assert_eq!(w.session().state.draft.text(), "second");
    }

    #[tokio::test]
    async fn key_replaced_during_request_survives_its_auth_failure() {
        let gate = Arc::new(Notify::new());
        let ep = ScriptedEndpoint::gated(
            vec![Err(EndpointError::Status {
                status: 401,
                body: String::new(),
            })],
            gate.clone(),
        );
        let mut w = mount(
            MemoryStore::with_entry(CREDENTIAL_STORE_KEY, "sk-ant-api-OLD"),
            ep,
        );
        w.session_mut().state.draft.set("Hello");
        let task = tokio::spawn(w.submit_message().unwrap().send());

        w.request_reset();
        type_key(&mut w, "sk-ant-api-NEW");
        w.submit_credential().unwrap();

        gate.notify_one();
        let settled = w.settle(task.await.unwrap());

        assert_eq!(
            settled,
            Settlement::Failed {
                credential_invalidated: false
            }
        );
        assert_eq!(stored(&w).as_deref(), Some("sk-ant-api-NEW"));
        assert!(!w.session().is_capture_active());
        assert!(!w.session().is_in_flight());
        assert_eq!(w.session().transcript().len(), 2);
    }

    #[test]
    fn reset_returns_to_capture_mode_unconditionally() {
        let mut w = with_key(ScriptedEndpoint::default());
        w.request_reset();
        assert!(w.session().is_capture_active());
        assert_eq!(stored(&w), None);
        w.request_reset();
        assert!(w.session().is_capture_active());
    }

    #[test]
    fn toggle_and_dismiss_leave_transcript_alone() {
        let mut w = with_key(ScriptedEndpoint::default());
        w.toggle_open();
        assert!(w.session().is_open());
        w.toggle_open();
        assert!(!w.session().is_open());
        w.toggle_open();
        w.dismiss();
        w.dismiss();
        assert!(!w.session().is_open());
        assert!(!w.session().is_capture_active());
    }
}
