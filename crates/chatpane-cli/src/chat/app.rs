use chatpane_core::{ChatWidget, PendingRequest};
use tracing::debug;

use super::keys::Action;

/// What the event loop has to do after an action.
pub(super) enum Flow {
    Continue,
    Quit,
    Dispatch(PendingRequest),
}

// ── app state ────────────────────────────────────────────────────────────────

pub(super) struct App {
    pub(super) widget: ChatWidget,
    pub(super) scroll: u16,
    /// Bottom of the transcript in wrapped rows, as of the last render.
    pub(super) max_scroll: u16,
    pub(super) auto_scroll: bool,
    pub(super) spin_i: usize,
    pub(super) model: String,
}

impl App {
    pub(super) fn new(widget: ChatWidget, model: impl Into<String>) -> Self {
        Self {
            widget,
            scroll: 0,
            max_scroll: 0,
            auto_scroll: true,
            spin_i: 0,
            model: model.into(),
        }
    }

    /// Follows new transcript entries unless the user scrolled away.
    pub(super) fn sync_scroll(&mut self) {
        if self.widget.session_mut().take_scroll_request() {
            self.auto_scroll = true;
        }
        if self.auto_scroll {
            self.scroll = u16::MAX;
        }
    }

    pub(super) fn apply(&mut self, action: Action) -> Flow {
        match action {
            Action::Quit => return Flow::Quit,
            Action::ToggleOpen => self.widget.toggle_open(),
            Action::Ignore => {}
            // Everything else needs the panel visible.
            _ if !self.widget.session().is_open() => {}
            Action::Dismiss => self.widget.dismiss(),
            Action::ResetKey => self.widget.request_reset(),
            Action::ScrollUp(n) => {
                self.auto_scroll = false;
                self.scroll = self.scroll.saturating_sub(n);
            }
            Action::ScrollDown(n) => {
                self.scroll = self.scroll.saturating_add(n).min(self.max_scroll);
                if self.scroll == self.max_scroll {
                    self.auto_scroll = true;
                }
            }
            _ if self.widget.session().is_capture_active() => self.apply_capture(action),
            _ => return self.apply_chat(action),
        }
        Flow::Continue
    }

    fn apply_capture(&mut self, action: Action) {
        match action {
            Action::Submit => {
                if let Err(e) = self.widget.submit_credential() {
                    debug!("api key not accepted: {e}");
                }
            }
            Action::Insert(c) => self.widget.edit_capture_draft(|d| d.insert_char(c)),
            Action::Backspace => self.widget.edit_capture_draft(|d| d.backspace()),
            Action::Left => self.widget.edit_capture_draft(|d| d.cursor_left()),
            Action::Right => self.widget.edit_capture_draft(|d| d.cursor_right()),
            _ => {}
        }
    }

    fn apply_chat(&mut self, action: Action) -> Flow {
        if action == Action::Submit {
            return match self.widget.submit_message() {
                Ok(pending) => Flow::Dispatch(pending),
                Err(e) => {
                    debug!("submission ignored: {e}");
                    Flow::Continue
                }
            };
        }
        let draft = &mut self.widget.session_mut().state.draft;
        match action {
            Action::Newline => draft.insert_newline(),
            Action::Insert(c) => draft.insert_char(c),
            Action::Backspace => draft.backspace(),
            Action::Left => draft.cursor_left(),
            Action::Right => draft.cursor_right(),
            _ => {}
        }
        Flow::Continue
    }
}
