use crate::config::Credential;
use crate::providers::Turn;

// ── draft editing ─────────────────────────────────────────────────────────────

/// Editable text with a byte cursor that always sits on a char boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    text: String,
    cursor: usize,
}

impl Draft {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Returns the text and leaves the draft empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let i = self.text[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.text.drain(i..self.cursor);
            self.cursor = i;
        }
    }

    pub fn cursor_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.text[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn cursor_right(&mut self) {
        if self.cursor < self.text.len() {
            let n = self.text[self.cursor..]
                .chars()
                .next()
                .map(|c| c.len_utf8())
                .unwrap_or(0);
            self.cursor += n;
        }
    }
}

// ── session state ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub draft: Draft,
    /// Text typed into the API key field.
    pub capture_draft: Draft,
    pub in_flight: bool,
    pub capture_active: bool,
    pub open: bool,
    /// Shown under the key field after a rejected submission.
    pub validation_notice: Option<String>,
}

/// Ordered, append-only list of turns.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub(crate) fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }
}

/// Everything one widget instance knows. Owned by the widget and lent to the
/// credential manager and conversation controller for each transition.
#[derive(Debug, Default)]
pub struct Session {
    pub state: SessionState,
    pub(crate) transcript: Transcript,
    pub(crate) credential: Option<Credential>,
    scroll_requested: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.in_flight
    }

    pub fn is_capture_active(&self) -> bool {
        self.state.capture_active
    }

    pub fn is_open(&self) -> bool {
        self.state.open
    }

    pub(crate) fn append(&mut self, turn: Turn) {
        self.transcript.push(turn);
        self.scroll_requested = true;
    }

    /// True once after each transcript append; the renderer scrolls to the
    /// bottom when it sees it.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }
}
