//! TUI-local view state: text fields, focus, transcript scroll.
//!
//! The session owns the values that matter (username, room id). The view
//! keeps editable copies in [`tui_input::Input`] buffers, pushes edits into
//! the session, and resyncs when the session changes a value on its own
//! (relay assigns or clears the room id).

// Rust guideline compliant 2026-02

use tui_input::{Input, InputRequest};

use super::actions::UiAction;
use crate::connection::Transport;
use crate::notifications::Notifier;
use crate::session::{Phase, Session, SessionUpdate};

/// Lobby field with keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LobbyField {
    /// Username input.
    #[default]
    Username,
    /// Room code input.
    RoomCode,
}

impl LobbyField {
    /// The other field.
    pub fn toggled(self) -> Self {
        match self {
            Self::Username => Self::RoomCode,
            Self::RoomCode => Self::Username,
        }
    }
}

/// Editable field buffers and scroll position.
#[derive(Debug, Default)]
pub struct ViewState {
    /// Focused lobby field.
    pub focus: LobbyField,
    /// Username buffer.
    pub username: Input,
    /// Room code buffer.
    pub room_code: Input,
    /// Chat compose buffer.
    pub compose: Input,
    /// Transcript lines scrolled up from the bottom; 0 follows new messages.
    pub scroll: usize,
}

impl ViewState {
    /// Build the view from the session's current values.
    pub fn from_session<T: Transport, N: Notifier>(session: &Session<T, N>) -> Self {
        Self {
            username: Input::new(session.username().unwrap_or_default().to_string()),
            room_code: Input::new(session.room_id().unwrap_or_default().to_string()),
            ..Self::default()
        }
    }

    /// The buffer edits go to in `phase`, if any.
    pub fn focused_input(&mut self, phase: Phase) -> Option<&mut Input> {
        match phase {
            Phase::Lobby => Some(match self.focus {
                LobbyField::Username => &mut self.username,
                LobbyField::RoomCode => &mut self.room_code,
            }),
            Phase::InRoom => Some(&mut self.compose),
            Phase::Disconnected | Phase::AwaitingRoom => None,
        }
    }

    /// Apply an editing action to the focused buffer. Returns true if the
    /// buffer's text changed.
    pub fn apply_edit(&mut self, phase: Phase, action: UiAction) -> bool {
        let Some(request) = input_request(action) else {
            return false;
        };
        let Some(input) = self.focused_input(phase) else {
            return false;
        };
        input
            .handle(request)
            .is_some_and(|change| change.value)
    }

    /// Resync buffers after a session change.
    pub fn apply_update<T: Transport, N: Notifier>(
        &mut self,
        update: &SessionUpdate,
        session: &Session<T, N>,
    ) {
        match update {
            SessionUpdate::RoomChanged => {
                let room = session.room_id().unwrap_or_default();
                if self.room_code.value() != room {
                    self.room_code = Input::new(room.to_string());
                }
            }
            SessionUpdate::PhaseChanged(Phase::InRoom) => {
                self.compose.reset();
                self.scroll = 0;
            }
            SessionUpdate::PhaseChanged(Phase::Lobby) => {
                self.focus = if session.username().is_some() {
                    LobbyField::RoomCode
                } else {
                    LobbyField::Username
                };
            }
            SessionUpdate::LogCleared => self.scroll = 0,
            // Keep a scrolled-up transcript still; only chat lines shift it.
            SessionUpdate::LogAppended(seq) if self.scroll > 0 => {
                let is_chat = session
                    .message_log()
                    .get(*seq)
                    .is_some_and(|entry| entry.event.is_chat_message());
                if is_chat {
                    self.scroll += 1;
                }
            }
            _ => {}
        }
    }

    /// Scroll the transcript, clamped to `max`.
    pub fn scroll_by(&mut self, up: bool, lines: usize, max: usize) {
        self.scroll = if up {
            self.scroll.saturating_add(lines).min(max)
        } else {
            self.scroll.saturating_sub(lines)
        };
    }
}

fn input_request(action: UiAction) -> Option<InputRequest> {
    Some(match action {
        UiAction::InputChar(c) => InputRequest::InsertChar(c),
        UiAction::InputBackspace => InputRequest::DeletePrevChar,
        UiAction::InputDelete => InputRequest::DeleteNextChar,
        UiAction::CursorLeft => InputRequest::GoToPrevChar,
        UiAction::CursorRight => InputRequest::GoToNextChar,
        UiAction::CursorHome => InputRequest::GoToStart,
        UiAction::CursorEnd => InputRequest::GoToEnd,
        _ => return None,
    })
}
