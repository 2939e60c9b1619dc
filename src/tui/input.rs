//! Key bindings for the TUI.
//!
//! ```text
//! crossterm::KeyEvent ──► key_event_to_action(key, phase) ──► UiAction
//! ```
//!
//! Control keys work in every phase:
//! - `Ctrl+Q` / `Ctrl+C` - Quit
//! - `Ctrl+R` - Reconnect
//!
//! Lobby:
//! - `Ctrl+N` - Create room
//! - `Tab` / `Shift+Tab` - Switch field
//! - `Enter` - Join (on the room code field) or next field
//!
//! Chat:
//! - `Enter` - Send
//! - `PageUp` / `PageDown` - Scroll, `Ctrl+End` - newest

// Rust guideline compliant 2026-02

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::actions::UiAction;
use crate::session::Phase;

/// Lines moved per `PageUp` / `PageDown`.
pub const SCROLL_STEP: usize = 5;

/// Convert a key event to an action for the current phase.
///
/// Returns `None` for key releases and keys with no binding.
#[must_use]
pub fn key_event_to_action(key: &KeyEvent, phase: Phase) -> Option<UiAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('q' | 'c') if ctrl => return Some(UiAction::Quit),
        KeyCode::Char('r') if ctrl => return Some(UiAction::Reconnect),
        _ => {}
    }

    match phase {
        Phase::Disconnected | Phase::AwaitingRoom => None,
        Phase::Lobby => lobby_key(key, ctrl),
        Phase::InRoom => chat_key(key, ctrl),
    }
}

fn lobby_key(key: &KeyEvent, ctrl: bool) -> Option<UiAction> {
    match key.code {
        KeyCode::Char('n') if ctrl => Some(UiAction::CreateRoom),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => Some(UiAction::NextField),
        KeyCode::Enter => Some(UiAction::Submit),
        _ => edit_key(key, ctrl),
    }
}

fn chat_key(key: &KeyEvent, ctrl: bool) -> Option<UiAction> {
    match key.code {
        KeyCode::Enter => Some(UiAction::Submit),
        KeyCode::PageUp => Some(UiAction::ScrollUp(SCROLL_STEP)),
        KeyCode::PageDown => Some(UiAction::ScrollDown(SCROLL_STEP)),
        KeyCode::Up if ctrl => Some(UiAction::ScrollUp(1)),
        KeyCode::Down if ctrl => Some(UiAction::ScrollDown(1)),
        KeyCode::End if ctrl => Some(UiAction::ScrollToBottom),
        _ => edit_key(key, ctrl),
    }
}

/// Text editing keys shared by every input field.
fn edit_key(key: &KeyEvent, ctrl: bool) -> Option<UiAction> {
    match key.code {
        KeyCode::Char(c) if !ctrl => Some(UiAction::InputChar(c)),
        KeyCode::Backspace => Some(UiAction::InputBackspace),
        KeyCode::Delete => Some(UiAction::InputDelete),
        KeyCode::Left => Some(UiAction::CursorLeft),
        KeyCode::Right => Some(UiAction::CursorRight),
        KeyCode::Home => Some(UiAction::CursorHome),
        KeyCode::End => Some(UiAction::CursorEnd),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_quit_and_reconnect_in_every_phase() {
        for phase in [Phase::Disconnected, Phase::Lobby, Phase::AwaitingRoom, Phase::InRoom] {
            assert_eq!(key_event_to_action(&ctrl('q'), phase), Some(UiAction::Quit));
            assert_eq!(key_event_to_action(&ctrl('c'), phase), Some(UiAction::Quit));
            assert_eq!(key_event_to_action(&ctrl('r'), phase), Some(UiAction::Reconnect));
        }
    }

    #[test]
    fn test_typing_ignored_while_waiting() {
        assert_eq!(key_event_to_action(&key(KeyCode::Char('a')), Phase::AwaitingRoom), None);
        assert_eq!(key_event_to_action(&key(KeyCode::Enter), Phase::Disconnected), None);
    }

    #[test]
    fn test_lobby_bindings() {
        assert_eq!(key_event_to_action(&ctrl('n'), Phase::Lobby), Some(UiAction::CreateRoom));
        assert_eq!(key_event_to_action(&key(KeyCode::Tab), Phase::Lobby), Some(UiAction::NextField));
        assert_eq!(key_event_to_action(&key(KeyCode::Enter), Phase::Lobby), Some(UiAction::Submit));
        assert_eq!(
            key_event_to_action(&key(KeyCode::Char('x')), Phase::Lobby),
            Some(UiAction::InputChar('x'))
        );
    }

    #[test]
    fn test_create_only_in_lobby() {
        assert_eq!(key_event_to_action(&ctrl('n'), Phase::InRoom), None);
    }

    #[test]
    fn test_chat_bindings() {
        assert_eq!(key_event_to_action(&key(KeyCode::Enter), Phase::InRoom), Some(UiAction::Submit));
        assert_eq!(
            key_event_to_action(&key(KeyCode::PageUp), Phase::InRoom),
            Some(UiAction::ScrollUp(SCROLL_STEP))
        );
        assert_eq!(
            key_event_to_action(&KeyEvent::new(KeyCode::End, KeyModifiers::CONTROL), Phase::InRoom),
            Some(UiAction::ScrollToBottom)
        );
        assert_eq!(key_event_to_action(&key(KeyCode::End), Phase::InRoom), Some(UiAction::CursorEnd));
    }

    #[test]
    fn test_shifted_chars_are_input() {
        let shifted = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(key_event_to_action(&shifted, Phase::InRoom), Some(UiAction::InputChar('A')));
    }

    #[test]
    fn test_release_events_ignored() {
        let mut release = key(KeyCode::Char('a'));
        release.kind = KeyEventKind::Release;
        assert_eq!(key_event_to_action(&release, Phase::Lobby), None);
    }
}
