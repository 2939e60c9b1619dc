//! TUI actions produced by key bindings.
//!
//! Pure editing and scrolling actions change only the view; room actions are
//! forwarded to the session by the runner.

// Rust guideline compliant 2026-02

/// Actions the TUI runner understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    // === Application Control ===
    /// Request quit.
    Quit,
    /// Open a fresh connection to the relay.
    Reconnect,

    // === Lobby ===
    /// Move focus between the username and room code fields.
    NextField,
    /// Ask the relay for a new room.
    CreateRoom,

    // === Text Input ===
    /// Insert a character at the cursor.
    InputChar(char),
    /// Delete the character before the cursor.
    InputBackspace,
    /// Delete the character under the cursor.
    InputDelete,
    /// Move the cursor one character left.
    CursorLeft,
    /// Move the cursor one character right.
    CursorRight,
    /// Move the cursor to the start of the field.
    CursorHome,
    /// Move the cursor to the end of the field.
    CursorEnd,
    /// Enter: join from the room code field, send in the chat view.
    Submit,

    // === Scrolling ===
    /// Scroll the transcript up by N lines.
    ScrollUp(usize),
    /// Scroll the transcript down by N lines.
    ScrollDown(usize),
    /// Jump back to the newest messages.
    ScrollToBottom,
}

impl UiAction {
    /// Returns true for actions that edit the focused text field.
    pub fn is_edit(self) -> bool {
        matches!(
            self,
            Self::InputChar(_)
                | Self::InputBackspace
                | Self::InputDelete
                | Self::CursorLeft
                | Self::CursorRight
                | Self::CursorHome
                | Self::CursorEnd
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_actions() {
        assert!(UiAction::InputChar('a').is_edit());
        assert!(UiAction::CursorHome.is_edit());
        assert!(!UiAction::Submit.is_edit());
        assert!(!UiAction::CreateRoom.is_edit());
        assert!(!UiAction::ScrollUp(1).is_edit());
    }
}
