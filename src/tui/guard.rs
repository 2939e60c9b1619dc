//! Terminal state guard for RAII cleanup.

use std::io::stdout;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};

/// Puts the terminal in raw mode on the alternate screen and restores it on
/// drop, including during a panic unwind.
///
/// # Example
///
/// ```ignore
/// let _guard = TerminalGuard::enter()?;
/// // draw frames...
/// // terminal restored when `_guard` goes out of scope
/// ```
#[derive(Debug)]
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    /// Enable raw mode and switch to the alternate screen.
    pub fn enter() -> Result<Self> {
        enable_raw_mode()?;
        // Construct before the next fallible call so raw mode is undone.
        let guard = Self { _private: () };
        execute!(stdout(), EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Best-effort terminal restore, shared with the panic hook.
pub fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
}
