//! TUI - Terminal User Interface.
//!
//! # Architecture
//!
//! ```text
//! TuiRunner
//! ├── owns: ViewState (field buffers, focus, scroll), ToastQueue
//! ├── drives: ChatApp::pump() every tick
//! └── forwards: room actions to the Session
//! ```
//!
//! # Modules
//!
//! - [`actions`] - UI action type (`UiAction`)
//! - [`guard`] - Terminal state RAII guard for cleanup
//! - [`input`] - Key bindings
//! - [`render`] - Per-phase views and toasts
//! - [`runner`] - TuiRunner struct and event loop
//! - [`toast`] - Expiring notification queue
//! - [`view`] - View state types

// Rust guideline compliant 2026-02

pub mod actions;
pub mod guard;
pub mod input;
pub mod render;
pub mod runner;
pub mod toast;
pub mod view;

use std::sync::atomic::AtomicBool;

use anyhow::Result;
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::ChatApp;

#[doc(inline)]
pub use actions::UiAction;
#[doc(inline)]
pub use guard::{restore_terminal, TerminalGuard};
#[doc(inline)]
pub use input::key_event_to_action;
#[doc(inline)]
pub use render::{render, RenderContext};
#[doc(inline)]
pub use runner::TuiRunner;
#[doc(inline)]
pub use toast::ToastQueue;
#[doc(inline)]
pub use view::{LobbyField, ViewState};

/// Connect and run the interactive TUI until the user quits.
pub fn run_tui(app: &mut ChatApp, shutdown_flag: &AtomicBool) -> Result<()> {
    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(std::io::stdout()))?;
    terminal.clear()?;

    app.connect();
    let result = TuiRunner::new(app).run(&mut terminal, shutdown_flag);

    app.session_mut().disconnect();
    result
}
