//! Roomchat - terminal client for transient room-based chat.
//!
//! One session holds one connection to a chat relay. Users create a room or
//! join one by code, then exchange messages that the relay fans out to every
//! member. Nothing is persisted; closing the connection ends the session.
//!
//! # Architecture
//!
//! ```text
//! user action ──► Session (validate) ──► protocol::encode ──► ConnectionManager ──► relay
//! relay ──► ConnectionManager ──► ConnectionEvent ──► ChatApp::pump ──► Session
//!                                                        │
//!                               notifications + updates ◄┘──► TUI / headless
//! ```
//!
//! # Modules
//!
//! - [`protocol`] - Wire codec for commands and events
//! - [`connection`] - Connection manager and `Transport` trait
//! - [`session`] - Session state machine and message log
//! - [`notifications`] - Notification dispatcher contract
//! - [`app`] - Event pump and headless front end
//! - [`tui`] - Terminal front end
//! - [`config`] - Configuration loading/saving

// Library modules
pub mod app;
pub mod connection;
pub mod notifications;
pub mod protocol;
pub mod session;
pub mod tui;
pub mod ws;

pub mod config;
pub mod constants;

// Re-export commonly used types
pub use app::ChatApp;
pub use config::Config;
pub use connection::{
    ConnectionEvent, ConnectionHandle, ConnectionManager, ConnectionSignal, ReadyState, SendError,
    Transport,
};
pub use notifications::{ChannelNotifier, Notification, Notifier, Severity};
pub use protocol::{Command, DecodeError, Event};
pub use session::{Outcome, Phase, Session, SessionUpdate};
