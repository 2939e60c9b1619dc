//! Event pump tying the session to its connection and notification channels.
//!
//! [`ChatApp`] owns the [`Session`] together with the receiving ends of the
//! two channels feeding it:
//!
//! ```text
//!   ConnectionManager thread ──ConnectionEvent──► signal_rx ─┐
//!                                                             ▼
//!   front end ──requests──► ChatApp::session_mut() ──► Session ──► ChannelNotifier
//!        ▲                                                            │
//!        └──────────── ChatApp::pump() returns Notifications ◄────────┘
//! ```
//!
//! Front ends call [`ChatApp::pump`] once per tick. It applies every pending
//! connection signal in arrival order, then hands back whatever notifications
//! the session raised since the last pump (including those raised by user
//! requests made in between).

// Rust guideline compliant 2026-02

pub mod headless;

use tokio::sync::mpsc;

use crate::config::Config;
use crate::connection::{ConnectionEvent, ConnectionHandle, ConnectionManager, Transport};
use crate::notifications::{ChannelNotifier, Notification};
use crate::session::Session;

/// Session type driven by the front ends.
pub type AppSession<T> = Session<T, ChannelNotifier>;

/// A session plus the channels that feed it.
#[derive(Debug)]
pub struct ChatApp<T: Transport = ConnectionManager> {
    session: AppSession<T>,
    signal_rx: mpsc::UnboundedReceiver<ConnectionEvent>,
    notification_rx: mpsc::UnboundedReceiver<Notification>,
    relay_url: String,
}

impl ChatApp<ConnectionManager> {
    /// Create an app talking to the relay named in `config`.
    pub fn new(config: &Config) -> Self {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        Self::with_transport(ConnectionManager::new(signal_tx), signal_rx, config)
    }
}

impl<T: Transport> ChatApp<T> {
    /// Create an app over any transport. `signal_rx` must receive the
    /// transport's connection events.
    pub fn with_transport(
        transport: T,
        signal_rx: mpsc::UnboundedReceiver<ConnectionEvent>,
        config: &Config,
    ) -> Self {
        let (notifier, notification_rx) = ChannelNotifier::new();
        let mut session = Session::new(transport, notifier, config.message_log_limit);
        if let Some(username) = &config.username {
            session = session.with_username(username.clone());
        }
        Self {
            session,
            signal_rx,
            notification_rx,
            relay_url: config.relay_url.clone(),
        }
    }

    /// Relay URL used by [`ChatApp::connect`].
    pub fn relay_url(&self) -> &str {
        &self.relay_url
    }

    /// Open (or reopen) the connection to the relay.
    pub fn connect(&mut self) -> ConnectionHandle {
        let url = self.relay_url.clone();
        self.session.connect(&url)
    }

    /// Apply pending connection signals and collect raised notifications.
    pub fn pump(&mut self) -> Vec<Notification> {
        while let Ok(event) = self.signal_rx.try_recv() {
            self.session.handle_signal(event);
        }

        let mut raised = Vec::new();
        while let Ok(notification) = self.notification_rx.try_recv() {
            raised.push(notification);
        }
        raised
    }

    /// Wait for the next connection signal and apply it.
    ///
    /// Returns false once every sender is gone.
    pub async fn next_signal(&mut self) -> bool {
        match self.signal_rx.recv().await {
            Some(event) => {
                self.session.handle_signal(event);
                true
            }
            None => false,
        }
    }

    /// Read access to the session.
    pub fn session(&self) -> &AppSession<T> {
        &self.session
    }

    /// Mutable access for user requests.
    pub fn session_mut(&mut self) -> &mut AppSession<T> {
        &mut self.session
    }
}
