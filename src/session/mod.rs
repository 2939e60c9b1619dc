//! Client session state machine.
//!
//! A [`Session`] is the single mutable root of one chat client. It owns the
//! [`Transport`] (and so the one live connection), the user's inputs, the
//! current room and the running [`MessageLog`]. Every state change happens in
//! exactly one of three entry points, each run to completion:
//!
//! - a user request ([`Session::create_room`], [`Session::join_room`],
//!   [`Session::send_message`], input setters)
//! - a connection signal ([`Session::handle_signal`])
//! - an explicit lifecycle call ([`Session::connect`], [`Session::disconnect`])
//!
//! # Phases
//!
//! ```text
//!                 open                create (valid)
//! Disconnected ─────────► Lobby ─────────────────────► AwaitingRoom
//!      ▲                   ▲  │                              │
//!      │ close             │  │ join (valid): pending        │
//!      │ (any phase)       │  ▼                              │
//!      │          roomnoexist │◄─────────────────────────────┤
//!      │                   │  │ joinedRoom (any phase)       │
//!      │                   └─ InRoom ◄───────────────────────┘
//! ```
//!
//! Front ends observe changes through [`Session::subscribe`] and read the
//! current state through the accessors; they never mutate fields directly.

// Rust guideline compliant 2026-02

mod events;
mod message_log;


pub use message_log::{LogEntry, MessageLog};

use tokio::sync::broadcast;

use crate::connection::{ConnectionEvent, ConnectionHandle, ConnectionSignal, ReadyState, Transport};
use crate::constants::{ERROR_TOAST, SESSION_UPDATE_CAPACITY};
use crate::notifications::{Notification, Notifier};
use crate::protocol::{self, Command};

/// Coarse lifecycle state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No open connection.
    Disconnected,
    /// Connected, not in a room.
    Lobby,
    /// Room creation requested, waiting for the relay.
    AwaitingRoom,
    /// Member of a room.
    InRoom,
}

impl Phase {
    /// Short label for status lines and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Lobby => "lobby",
            Self::AwaitingRoom => "awaiting room",
            Self::InRoom => "in room",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a user request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The command went out on the connection.
    Sent,
    /// A local input was updated; nothing was sent.
    Applied,
    /// Validation failed; an error report was sent and the user notified.
    Rejected,
    /// The request does not apply right now and nothing happened.
    Ignored,
}

/// Change notification for front ends that re-render on state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    /// Phase moved to the contained value.
    PhaseChanged(Phase),
    /// Username input changed.
    UsernameChanged,
    /// Room id changed (user input or relay assignment).
    RoomChanged,
    /// Pending join started or settled.
    JoinPendingChanged(bool),
    /// An entry with the contained sequence number was appended.
    LogAppended(u64),
    /// The log was cleared for a new room attempt.
    LogCleared,
}

/// The client session: phase, inputs, room and log, plus the connection.
#[derive(Debug)]
pub struct Session<T: Transport, N: Notifier> {
    transport: T,
    notifier: N,
    handle: Option<ConnectionHandle>,
    phase: Phase,
    username: String,
    room_id: String,
    join_pending: bool,
    log: MessageLog,
    updates: broadcast::Sender<SessionUpdate>,
}

impl<T: Transport, N: Notifier> Session<T, N> {
    /// Create a disconnected session. `log_limit` caps the message log.
    pub fn new(transport: T, notifier: N, log_limit: Option<usize>) -> Self {
        let (updates, _) = broadcast::channel(SESSION_UPDATE_CAPACITY);
        Self {
            transport,
            notifier,
            handle: None,
            phase: Phase::Disconnected,
            username: String::new(),
            room_id: String::new(),
            join_pending: false,
            log: MessageLog::new(log_limit),
            updates,
        }
    }

    /// Seed the username before the first connection (e.g. from config).
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Subscribe to state-change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.updates.subscribe()
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Username input, `None` while blank.
    pub fn username(&self) -> Option<&str> {
        non_blank(&self.username)
    }

    /// Current room id, `None` while blank.
    pub fn room_id(&self) -> Option<&str> {
        non_blank(&self.room_id)
    }

    /// True between a sent `join` and the relay's answer.
    pub fn is_join_pending(&self) -> bool {
        self.join_pending
    }

    /// Events received since the last create/join attempt.
    pub fn message_log(&self) -> &MessageLog {
        &self.log
    }

    /// Handle of the connection this session listens to.
    pub fn connection(&self) -> Option<ConnectionHandle> {
        self.handle
    }

    /// The transport the session sends through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Open a new connection to `address`, replacing any current one.
    ///
    /// Room, pending join and log are reset; the username input is kept.
    pub fn connect(&mut self, address: &str) -> ConnectionHandle {
        if let Some(previous) = self.handle.take() {
            self.transport.close(previous);
        }
        let handle = self.transport.open(address);
        self.handle = Some(handle);
        log::info!("[session] Connecting {handle} to {address}");

        self.set_room_id_internal(String::new());
        self.set_join_pending(false);
        if !self.log.is_empty() {
            self.log.clear();
            self.publish(SessionUpdate::LogCleared);
        }
        self.set_phase(Phase::Disconnected);
        handle
    }

    /// Close the current connection and stop listening to it.
    pub fn disconnect(&mut self) {
        if let Some(handle) = self.handle.take() {
            log::info!("[session] Disconnecting {handle}");
            self.transport.close(handle);
        }
        self.set_join_pending(false);
        self.set_phase(Phase::Disconnected);
    }

    /// Apply one connection signal. Signals from replaced connections are
    /// ignored.
    pub fn handle_signal(&mut self, event: ConnectionEvent) {
        if self.handle != Some(event.handle) {
            log::debug!(
                "[session] Ignoring {:?} from stale {}",
                event.signal,
                event.handle
            );
            return;
        }

        match event.signal {
            ConnectionSignal::Open => {
                if self.phase == Phase::Disconnected {
                    self.set_phase(Phase::Lobby);
                }
            }
            ConnectionSignal::Frame(frame) => match protocol::decode(&frame) {
                Ok(decoded) => self.apply_event(decoded),
                Err(e) => log::warn!("[session] Dropping frame: {e}"),
            },
            ConnectionSignal::Close { code, reason } => {
                log::info!("[session] {} closed ({code}) {reason}", event.handle);
                self.handle = None;
                self.set_join_pending(false);
                self.set_phase(Phase::Disconnected);
            }
            ConnectionSignal::TransportError(detail) => {
                log::warn!("[session] Transport error on {}: {detail}", event.handle);
            }
        }
    }

    /// Update the username input. Only editable in the lobby or while a room
    /// is being created.
    pub fn set_username(&mut self, username: impl Into<String>) -> Outcome {
        if !matches!(self.phase, Phase::Lobby | Phase::AwaitingRoom) {
            return Outcome::Ignored;
        }
        let username = username.into();
        if username != self.username {
            self.username = username;
            self.publish(SessionUpdate::UsernameChanged);
        }
        Outcome::Applied
    }

    /// Update the room id input. Only editable in the lobby.
    pub fn set_room_id(&mut self, room_id: impl Into<String>) -> Outcome {
        if self.phase != Phase::Lobby {
            return Outcome::Ignored;
        }
        self.set_room_id_internal(room_id.into());
        Outcome::Applied
    }

    /// Ask the relay for a new room.
    pub fn create_room(&mut self) -> Outcome {
        if !self.in_open_lobby() {
            log::debug!("[session] create ignored in {}", self.phase);
            return Outcome::Ignored;
        }
        let Some(username) = self.username().map(str::to_string) else {
            return self.reject(Command::NoUsernameError, "Missing Username Value!");
        };

        if !self.send(&Command::Create { username }) {
            return Outcome::Ignored;
        }
        self.clear_log();
        self.set_phase(Phase::AwaitingRoom);
        Outcome::Sent
    }

    /// Ask the relay to join the room id currently entered.
    pub fn join_room(&mut self) -> Outcome {
        if !self.in_open_lobby() {
            log::debug!("[session] join ignored in {}", self.phase);
            return Outcome::Ignored;
        }
        if self.username().is_none() {
            return self.reject(Command::NoUsernameError, "Missing Username Value!");
        }
        if self.room_id().is_none() {
            return self.reject(Command::NoRoomIdError, "Missing Room ID Value");
        }

        let command = Command::Join {
            room_id: self.room_id.clone(),
            username: self.username.clone(),
        };
        if !self.send(&command) {
            return Outcome::Ignored;
        }
        self.clear_log();
        self.set_join_pending(true);
        Outcome::Sent
    }

    /// Send a chat message to the current room.
    ///
    /// Blank text, a missing room id, or a connection that is not open all
    /// make this a silent no-op. Nothing is appended locally; the message
    /// shows up when the relay echoes it back.
    pub fn send_message(&mut self, text: &str) -> Outcome {
        if text.trim().is_empty() || self.room_id().is_none() || !self.is_open() {
            return Outcome::Ignored;
        }
        let command = Command::Message {
            room_id: self.room_id.clone(),
            username: self.username.clone(),
            message: text.to_string(),
        };
        if self.send(&command) {
            Outcome::Sent
        } else {
            Outcome::Ignored
        }
    }

    fn is_open(&self) -> bool {
        self.handle
            .is_some_and(|handle| self.transport.ready_state(handle) == ReadyState::Open)
    }

    fn in_open_lobby(&self) -> bool {
        self.phase == Phase::Lobby && self.is_open()
    }

    /// Encode and send `command` on the current connection.
    fn send(&mut self, command: &Command) -> bool {
        let Some(handle) = self.handle else {
            return false;
        };
        match self.transport.send(handle, protocol::encode(command)) {
            Ok(()) => {
                log::debug!("[session] Sent {} on {handle}", command.kind());
                true
            }
            Err(e) => {
                log::warn!("[session] Could not send {}: {e}", command.kind());
                false
            }
        }
    }

    /// Report a local validation failure to the relay and the user.
    fn reject(&mut self, report: Command, text: &str) -> Outcome {
        log::debug!("[session] Rejected request: {text}");
        self.send(&report);
        self.notifier.notify(Notification::error(text, ERROR_TOAST));
        Outcome::Rejected
    }

    fn clear_log(&mut self) {
        self.log.clear();
        self.publish(SessionUpdate::LogCleared);
    }

    fn append(&mut self, event: protocol::Event) {
        let seq = self.log.push(event);
        self.publish(SessionUpdate::LogAppended(seq));
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            log::info!("[session] {} -> {}", self.phase, phase);
            self.phase = phase;
            self.publish(SessionUpdate::PhaseChanged(phase));
        }
    }

    fn set_room_id_internal(&mut self, room_id: String) {
        if room_id != self.room_id {
            self.room_id = room_id;
            self.publish(SessionUpdate::RoomChanged);
        }
    }

    fn set_join_pending(&mut self, pending: bool) {
        if self.join_pending != pending {
            self.join_pending = pending;
            self.publish(SessionUpdate::JoinPendingChanged(pending));
        }
    }

    fn publish(&self, update: SessionUpdate) {
        // No subscribers is fine; accessors always hold the latest state.
        let _ = self.updates.send(update);
    }
}

fn non_blank(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
