//! Connection manager: owns the single relay connection of a session.
//!
//! # Threading Model
//!
//! Each [`ConnectionManager::open`] spawns one OS thread that owns a
//! current-thread tokio runtime. The thread performs the WebSocket handshake,
//! then selects over incoming relay frames and outgoing frames queued by
//! [`ConnectionManager::send`]. It never touches session state; everything it
//! observes is reported as a [`ConnectionEvent`] on the unbounded channel the
//! manager was created with, in the order the transport produced it.
//!
//! ```text
//!   Session ──send(handle, frame)──► ConnectionManager ──outgoing_tx──► ws thread ──► relay
//!      ▲                                                                    │
//!      └──────────────── ConnectionEvent { handle, signal } ◄───────────────┘
//! ```
//!
//! # Handles
//!
//! Every `open` mints a fresh [`ConnectionHandle`] and closes the previous
//! connection. Signals carry the handle of the connection that produced them
//! so a late `Close` from a replaced connection can be told apart.

// Rust guideline compliant 2026-02

mod worker;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

/// Identifies one connection opened by a [`ConnectionManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionHandle(u64);

impl ConnectionHandle {
    /// Wrap a raw handle id. Transports other than [`ConnectionManager`]
    /// (test doubles, alternative transports) mint their own ids.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw id, for logging.
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Lifecycle state of a connection, mirroring the WebSocket `readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReadyState {
    /// Handshake in progress; sends are refused.
    Connecting = 0,
    /// Open signal has fired; sends are accepted.
    Open = 1,
    /// Close requested, waiting for the transport to finish.
    Closing = 2,
    /// Closed, failed, or replaced.
    Closed = 3,
}

impl ReadyState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connecting,
            1 => Self::Open,
            2 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// Ready state shared between the manager and its connection thread.
#[derive(Debug, Clone)]
pub(crate) struct SharedReadyState(Arc<AtomicU8>);

impl SharedReadyState {
    fn new() -> Self {
        Self(Arc::new(AtomicU8::new(ReadyState::Connecting as u8)))
    }

    pub(crate) fn get(&self) -> ReadyState {
        ReadyState::from_u8(self.0.load(Ordering::SeqCst))
    }

    pub(crate) fn set(&self, state: ReadyState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }

    /// Move from `from` to `to`; returns false if the state was not `from`.
    pub(crate) fn transition(&self, from: ReadyState, to: ReadyState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

/// Lifecycle signal or inbound data from a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionSignal {
    /// Handshake completed; the connection accepts sends.
    Open,
    /// One text frame from the relay.
    Frame(String),
    /// Connection is gone. Always the last signal for a handle.
    Close {
        /// WebSocket close code (1000 = normal, 1006 = abnormal).
        code: u16,
        /// Human-readable close reason.
        reason: String,
    },
    /// Transport failure. Informational: a `Close` follows when the
    /// connection cannot continue.
    TransportError(String),
}

/// A [`ConnectionSignal`] tagged with the connection that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEvent {
    /// Connection that produced the signal.
    pub handle: ConnectionHandle,
    /// The signal itself.
    pub signal: ConnectionSignal,
}

/// Errors returned by [`Transport::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The handle is not the current connection, the open signal has not
    /// fired yet, or the connection has closed.
    NotOpen,
}

impl std::fmt::Display for SendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOpen => write!(f, "Connection is not open"),
        }
    }
}

impl std::error::Error for SendError {}

/// Capability surface the session uses to talk to the relay.
///
/// [`ConnectionManager`] is the production implementation. Implementors must
/// deliver lifecycle signals out of band (the manager uses a channel); these
/// methods only initiate work and never block on the network.
pub trait Transport {
    /// Start connecting to `address`, closing any connection opened before.
    fn open(&mut self, address: &str) -> ConnectionHandle;

    /// Queue one text frame on `handle`.
    fn send(&mut self, handle: ConnectionHandle, frame: String) -> Result<(), SendError>;

    /// Close `handle`. Idempotent; unknown or closed handles are ignored.
    fn close(&mut self, handle: ConnectionHandle);

    /// Current ready state of `handle`. Unknown handles report `Closed`.
    fn ready_state(&self, handle: ConnectionHandle) -> ReadyState;
}

/// Outgoing request from the manager to a connection thread.
#[derive(Debug)]
pub(crate) enum Outgoing {
    /// Send a UTF-8 text frame.
    Text(String),
    /// Close the connection gracefully.
    Close,
}

/// The currently open (or opening) connection.
#[derive(Debug)]
struct ActiveConnection {
    handle: ConnectionHandle,
    state: SharedReadyState,
    outgoing_tx: mpsc::UnboundedSender<Outgoing>,
}

/// Owns at most one relay connection at a time.
#[derive(Debug)]
pub struct ConnectionManager {
    signal_tx: mpsc::UnboundedSender<ConnectionEvent>,
    active: Option<ActiveConnection>,
    next_id: u64,
}

impl ConnectionManager {
    /// Create a manager that reports every connection's signals on `signal_tx`.
    pub fn new(signal_tx: mpsc::UnboundedSender<ConnectionEvent>) -> Self {
        Self {
            signal_tx,
            active: None,
            next_id: 0,
        }
    }

    /// Handle of the current connection, if any.
    pub fn current(&self) -> Option<ConnectionHandle> {
        self.active.as_ref().map(|active| active.handle)
    }

    fn active_for(&self, handle: ConnectionHandle) -> Option<&ActiveConnection> {
        self.active.as_ref().filter(|active| active.handle == handle)
    }
}

impl Transport for ConnectionManager {
    fn open(&mut self, address: &str) -> ConnectionHandle {
        if let Some(previous) = self.current() {
            log::info!("[connection] Replacing {previous} with a new connection");
            self.close(previous);
        }

        self.next_id += 1;
        let handle = ConnectionHandle(self.next_id);
        let state = SharedReadyState::new();
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();

        let context = worker::WorkerContext {
            url: address.to_string(),
            handle,
            state: state.clone(),
            signal_tx: self.signal_tx.clone(),
        };

        let spawned = std::thread::Builder::new()
            .name(format!("roomchat-{handle}"))
            .spawn(move || worker::run(context, outgoing_rx));

        if let Err(e) = spawned {
            log::error!("[connection] Failed to spawn thread for {handle}: {e}");
            state.set(ReadyState::Closed);
            let _ = self.signal_tx.send(ConnectionEvent {
                handle,
                signal: ConnectionSignal::TransportError(format!(
                    "Failed to spawn connection thread: {e}"
                )),
            });
            let _ = self.signal_tx.send(ConnectionEvent {
                handle,
                signal: ConnectionSignal::Close {
                    code: crate::ws::ABNORMAL_CLOSE,
                    reason: "connection thread unavailable".to_string(),
                },
            });
        } else {
            log::info!("[connection] Opening {handle} to {address}");
        }

        self.active = Some(ActiveConnection {
            handle,
            state,
            outgoing_tx,
        });
        handle
    }

    fn send(&mut self, handle: ConnectionHandle, frame: String) -> Result<(), SendError> {
        let active = self.active_for(handle).ok_or(SendError::NotOpen)?;
        if active.state.get() != ReadyState::Open {
            return Err(SendError::NotOpen);
        }
        active
            .outgoing_tx
            .send(Outgoing::Text(frame))
            .map_err(|_closed| SendError::NotOpen)
    }

    fn close(&mut self, handle: ConnectionHandle) {
        if self.current() != Some(handle) {
            return;
        }
        let Some(active) = self.active.take() else {
            return;
        };

        if active.state.get() != ReadyState::Closed {
            active.state.set(ReadyState::Closing);
        }
        // The thread may already be gone; nothing left to close then.
        let _ = active.outgoing_tx.send(Outgoing::Close);
        log::info!("[connection] Closing {handle}");
    }

    fn ready_state(&self, handle: ConnectionHandle) -> ReadyState {
        self.active_for(handle)
            .map_or(ReadyState::Closed, |active| active.state.get())
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Some(handle) = self.current() {
            self.close(handle);
        }
    }
}
