//! In-memory [`Transport`] for unit tests.

use std::collections::HashMap;

use super::{ConnectionHandle, ReadyState, SendError, Transport};

/// Records frames and lets tests drive ready states by hand.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    /// Report new handles as `Open` right away instead of `Connecting`.
    pub(crate) auto_open: bool,
    pub(crate) next_id: u64,
    pub(crate) states: HashMap<ConnectionHandle, ReadyState>,
    pub(crate) sent: Vec<(ConnectionHandle, String)>,
    pub(crate) closed: Vec<ConnectionHandle>,
}

impl MockTransport {
    /// Transport whose connections are open as soon as they are requested.
    pub(crate) fn auto_open() -> Self {
        Self {
            auto_open: true,
            ..Self::default()
        }
    }

    pub(crate) fn set_state(&mut self, handle: ConnectionHandle, state: ReadyState) {
        self.states.insert(handle, state);
    }

    /// `type` field of every sent frame, in send order.
    pub(crate) fn sent_kinds(&self) -> Vec<String> {
        self.sent
            .iter()
            .map(|(_, frame)| {
                let value: serde_json::Value = serde_json::from_str(frame).unwrap();
                value["type"].as_str().unwrap().to_string()
            })
            .collect()
    }

    pub(crate) fn last_sent(&self) -> serde_json::Value {
        let (_, frame) = self.sent.last().unwrap();
        serde_json::from_str(frame).unwrap()
    }
}

impl Transport for MockTransport {
    fn open(&mut self, _address: &str) -> ConnectionHandle {
        self.next_id += 1;
        let handle = ConnectionHandle::new(self.next_id);
        let state = if self.auto_open {
            ReadyState::Open
        } else {
            ReadyState::Connecting
        };
        self.states.insert(handle, state);
        handle
    }

    fn send(&mut self, handle: ConnectionHandle, frame: String) -> Result<(), SendError> {
        if self.ready_state(handle) != ReadyState::Open {
            return Err(SendError::NotOpen);
        }
        self.sent.push((handle, frame));
        Ok(())
    }

    fn close(&mut self, handle: ConnectionHandle) {
        self.states.insert(handle, ReadyState::Closed);
        self.closed.push(handle);
    }

    fn ready_state(&self, handle: ConnectionHandle) -> ReadyState {
        self.states
            .get(&handle)
            .copied()
            .unwrap_or(ReadyState::Closed)
    }
}
