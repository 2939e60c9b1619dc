//! Wire protocol between the chat client and the relay.
//!
//! Every frame is a UTF-8 JSON object with a `type` discriminator and, for
//! kinds that carry data, a `payload` object:
//!
//! ```text
//! {"type": "join", "payload": {"roomId": "R1", "username": "alice"}}
//! {"type": "roomnoexist"}
//! ```
//!
//! # Message Types
//!
//! - [`Command`] - client → relay (create, join, message, validation reports)
//! - [`Event`] - relay → client (room lifecycle, chat, membership, errors)
//!
//! The vocabulary is closed. [`decode`] rejects unknown kinds and payloads that
//! lack a field required by their kind, so the session never has to trust the
//! shape of a frame at use time.

// Rust guideline compliant 2026-02

use serde::{Deserialize, Serialize};

/// Outbound protocol message (client → relay).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Command {
    /// Ask the relay to create a new room owned by `username`.
    #[serde(rename = "create")]
    Create { username: String },
    /// Ask the relay to add `username` to an existing room.
    #[serde(rename = "join")]
    Join {
        #[serde(rename = "roomId")]
        room_id: String,
        username: String,
    },
    /// Chat message for fan-out to everyone in the room.
    #[serde(rename = "message")]
    Message {
        #[serde(rename = "roomId")]
        room_id: String,
        username: String,
        message: String,
    },
    /// Client-side validation rejected an action: username was empty.
    #[serde(rename = "NoUsernameError")]
    NoUsernameError,
    /// Client-side validation rejected a join: room id was empty.
    #[serde(rename = "NoRoomIDError")]
    NoRoomIdError,
}

impl Command {
    /// Wire name of this command's `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Join { .. } => "join",
            Self::Message { .. } => "message",
            Self::NoUsernameError => "NoUsernameError",
            Self::NoRoomIdError => "NoRoomIDError",
        }
    }
}

/// Inbound protocol message (relay → client).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    /// A room was created for this client.
    #[serde(rename = "createdRoom")]
    CreatedRoom {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    /// This client is now a member of `room_id`.
    #[serde(rename = "joinedRoom")]
    JoinedRoom {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    /// Chat message relayed to the room (including our own, echoed back).
    #[serde(rename = "message")]
    Message {
        #[serde(rename = "roomId")]
        room_id: String,
        username: String,
        message: String,
    },
    /// Relay rejected a request for a missing username.
    #[serde(rename = "username_error")]
    UsernameError,
    /// Relay rejected a request for a missing room id.
    #[serde(rename = "roomid_error")]
    RoomIdError,
    /// The requested or current room does not exist.
    #[serde(rename = "roomnoexist")]
    RoomNoExist,
    /// Another user joined the room.
    #[serde(rename = "userJoined")]
    UserJoined { username: String },
    /// Another user left the room.
    #[serde(rename = "userLeft")]
    UserLeft { username: String },
}

impl Event {
    /// Wire name of this event's `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreatedRoom { .. } => "createdRoom",
            Self::JoinedRoom { .. } => "joinedRoom",
            Self::Message { .. } => "message",
            Self::UsernameError => "username_error",
            Self::RoomIdError => "roomid_error",
            Self::RoomNoExist => "roomnoexist",
            Self::UserJoined { .. } => "userJoined",
            Self::UserLeft { .. } => "userLeft",
        }
    }

    /// Returns true for chat messages, the only kind meant for the transcript.
    pub fn is_chat_message(&self) -> bool {
        matches!(self, Self::Message { .. })
    }
}

/// Why an inbound frame could not be turned into an [`Event`].
#[derive(Debug)]
pub enum DecodeError {
    /// Frame is not a JSON object with a string `type` field.
    Malformed(serde_json::Error),
    /// `type` names no known event kind.
    UnknownType(String),
    /// Kind requires a payload but the frame has none.
    MissingPayload {
        /// Event kind from the frame.
        kind: String,
    },
    /// Payload is present but lacks or mistypes a required field.
    InvalidPayload {
        /// Event kind from the frame.
        kind: String,
        /// Underlying deserialization failure.
        source: serde_json::Error,
    },
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(e) => write!(f, "Malformed frame: {e}"),
            Self::UnknownType(kind) => write!(f, "Unknown event type: {kind}"),
            Self::MissingPayload { kind } => write!(f, "Missing payload for {kind}"),
            Self::InvalidPayload { kind, source } => {
                write!(f, "Invalid payload for {kind}: {source}")
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed(e) | Self::InvalidPayload { source: e, .. } => Some(e),
            Self::UnknownType(_) | Self::MissingPayload { .. } => None,
        }
    }
}

/// Envelope shared by every frame: discriminator plus optional payload.
#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RoomPayload {
    #[serde(rename = "roomId")]
    room_id: String,
}

#[derive(Debug, Deserialize)]
struct ChatPayload {
    #[serde(rename = "roomId")]
    room_id: String,
    username: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    username: String,
}

/// Serialize a command into a text frame.
///
/// Infallible for every [`Command`]: all fields are plain strings.
pub fn encode(command: &Command) -> String {
    serde_json::to_string(command).unwrap_or_default()
}

/// Serialize an event into a text frame, as the relay would send it.
///
/// The client never sends events; this exists so tests can play the relay.
pub fn encode_event(event: &Event) -> String {
    serde_json::to_string(event).unwrap_or_default()
}

/// Parse an inbound text frame into an [`Event`].
///
/// Unit kinds (`username_error`, `roomid_error`, `roomnoexist`) accept any or
/// no payload. Extra payload fields are ignored.
pub fn decode(frame: &str) -> Result<Event, DecodeError> {
    let raw: RawFrame = serde_json::from_str(frame).map_err(DecodeError::Malformed)?;

    let event = match raw.kind.as_str() {
        "createdRoom" => {
            let p: RoomPayload = payload(&raw)?;
            Event::CreatedRoom { room_id: p.room_id }
        }
        "joinedRoom" => {
            let p: RoomPayload = payload(&raw)?;
            Event::JoinedRoom { room_id: p.room_id }
        }
        "message" => {
            let p: ChatPayload = payload(&raw)?;
            Event::Message {
                room_id: p.room_id,
                username: p.username,
                message: p.message,
            }
        }
        "userJoined" => {
            let p: UserPayload = payload(&raw)?;
            Event::UserJoined { username: p.username }
        }
        "userLeft" => {
            let p: UserPayload = payload(&raw)?;
            Event::UserLeft { username: p.username }
        }
        "username_error" => Event::UsernameError,
        "roomid_error" => Event::RoomIdError,
        "roomnoexist" => Event::RoomNoExist,
        other => return Err(DecodeError::UnknownType(other.to_string())),
    };

    Ok(event)
}

fn payload<T: serde::de::DeserializeOwned>(raw: &RawFrame) -> Result<T, DecodeError> {
    let value = raw
        .payload
        .clone()
        .ok_or_else(|| DecodeError::MissingPayload {
            kind: raw.kind.clone(),
        })?;
    serde_json::from_value(value).map_err(|source| DecodeError::InvalidPayload {
        kind: raw.kind.clone(),
        source,
    })
}
