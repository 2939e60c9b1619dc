//! Applying decoded relay events to the session.

// Rust guideline compliant 2026-02

use super::{Phase, Session};
use crate::connection::Transport;
use crate::constants::{ERROR_TOAST, JOINED_ROOM_TOAST, USER_JOINED_TOAST, USER_LEFT_TOAST};
use crate::notifications::{Notification, Notifier};
use crate::protocol::Event;

impl<T: Transport, N: Notifier> Session<T, N> {
    /// Apply one inbound event: transition, notify, and log as its kind
    /// requires.
    pub(super) fn apply_event(&mut self, event: Event) {
        log::debug!("[session] Event {} in {}", event.kind(), self.phase);

        match &event {
            Event::CreatedRoom { room_id } => {
                // Records the assigned id only; entering the room waits for
                // a joinedRoom.
                if self.phase == Phase::AwaitingRoom {
                    self.set_room_id_internal(room_id.clone());
                    self.append(event);
                } else {
                    log::debug!("[session] createdRoom outside AwaitingRoom ignored");
                }
            }
            Event::JoinedRoom { room_id } => {
                if room_id.trim().is_empty() {
                    log::warn!("[session] joinedRoom without a room id dropped");
                    return;
                }
                self.set_room_id_internal(room_id.clone());
                self.set_join_pending(false);
                self.set_phase(Phase::InRoom);
                self.notifier.notify(Notification::success(
                    format!("Joined Room - {room_id}"),
                    JOINED_ROOM_TOAST,
                ));
                self.append(event);
            }
            Event::UsernameError => {
                self.set_join_pending(false);
                self.notifier
                    .notify(Notification::error("Missing Username Value!", ERROR_TOAST));
                self.append(event);
            }
            Event::RoomIdError => {
                self.set_join_pending(false);
                self.notifier
                    .notify(Notification::error("Missing Room ID Value", ERROR_TOAST));
                self.append(event);
            }
            Event::RoomNoExist => {
                self.set_room_id_internal(String::new());
                self.set_join_pending(false);
                self.set_phase(Phase::Lobby);
                self.notifier
                    .notify(Notification::error("Invalid Room ID Entered", ERROR_TOAST));
                self.append(event);
            }
            Event::UserJoined { username } => {
                self.notifier.notify(Notification::info(
                    format!("User: {username} has joined the Room"),
                    USER_JOINED_TOAST,
                ));
                self.append(event);
            }
            Event::UserLeft { username } => {
                self.notifier.notify(Notification::info(
                    format!("User: {username} has left the Room"),
                    USER_LEFT_TOAST,
                ));
                self.append(event);
            }
            Event::Message { .. } => self.append(event),
        }
    }
}
