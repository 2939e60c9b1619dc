//! TuiRunner - owns TUI state and drives the event loop.
//!
//! Each iteration:
//!
//! 1. [`ChatApp::pump`] applies connection signals; raised notifications
//!    become toasts.
//! 2. Session updates resync the view (room code, scroll, focus).
//! 3. A frame is drawn.
//! 4. At most one key event is read and turned into a [`UiAction`].

// Rust guideline compliant 2026-02

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::Result;
use crossterm::event::{self, Event};
use ratatui::{backend::Backend, Terminal};
use tokio::sync::broadcast;

use super::actions::UiAction;
use super::input::key_event_to_action;
use super::render::{render, RenderContext};
use super::toast::ToastQueue;
use super::view::{LobbyField, ViewState};
use crate::app::ChatApp;
use crate::connection::Transport;
use crate::constants::INPUT_POLL_TIMEOUT;
use crate::session::{Outcome, Phase, SessionUpdate};

/// TUI state wrapped around a [`ChatApp`].
#[derive(Debug)]
pub struct TuiRunner<'a, T: Transport> {
    app: &'a mut ChatApp<T>,
    view: ViewState,
    toasts: ToastQueue,
    updates: broadcast::Receiver<SessionUpdate>,
    quit: bool,
}

impl<'a, T: Transport> TuiRunner<'a, T> {
    /// Wrap `app`, seeding the view from its session.
    pub fn new(app: &'a mut ChatApp<T>) -> Self {
        let view = ViewState::from_session(app.session());
        let updates = app.session().subscribe();
        Self {
            app,
            view,
            toasts: ToastQueue::default(),
            updates,
            quit: false,
        }
    }

    /// Returns true once the user asked to quit.
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Run until quit or `shutdown_flag` is set.
    pub fn run<B>(&mut self, terminal: &mut Terminal<B>, shutdown_flag: &AtomicBool) -> Result<()>
    where
        B: Backend,
        B::Error: std::error::Error + Send + Sync + 'static,
    {
        log::info!("TUI event loop starting");
        while !self.quit && !shutdown_flag.load(Ordering::SeqCst) {
            self.tick(Instant::now());

            let ctx = RenderContext::new(
                self.app.session(),
                self.app.relay_url(),
                &self.view,
                &self.toasts,
            );
            render(terminal, &ctx)?;

            if event::poll(INPUT_POLL_TIMEOUT)? {
                if let Event::Key(key) = event::read()? {
                    if let Some(action) = key_event_to_action(&key, self.app.session().phase()) {
                        self.handle_action(action);
                    }
                }
            }
        }
        log::info!("TUI event loop exiting");
        Ok(())
    }

    /// Apply pending signals, collect toasts and resync the view.
    pub fn tick(&mut self, now: Instant) {
        for notification in self.app.pump() {
            self.toasts.push(notification, now);
        }

        loop {
            match self.updates.try_recv() {
                Ok(update) => self.view.apply_update(&update, self.app.session()),
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    log::debug!("TUI missed {missed} session updates, resyncing");
                    self.view
                        .apply_update(&SessionUpdate::RoomChanged, self.app.session());
                }
                Err(_) => break,
            }
        }

        self.toasts.prune(now);
    }

    /// Apply one action.
    pub fn handle_action(&mut self, action: UiAction) {
        let phase = self.app.session().phase();
        match action {
            UiAction::Quit => self.quit = true,
            UiAction::Reconnect => {
                log::info!("Reconnect requested");
                self.app.connect();
            }
            UiAction::NextField => {
                if phase == Phase::Lobby {
                    self.view.focus = self.view.focus.toggled();
                }
            }
            UiAction::CreateRoom => {
                self.app.session_mut().create_room();
            }
            UiAction::Submit => self.submit(phase),
            UiAction::ScrollUp(lines) => {
                let max = self.app.session().message_log().chat_messages().count();
                self.view.scroll_by(true, lines, max);
            }
            UiAction::ScrollDown(lines) => {
                let max = self.app.session().message_log().chat_messages().count();
                self.view.scroll_by(false, lines, max);
            }
            UiAction::ScrollToBottom => self.view.scroll = 0,
            edit => {
                if self.view.apply_edit(phase, edit) && phase == Phase::Lobby {
                    self.push_lobby_field();
                }
            }
        }
    }

    fn submit(&mut self, phase: Phase) {
        match phase {
            Phase::Lobby => match self.view.focus {
                LobbyField::Username => self.view.focus = LobbyField::RoomCode,
                LobbyField::RoomCode => {
                    self.app.session_mut().join_room();
                }
            },
            Phase::InRoom => {
                let text = self.view.compose.value().to_string();
                if self.app.session_mut().send_message(&text) == Outcome::Sent {
                    self.view.compose.reset();
                    self.view.scroll = 0;
                }
            }
            Phase::Disconnected | Phase::AwaitingRoom => {}
        }
    }

    /// Copy the edited lobby field into the session.
    fn push_lobby_field(&mut self) {
        let session = self.app.session_mut();
        match self.view.focus {
            LobbyField::Username => session.set_username(self.view.username.value()),
            LobbyField::RoomCode => session.set_room_id(self.view.room_code.value()),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    use crate::config::Config;
    use crate::connection::testing::MockTransport;
    use crate::connection::{ConnectionEvent, ConnectionSignal};
    use crate::notifications::Placement;

    struct Harness {
        app: ChatApp<MockTransport>,
        tx: mpsc::UnboundedSender<ConnectionEvent>,
    }

    impl Harness {
        fn new() -> Self {
            let (tx, rx) = mpsc::unbounded_channel();
            let app = ChatApp::with_transport(MockTransport::auto_open(), rx, &Config::default());
            Self { app, tx }
        }

        fn connected() -> Self {
            let mut harness = Self::new();
            let handle = harness.app.connect();
            harness.send(handle, ConnectionSignal::Open);
            harness
        }

        fn send(&self, handle: crate::connection::ConnectionHandle, signal: ConnectionSignal) {
            self.tx.send(ConnectionEvent { handle, signal }).unwrap();
        }

        fn frame(&self, json: &str) {
            let handle = self.app.session().connection().unwrap();
            self.send(handle, ConnectionSignal::Frame(json.to_string()));
        }
    }

    fn type_text<T: Transport>(runner: &mut TuiRunner<'_, T>, text: &str) {
        for c in text.chars() {
            runner.handle_action(UiAction::InputChar(c));
        }
    }

    #[test]
    fn test_typing_in_lobby_updates_session() {
        let mut harness = Harness::connected();
        let mut runner = TuiRunner::new(&mut harness.app);
        runner.tick(Instant::now());

        type_text(&mut runner, "alice");
        runner.handle_action(UiAction::Submit);
        type_text(&mut runner, "R1");

        assert_eq!(runner.app.session().username(), Some("alice"));
        assert_eq!(runner.app.session().room_id(), Some("R1"));
        assert_eq!(runner.view.focus, LobbyField::RoomCode);
    }

    #[test]
    fn test_submit_on_room_code_joins() {
        let mut harness = Harness::connected();
        let mut runner = TuiRunner::new(&mut harness.app);
        runner.tick(Instant::now());

        type_text(&mut runner, "alice");
        runner.handle_action(UiAction::NextField);
        type_text(&mut runner, "R1");
        runner.handle_action(UiAction::Submit);

        assert!(runner.app.session().is_join_pending());
        assert_eq!(runner.app.session().transport().sent_kinds(), vec!["join"]);
    }

    #[test]
    fn test_create_without_username_shows_error_toast() {
        let mut harness = Harness::connected();
        let mut runner = TuiRunner::new(&mut harness.app);
        runner.tick(Instant::now());

        runner.handle_action(UiAction::CreateRoom);
        runner.tick(Instant::now());

        let errors: Vec<_> = runner
            .toasts
            .visible(Placement::BottomRight)
            .map(|t| t.notification.text.clone())
            .collect();
        assert_eq!(errors, vec!["Missing Username Value!"]);
    }

    #[test]
    fn test_chat_submit_sends_and_clears_compose() {
        let mut harness = Harness::connected();
        harness.frame(r#"{"type":"joinedRoom","payload":{"roomId":"R7"}}"#);
        let mut runner = TuiRunner::new(&mut harness.app);
        runner.tick(Instant::now());
        assert_eq!(runner.app.session().phase(), Phase::InRoom);

        type_text(&mut runner, "hello");
        runner.handle_action(UiAction::Submit);

        assert_eq!(runner.view.compose.value(), "");
        assert_eq!(
            runner.app.session().transport().last_sent()["payload"]["message"],
            "hello"
        );
    }

    #[test]
    fn test_blank_chat_submit_keeps_compose() {
        let mut harness = Harness::connected();
        harness.frame(r#"{"type":"joinedRoom","payload":{"roomId":"R7"}}"#);
        let mut runner = TuiRunner::new(&mut harness.app);
        runner.tick(Instant::now());

        type_text(&mut runner, "  ");
        runner.handle_action(UiAction::Submit);

        assert_eq!(runner.view.compose.value(), "  ");
        assert!(runner.app.session().transport().sent.is_empty());
    }

    #[test]
    fn test_room_no_exist_clears_room_code_field() {
        let mut harness = Harness::connected();
        let mut runner = TuiRunner::new(&mut harness.app);
        runner.tick(Instant::now());
        type_text(&mut runner, "alice");
        runner.handle_action(UiAction::NextField);
        type_text(&mut runner, "NOPE");
        runner.handle_action(UiAction::Submit);

        harness_frame(&mut runner, r#"{"type":"roomnoexist"}"#);
        runner.tick(Instant::now());

        assert_eq!(runner.view.room_code.value(), "");
        assert!(runner
            .toasts
            .visible(Placement::BottomRight)
            .any(|t| t.notification.text == "Invalid Room ID Entered"));
    }

    /// Deliver a frame while the runner holds the app borrow.
    fn harness_frame(runner: &mut TuiRunner<'_, MockTransport>, json: &str) {
        let handle = runner.app.session().connection().unwrap();
        runner.app.session_mut().handle_signal(ConnectionEvent {
            handle,
            signal: ConnectionSignal::Frame(json.to_string()),
        });
    }

    #[test]
    fn test_quit_and_reconnect() {
        let mut harness = Harness::connected();
        let mut runner = TuiRunner::new(&mut harness.app);
        runner.tick(Instant::now());
        let before = runner.app.session().connection();

        runner.handle_action(UiAction::Reconnect);
        assert_ne!(runner.app.session().connection(), before);
        assert_eq!(runner.app.session().phase(), Phase::Disconnected);

        runner.handle_action(UiAction::Quit);
        assert!(runner.should_quit());
    }
}
