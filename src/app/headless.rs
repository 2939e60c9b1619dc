//! Line-mode front end for terminals without a TUI, scripts and CI.
//!
//! Reads commands from stdin, prints notifications and new log entries to
//! stdout:
//!
//! ```text
//! /name <username>   set the username
//! /room <id>         set the room id
//! /create            create a room
//! /join [id]         join the entered (or given) room
//! /quit              exit
//! anything else      send as a chat message
//! ```

// Rust guideline compliant 2026-02

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use tokio::sync::mpsc;

use super::ChatApp;
use crate::connection::Transport;
use crate::constants::FRAME_DELAY;
use crate::notifications::Notification;
use crate::protocol::Event;
use crate::session::{LogEntry, Outcome, Phase};

/// One parsed stdin line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadlessCommand {
    /// `/name <username>`
    Name(String),
    /// `/room <id>`
    Room(String),
    /// `/create`
    Create,
    /// `/join [id]`
    Join(Option<String>),
    /// `/quit`
    Quit,
    /// Plain text to send to the room.
    Say(String),
    /// A `/command` we do not know.
    Unknown(String),
}

impl HeadlessCommand {
    /// Parse a line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return None;
        }
        let Some(rest) = line.trim_start().strip_prefix('/') else {
            return Some(Self::Say(line.to_string()));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        let command = match name {
            "name" => Self::Name(arg.to_string()),
            "room" => Self::Room(arg.to_string()),
            "create" => Self::Create,
            "join" if arg.is_empty() => Self::Join(None),
            "join" => Self::Join(Some(arg.to_string())),
            "quit" | "exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        };
        Some(command)
    }
}

/// Render one log entry as a single output line.
pub fn format_entry(entry: &LogEntry) -> String {
    let time = entry.received_at.format("%H:%M:%S");
    match &entry.event {
        Event::Message {
            username, message, ..
        } => format!("[{time}] <{username}> {message}"),
        Event::JoinedRoom { room_id } => format!("[{time}] * joined room {room_id}"),
        Event::UserJoined { username } => format!("[{time}] * {username} joined"),
        Event::UserLeft { username } => format!("[{time}] * {username} left"),
        Event::RoomNoExist => format!("[{time}] * room does not exist"),
        other => format!("[{time}] * {}", other.kind()),
    }
}

fn format_notification(notification: &Notification) -> String {
    format!("[{}] {}", notification.severity, notification.text)
}

/// Apply one command. Returns false when the loop should stop.
fn apply_command<T: Transport>(app: &mut ChatApp<T>, command: HeadlessCommand) -> bool {
    let session = app.session_mut();
    let outcome = match command {
        HeadlessCommand::Name(name) => session.set_username(name),
        HeadlessCommand::Room(room) => session.set_room_id(room),
        HeadlessCommand::Create => session.create_room(),
        HeadlessCommand::Join(room) => {
            if let Some(room) = room {
                session.set_room_id(room);
            }
            session.join_room()
        }
        HeadlessCommand::Quit => return false,
        HeadlessCommand::Say(text) => session.send_message(&text),
        HeadlessCommand::Unknown(name) => {
            println!("[error] unknown command /{name}");
            return true;
        }
    };
    if outcome == Outcome::Ignored {
        println!("[info] not available while {}", session.phase());
    }
    true
}

/// Forward stdin lines to the loop. The thread ends at EOF.
fn spawn_stdin_reader() -> Result<mpsc::UnboundedReceiver<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::Builder::new()
        .name("roomchat-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(rx)
}

/// Run the headless loop until `/quit`, stdin EOF, or `shutdown_flag`.
pub fn run_headless<T: Transport>(app: &mut ChatApp<T>, shutdown_flag: &AtomicBool) -> Result<()> {
    let mut lines = spawn_stdin_reader()?;
    println!("Connecting to {}...", app.relay_url());
    app.connect();
    log::info!("Headless loop starting");

    let mut last_seq = 0;
    let mut last_phase = app.session().phase();
    let mut running = true;

    while running && !shutdown_flag.load(Ordering::SeqCst) {
        loop {
            match lines.try_recv() {
                Ok(line) => {
                    if let Some(command) = HeadlessCommand::parse(&line) {
                        if !apply_command(app, command) {
                            running = false;
                            break;
                        }
                    }
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    running = false;
                    break;
                }
            }
        }

        for notification in app.pump() {
            println!("{}", format_notification(&notification));
        }

        let session = app.session();
        if session.phase() != last_phase {
            last_phase = session.phase();
            println!("-- {last_phase} --");
            if last_phase == Phase::InRoom {
                if let Some(room) = session.room_id() {
                    println!("-- Room ID: {room} --");
                }
            }
        }
        for entry in session.message_log().since(last_seq) {
            println!("{}", format_entry(entry));
            last_seq = entry.seq;
        }

        std::thread::sleep(FRAME_DELAY);
    }

    log::info!("Headless loop exiting");
    app.session_mut().disconnect();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MessageLog;

    #[test]
    fn test_parse_plain_text_is_say() {
        assert_eq!(
            HeadlessCommand::parse("hello there\n"),
            Some(HeadlessCommand::Say("hello there".to_string()))
        );
    }

    #[test]
    fn test_parse_blank_is_none() {
        assert_eq!(HeadlessCommand::parse("   \r\n"), None);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            HeadlessCommand::parse("/name alice"),
            Some(HeadlessCommand::Name("alice".to_string()))
        );
        assert_eq!(
            HeadlessCommand::parse("/room  R1 "),
            Some(HeadlessCommand::Room("R1".to_string()))
        );
        assert_eq!(HeadlessCommand::parse("/create"), Some(HeadlessCommand::Create));
        assert_eq!(HeadlessCommand::parse("/join"), Some(HeadlessCommand::Join(None)));
        assert_eq!(
            HeadlessCommand::parse("/join R2"),
            Some(HeadlessCommand::Join(Some("R2".to_string())))
        );
        assert_eq!(HeadlessCommand::parse("/quit"), Some(HeadlessCommand::Quit));
        assert_eq!(
            HeadlessCommand::parse("/dance"),
            Some(HeadlessCommand::Unknown("dance".to_string()))
        );
    }

    #[test]
    fn test_format_entry() {
        let mut log = MessageLog::new(None);
        log.push(Event::Message {
            room_id: "R1".to_string(),
            username: "bob".to_string(),
            message: "hi".to_string(),
        });
        log.push(Event::UserLeft {
            username: "bob".to_string(),
        });
        let lines: Vec<_> = log.iter().map(format_entry).collect();

        assert!(lines[0].ends_with("<bob> hi"), "{}", lines[0]);
        assert!(lines[1].ends_with("* bob left"), "{}", lines[1]);
    }

    #[test]
    fn test_format_notification() {
        let n = Notification::error("Missing Room ID Value", crate::constants::ERROR_TOAST);
        assert_eq!(format_notification(&n), "[error] Missing Room ID Value");
    }
}
