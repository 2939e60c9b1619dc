//! TUI rendering.
//!
//! Rendering is decoupled from the runner via [`RenderContext`]:
//!
//! ```text
//! TuiRunner ──builds──> RenderContext ──passed to──> render()
//! ```
//!
//! One view per phase:
//!
//! - **Disconnected**: relay address and the reconnect hint
//! - **Lobby**: username and room code fields
//! - **AwaitingRoom**: loading message while the relay creates the room
//! - **InRoom**: room header, transcript, compose box
//!
//! Toasts are drawn last, over whichever view is active.

// Rust guideline compliant 2026-02

use anyhow::Result;
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tui_input::Input;

use super::toast::ToastQueue;
use super::view::{LobbyField, ViewState};
use crate::connection::Transport;
use crate::notifications::{Notifier, Placement, Severity};
use crate::protocol::Event;
use crate::session::{MessageLog, Phase, Session};

/// Everything a frame needs, borrowed from the runner.
#[derive(Debug)]
pub struct RenderContext<'a> {
    /// Current session phase.
    pub phase: Phase,
    /// Relay address, shown while disconnected.
    pub relay_url: &'a str,
    /// Our username; decides which side a message is drawn on.
    pub username: Option<&'a str>,
    /// Current room id.
    pub room_id: Option<&'a str>,
    /// A join request is waiting for the relay.
    pub join_pending: bool,
    /// Received events.
    pub log: &'a MessageLog,
    /// Field buffers, focus and scroll.
    pub view: &'a ViewState,
    /// Active toasts.
    pub toasts: &'a ToastQueue,
}

impl<'a> RenderContext<'a> {
    /// Borrow render state from a session and the runner's view.
    pub fn new<T: Transport, N: Notifier>(
        session: &'a Session<T, N>,
        relay_url: &'a str,
        view: &'a ViewState,
        toasts: &'a ToastQueue,
    ) -> Self {
        Self {
            phase: session.phase(),
            relay_url,
            username: session.username(),
            room_id: session.room_id(),
            join_pending: session.is_join_pending(),
            log: session.message_log(),
            view,
            toasts,
        }
    }
}

/// Draw one frame.
pub fn render<B>(terminal: &mut Terminal<B>, ctx: &RenderContext) -> Result<()>
where
    B: Backend,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    terminal.draw(|f| render_frame(f, ctx))?;
    Ok(())
}

/// Render the full frame for the current phase.
pub fn render_frame(f: &mut Frame, ctx: &RenderContext) {
    let area = f.area();
    match ctx.phase {
        Phase::Disconnected => render_disconnected(f, ctx, area),
        Phase::Lobby => render_lobby(f, ctx, area),
        Phase::AwaitingRoom => render_loading(f, ctx, area),
        Phase::InRoom => render_chat(f, ctx, area),
    }
    render_toasts(f, ctx.toasts, area);
}

fn render_disconnected(f: &mut Frame, ctx: &RenderContext, area: Rect) {
    let popup = centered_rect(60, 40, area);
    let text = vec![
        Line::from(Span::styled(
            "Not connected",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("Relay: {}", ctx.relay_url)),
        Line::from(""),
        Line::from(Span::styled(
            "Ctrl+R reconnect | Ctrl+Q quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" roomchat "))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, popup);
}

fn render_lobby(f: &mut Frame, ctx: &RenderContext, area: Rect) {
    let popup = centered_rect(60, 60, area);
    let block = Block::default().borders(Borders::ALL).title(" roomchat ");
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new("Create a room or join one with its code").alignment(Alignment::Center),
        rows[0],
    );

    let focus = ctx.view.focus;
    render_field(
        f,
        rows[1],
        " Username ",
        &ctx.view.username,
        focus == LobbyField::Username,
    );
    render_field(
        f,
        rows[2],
        " Room Code ",
        &ctx.view.room_code,
        focus == LobbyField::RoomCode,
    );

    if ctx.join_pending {
        f.render_widget(
            Paragraph::new(Span::styled("Joining...", Style::default().fg(Color::Yellow)))
                .alignment(Alignment::Center),
            rows[3],
        );
    }

    f.render_widget(
        Paragraph::new(Span::styled(
            "Ctrl+N create | Enter join | Tab switch | Ctrl+Q quit",
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(Alignment::Center),
        rows[5],
    );
}

fn render_loading(f: &mut Frame, ctx: &RenderContext, area: Rect) {
    let popup = centered_rect(50, 30, area);
    let mut text = vec![
        Line::from(Span::styled(
            "Creating room...",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    match ctx.room_id {
        Some(room) => text.push(Line::from(format!("Room ID: {room}"))),
        None => text.push(Line::from("Waiting for the relay")),
    }
    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" roomchat "))
        .alignment(Alignment::Center);
    f.render_widget(paragraph, popup);
}

fn render_chat(f: &mut Frame, ctx: &RenderContext, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(area);

    let header = Line::from(vec![
        Span::raw("Room ID: "),
        Span::styled(
            ctx.room_id.unwrap_or_default(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
    ]);
    let title = format!(" roomchat - {} ", ctx.username.unwrap_or("anonymous"));
    f.render_widget(
        Paragraph::new(header).block(Block::default().borders(Borders::ALL).title(title)),
        rows[0],
    );

    render_transcript(f, ctx, rows[1]);
    render_field(
        f,
        rows[2],
        " Message [Enter send | PgUp/PgDn scroll | Ctrl+Q quit] ",
        &ctx.view.compose,
        true,
    );
}

fn render_transcript(f: &mut Frame, ctx: &RenderContext, area: Rect) {
    let title = if ctx.view.scroll > 0 {
        " Messages [scrolled] "
    } else {
        " Messages "
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);

    let lines = transcript_lines(ctx.log, ctx.username);
    if lines.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(
                "No messages yet.",
                Style::default().fg(Color::DarkGray),
            ))
            .alignment(Alignment::Center)
            .block(block),
            area,
        );
        return;
    }

    let max_scroll = lines.len().saturating_sub(usize::from(inner.height));
    let top = max_scroll - ctx.view.scroll.min(max_scroll);
    let top = u16::try_from(top).unwrap_or(u16::MAX);
    f.render_widget(Paragraph::new(lines).block(block).scroll((top, 0)), area);
}

/// One line per chat message: ours on the left, everyone else's on the right.
pub fn transcript_lines<'a>(log: &'a MessageLog, own_username: Option<&str>) -> Vec<Line<'a>> {
    log.chat_messages()
        .filter_map(|entry| match &entry.event {
            Event::Message {
                username, message, ..
            } => {
                let own = own_username == Some(username.as_str());
                let name_style = if own {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                };
                let line = Line::from(vec![
                    Span::styled(
                        entry.received_at.format("%H:%M ").to_string(),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(username.as_str(), name_style),
                    Span::raw(": "),
                    Span::raw(message.as_str()),
                ]);
                Some(if own {
                    line.alignment(Alignment::Left)
                } else {
                    line.alignment(Alignment::Right)
                })
            }
            _ => None,
        })
        .collect()
}

/// Single-line text field with horizontal scrolling and a cursor when focused.
fn render_field(f: &mut Frame, area: Rect, title: &str, input: &Input, focused: bool) {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title);
    let inner = block.inner(area);

    let width = usize::from(inner.width.max(1));
    let scroll = input.visual_scroll(width);
    let offset = u16::try_from(scroll).unwrap_or(u16::MAX);
    f.render_widget(
        Paragraph::new(input.value())
            .block(block)
            .scroll((0, offset)),
        area,
    );

    if focused && inner.width > 0 && inner.height > 0 {
        let cursor = input.visual_cursor().saturating_sub(scroll);
        let x = inner.x + u16::try_from(cursor).unwrap_or(u16::MAX).min(inner.width - 1);
        f.set_cursor_position((x, inner.y));
    }
}

fn render_toasts(f: &mut Frame, toasts: &ToastQueue, area: Rect) {
    for placement in [Placement::TopCenter, Placement::BottomRight] {
        for (i, toast) in toasts.visible(placement).enumerate() {
            let text = &toast.notification.text;
            let wanted = u16::try_from(text.chars().count() + 4).unwrap_or(u16::MAX);
            let width = wanted.min(area.width);
            let Ok(slot) = u16::try_from(i) else { break };
            let stacked = slot.saturating_mul(3);
            if stacked + 3 > area.height {
                break;
            }

            let (x, y) = match placement {
                Placement::TopCenter => (area.x + (area.width - width) / 2, area.y + stacked),
                Placement::BottomRight => {
                    (area.right() - width, area.bottom() - stacked - 3)
                }
            };
            let rect = Rect::new(x, y, width, 3);

            f.render_widget(Clear, rect);
            f.render_widget(
                Paragraph::new(text.as_str()).block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(severity_color(toast.notification.severity))),
                ),
                rect,
            );
        }
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Cyan,
        Severity::Success => Color::Green,
        Severity::Error => Color::Red,
    }
}

/// Centered rectangle taking the given percentage of `parent`.
fn centered_rect(percent_x: u16, percent_y: u16, parent: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(parent);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use ratatui::backend::TestBackend;

    use crate::connection::testing::MockTransport;
    use crate::connection::{ConnectionEvent, ConnectionSignal};
    use crate::notifications::{ChannelNotifier, Notification};
    use crate::protocol::encode_event;

    type TestSession = Session<MockTransport, ChannelNotifier>;

    fn session() -> TestSession {
        let (notifier, _rx) = ChannelNotifier::new();
        Session::new(MockTransport::auto_open(), notifier, None)
    }

    fn signal(session: &mut TestSession, signal: ConnectionSignal) {
        let handle = session.connection().unwrap();
        session.handle_signal(ConnectionEvent { handle, signal });
    }

    fn frame(session: &mut TestSession, event: &Event) {
        signal(session, ConnectionSignal::Frame(encode_event(event)));
    }

    fn lobby() -> TestSession {
        let mut session = session();
        session.connect("ws://relay.test");
        signal(&mut session, ConnectionSignal::Open);
        session.set_username("alice");
        session
    }

    fn in_room() -> TestSession {
        let mut session = lobby();
        frame(
            &mut session,
            &Event::JoinedRoom {
                room_id: "R42".to_string(),
            },
        );
        session
    }

    fn chat(user: &str, text: &str) -> Event {
        Event::Message {
            room_id: "R42".to_string(),
            username: user.to_string(),
            message: text.to_string(),
        }
    }

    fn draw(session: &TestSession, view: &ViewState, toasts: &ToastQueue) -> Vec<String> {
        let backend = TestBackend::new(70, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let ctx = RenderContext::new(session, "ws://relay.test", view, toasts);
        render(&mut terminal, &ctx).unwrap();

        let buffer = terminal.backend().buffer();
        let width = usize::from(buffer.area.width);
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    fn contains(screen: &[String], needle: &str) -> bool {
        screen.iter().any(|row| row.contains(needle))
    }

    #[test]
    fn test_disconnected_view_shows_relay() {
        let session = session();
        let screen = draw(&session, &ViewState::default(), &ToastQueue::default());
        assert!(contains(&screen, "Not connected"));
        assert!(contains(&screen, "ws://relay.test"));
    }

    #[test]
    fn test_lobby_view_shows_fields() {
        let session = lobby();
        let view = ViewState::from_session(&session);
        let screen = draw(&session, &view, &ToastQueue::default());
        assert!(contains(&screen, "Username"));
        assert!(contains(&screen, "Room Code"));
        assert!(contains(&screen, "alice"));
    }

    #[test]
    fn test_loading_view_while_awaiting_room() {
        let mut session = lobby();
        session.create_room();
        let screen = draw(&session, &ViewState::default(), &ToastQueue::default());
        assert!(contains(&screen, "Creating room..."));
    }

    #[test]
    fn test_empty_room_shows_placeholder() {
        let session = in_room();
        let screen = draw(&session, &ViewState::default(), &ToastQueue::default());
        assert!(contains(&screen, "Room ID: R42"));
        assert!(contains(&screen, "No messages yet."));
    }

    #[test]
    fn test_messages_aligned_by_author() {
        let mut session = in_room();
        frame(&mut session, &chat("alice", "mine"));
        frame(&mut session, &chat("bob", "theirs"));
        let screen = draw(&session, &ViewState::default(), &ToastQueue::default());

        let mine = screen.iter().find(|row| row.contains("alice: mine")).unwrap();
        let theirs = screen.iter().find(|row| row.contains("bob: theirs")).unwrap();
        // Own messages hug the left border, others the right.
        assert!(mine.find("alice").unwrap() < theirs.find("bob").unwrap());
        assert!(theirs.trim_end().ends_with("theirs│"), "{theirs}");
    }

    #[test]
    fn test_non_chat_events_not_in_transcript() {
        let mut session = in_room();
        frame(
            &mut session,
            &Event::UserJoined {
                username: "bob".to_string(),
            },
        );
        assert!(transcript_lines(session.message_log(), Some("alice")).is_empty());
    }

    #[test]
    fn test_toasts_drawn_over_view() {
        let session = in_room();
        let mut toasts = ToastQueue::default();
        toasts.push(
            Notification::success("Joined Room - R42", Duration::from_secs(2)),
            Instant::now(),
        );
        toasts.push(
            Notification::error("Invalid Room ID Entered", Duration::from_secs(3)),
            Instant::now(),
        );
        let screen = draw(&session, &ViewState::default(), &toasts);

        let top = screen.iter().position(|row| row.contains("Joined Room - R42")).unwrap();
        let bottom = screen
            .iter()
            .position(|row| row.contains("Invalid Room ID Entered"))
            .unwrap();
        assert!(top < bottom);
    }
}
