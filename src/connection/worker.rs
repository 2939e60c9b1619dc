//! Background thread body for one relay connection.
//!
//! Reads frames from the WebSocket and reports them as [`ConnectionEvent`]s.
//! Listens on `outgoing_rx` for frames queued by the manager. Exits when the
//! connection closes, an unrecoverable error occurs, or the manager drops its
//! end of the outgoing channel.

// Rust guideline compliant 2026-02

use tokio::sync::mpsc;

use super::{
    ConnectionEvent, ConnectionHandle, ConnectionSignal, Outgoing, ReadyState, SharedReadyState,
};
use crate::ws::{RelayFrame, ABNORMAL_CLOSE};

/// Everything a connection thread needs besides its outgoing queue.
#[derive(Debug)]
pub(super) struct WorkerContext {
    pub(super) url: String,
    pub(super) handle: ConnectionHandle,
    pub(super) state: SharedReadyState,
    pub(super) signal_tx: mpsc::UnboundedSender<ConnectionEvent>,
}

impl WorkerContext {
    fn emit(&self, signal: ConnectionSignal) {
        // Receiver gone means the session is shutting down.
        let _ = self.signal_tx.send(ConnectionEvent {
            handle: self.handle,
            signal,
        });
    }

    fn emit_error(&self, detail: String) {
        log::error!("[connection] {}: {detail}", self.handle);
        self.emit(ConnectionSignal::TransportError(detail));
    }

    /// Mark the connection closed, then emit the final `Close` signal.
    fn finish(&self, code: u16, reason: impl Into<String>) {
        self.state.set(ReadyState::Closed);
        let reason = reason.into();
        log::info!("[connection] {} closed ({code}): {reason}", self.handle);
        self.emit(ConnectionSignal::Close { code, reason });
    }
}

/// Run a single relay connection on a dedicated current-thread runtime.
pub(super) fn run(context: WorkerContext, mut outgoing_rx: mpsc::UnboundedReceiver<Outgoing>) {
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            context.emit_error(format!("Failed to create tokio runtime: {e}"));
            context.finish(ABNORMAL_CLOSE, "runtime unavailable");
            return;
        }
    };

    rt.block_on(drive(&context, &mut outgoing_rx));
}

async fn drive(context: &WorkerContext, outgoing_rx: &mut mpsc::UnboundedReceiver<Outgoing>) {
    // Sends are refused until Open, so anything arriving here is a close
    // request or the manager going away.
    let connected = tokio::select! {
        result = crate::ws::connect(&context.url) => Some(result),
        _ = outgoing_rx.recv() => None,
    };

    let (mut writer, mut reader) = match connected {
        Some(Ok(pair)) => pair,
        Some(Err(e)) => {
            context.emit_error(format!("{e:#}"));
            context.finish(ABNORMAL_CLOSE, "connect failed");
            return;
        }
        None => {
            context.finish(1000, "closed before open");
            return;
        }
    };

    if !context
        .state
        .transition(ReadyState::Connecting, ReadyState::Open)
    {
        let _ = writer.close().await;
        context.finish(1000, "closed before open");
        return;
    }
    log::info!("[connection] {} open", context.handle);
    context.emit(ConnectionSignal::Open);

    loop {
        tokio::select! {
            frame = reader.recv() => match frame {
                Some(Ok(RelayFrame::Text(text))) => {
                    context.emit(ConnectionSignal::Frame(text));
                }
                Some(Ok(RelayFrame::Close { code, reason })) => {
                    context.finish(code, reason);
                    return;
                }
                Some(Err(e)) => {
                    context.emit_error(format!("{e:#}"));
                    context.finish(ABNORMAL_CLOSE, "read failed");
                    return;
                }
                None => {
                    context.finish(ABNORMAL_CLOSE, "stream ended");
                    return;
                }
            },
            outgoing = outgoing_rx.recv() => match outgoing {
                Some(Outgoing::Text(text)) => {
                    if let Err(e) = writer.send_text(text).await {
                        context.emit_error(format!("{e:#}"));
                        context.finish(ABNORMAL_CLOSE, "send failed");
                        return;
                    }
                }
                Some(Outgoing::Close) => {
                    if let Err(e) = writer.close().await {
                        log::debug!("[connection] {}: close frame not delivered: {e:#}", context.handle);
                    }
                    context.finish(1000, "client requested close");
                    return;
                }
                None => {
                    let _ = writer.close().await;
                    context.state.set(ReadyState::Closed);
                    return;
                }
            },
        }
    }
}
