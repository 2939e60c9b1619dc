//! WebSocket transport to the chat relay.
//!
//! Thin wrapper around `tokio-tungstenite` that hands back independent
//! writer/reader halves so a connection task can `tokio::select!` over
//! incoming frames and outgoing commands. The rest of the crate never touches
//! `tungstenite` types directly.

// Rust guideline compliant 2026-02

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite;

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Close code reported when the stream ends without a close frame.
pub const ABNORMAL_CLOSE: u16 = 1006;

/// Frame read from the relay.
#[derive(Debug, PartialEq, Eq)]
pub enum RelayFrame {
    /// UTF-8 text frame.
    Text(String),
    /// Relay closed the connection.
    Close {
        /// WebSocket close code (1000 = normal, 1005 = no code).
        code: u16,
        /// Human-readable close reason.
        reason: String,
    },
}

/// Write half of a relay connection.
#[derive(Debug)]
pub struct WsWriter {
    sink: futures_util::stream::SplitSink<WsStream, tungstenite::Message>,
}

impl WsWriter {
    /// Send one text frame.
    pub async fn send_text(&mut self, text: String) -> Result<()> {
        self.sink
            .send(tungstenite::Message::Text(text))
            .await
            .context("WebSocket send failed")
    }

    /// Send a close frame and flush the sink.
    pub async fn close(&mut self) -> Result<()> {
        self.sink
            .send(tungstenite::Message::Close(None))
            .await
            .context("WebSocket close frame failed")?;
        self.sink.close().await.context("WebSocket close failed")
    }
}

/// Read half of a relay connection.
#[derive(Debug)]
pub struct WsReader {
    stream: futures_util::stream::SplitStream<WsStream>,
}

impl WsReader {
    /// Receive the next frame, returning `None` when the stream ends.
    ///
    /// Ping/pong and raw frames are skipped; tungstenite answers pings itself.
    /// The relay speaks text only, so binary frames are dropped.
    pub async fn recv(&mut self) -> Option<Result<RelayFrame>> {
        loop {
            match self.stream.next().await? {
                Ok(tungstenite::Message::Text(text)) => {
                    return Some(Ok(RelayFrame::Text(text)));
                }
                Ok(tungstenite::Message::Binary(data)) => {
                    log::warn!("[ws] Dropping {}-byte binary frame", data.len());
                }
                Ok(tungstenite::Message::Close(close_frame)) => {
                    let (code, reason) = close_frame
                        .map(|cf| (cf.code.into(), cf.reason.to_string()))
                        .unwrap_or((1005, String::new()));
                    return Some(Ok(RelayFrame::Close { code, reason }));
                }
                Ok(
                    tungstenite::Message::Ping(_)
                    | tungstenite::Message::Pong(_)
                    | tungstenite::Message::Frame(_),
                ) => {}
                Err(e) => {
                    return Some(Err(anyhow::anyhow!("WebSocket read error: {e}")));
                }
            }
        }
    }
}

/// Open a WebSocket connection to the relay at `url`.
pub async fn connect(url: &str) -> Result<(WsWriter, WsReader)> {
    let (ws_stream, _response) = tokio_tungstenite::connect_async(url)
        .await
        .with_context(|| format!("WebSocket connect to {url} failed"))?;

    let (sink, stream) = ws_stream.split();

    Ok((WsWriter { sink }, WsReader { stream }))
}

/// Convert an HTTP(S) URL to WS(S) scheme.
///
/// Passes `ws://` and `wss://` through unchanged; a bare `host:port` gets
/// `ws://` prepended.
#[must_use]
pub fn normalize_relay_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("wss://") || url.starts_with("ws://") {
        url.to_string()
    } else if let Some(rest) = url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        format!("ws://{url}")
    }
}
