//! FMP websocket client
//!
//! Handles connection, the login/subscribe handshake, and frame receiving
//! for FMP's crypto websocket. The feed sends no login acknowledgment; the
//! connector layer inserts a settle delay between login and subscribe.

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, connect_async_tls_with_config, tungstenite::Message, Connector, MaybeTlsStream,
    WebSocketStream,
};
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::fmp::messages::{LoginCommand, SubscribeCommand};
use crate::message::RawMessage;

/// FMP crypto websocket URL
pub const FMP_WS_URL: &str = "wss://crypto.financialmodelingprep.com";

#[derive(Error, Debug)]
pub enum FmpWebSocketError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("TLS error: {0}")]
    Tls(#[from] native_tls::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Unexpected frame: {0}")]
    UnexpectedFrame(String),
}

/// FMP websocket client
pub struct FmpWebSocket {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl FmpWebSocket {
    /// Connect to the FMP websocket.
    ///
    /// `insecure_transport` disables certificate validation for the
    /// provider's certificate setup. The flag is explicit configuration and
    /// every use is logged at warn level.
    pub async fn connect(
        url: Option<&str>,
        insecure_transport: bool,
    ) -> Result<Self, FmpWebSocketError> {
        let url = url.unwrap_or(FMP_WS_URL);
        Url::parse(url).map_err(|e| FmpWebSocketError::Connection(e.to_string()))?;

        info!(url = %url, insecure_transport, "Connecting to FMP websocket");

        let (ws, response) = if insecure_transport {
            warn!(url = %url, "Certificate validation disabled for feed transport");
            let tls = native_tls::TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true)
                .build()?;
            connect_async_tls_with_config(url, None, false, Some(Connector::NativeTls(tls)))
                .await?
        } else {
            connect_async(url).await?
        };

        info!(status = ?response.status(), "FMP websocket connected");

        Ok(Self { ws })
    }

    /// Send the login frame carrying the API key
    pub async fn login(&mut self, api_key: &str) -> Result<(), FmpWebSocketError> {
        let cmd = LoginCommand::new(api_key);
        let msg = serde_json::to_string(&cmd)?;

        // Frame body holds the credential; log the event only.
        debug!("Sending FMP login command");
        self.ws.send(Message::Text(msg)).await?;
        Ok(())
    }

    /// Send the subscribe frame for one ticker
    pub async fn subscribe(&mut self, ticker: &str) -> Result<(), FmpWebSocketError> {
        let cmd = SubscribeCommand::new(ticker);
        let msg = serde_json::to_string(&cmd)?;

        debug!(cmd = %msg, "Sending FMP subscribe command");
        self.ws.send(Message::Text(msg)).await?;
        Ok(())
    }

    /// Block until the next text frame arrives and parse it as a JSON object.
    ///
    /// A malformed frame is a broken feed, not a skippable record: parse
    /// failures and transport errors propagate as fatal.
    pub async fn recv(&mut self) -> Result<RawMessage, FmpWebSocketError> {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    let value: serde_json::Value = serde_json::from_str(&text)?;
                    match value {
                        serde_json::Value::Object(map) => {
                            trace!(msg = %text, "Received FMP frame");
                            return Ok(map);
                        }
                        other => {
                            return Err(FmpWebSocketError::UnexpectedFrame(format!(
                                "non-object payload: {}",
                                other
                            )));
                        }
                    }
                }
                Some(Ok(Message::Ping(data))) => {
                    trace!("Received WS ping, sending pong");
                    self.ws.send(Message::Pong(data)).await?;
                }
                Some(Ok(Message::Close(frame))) => {
                    info!(frame = ?frame, "FMP websocket closed");
                    return Err(FmpWebSocketError::ConnectionClosed);
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
                None => return Err(FmpWebSocketError::ConnectionClosed),
            }
        }
    }

    /// Close the connection gracefully
    pub async fn close(&mut self) -> Result<(), FmpWebSocketError> {
        self.ws.close(None).await?;
        Ok(())
    }
}
