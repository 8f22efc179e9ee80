//! FMP connector implementation
//!
//! Implements the tickvault Connector trait for the FMP crypto websocket:
//! connect, login, settle, subscribe, then forward parsed frames until the
//! transport drops.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::error::ConnectorError;
use crate::fmp::websocket::{FmpWebSocket, FmpWebSocketError};
use crate::message::RawMessage;
use crate::traits::Connector;

/// Default settle delay between the login and subscribe frames
pub const DEFAULT_LOGIN_SETTLE: Duration = Duration::from_secs(1);

/// FMP connector implementing the tickvault Connector trait
pub struct FmpConnector {
    api_key: String,
    ticker: String,
    /// Websocket URL override from feed config (None = use default constant)
    ws_url: Option<String>,
    insecure_transport: bool,
    login_settle: Duration,
    tx: Option<mpsc::Sender<RawMessage>>,
    rx: Option<mpsc::Receiver<RawMessage>>,
    /// Last websocket activity timestamp (epoch seconds)
    last_ws_activity_epoch_secs: Arc<AtomicU64>,
}

impl FmpConnector {
    /// Create a new FMP connector for one ticker
    pub fn new(api_key: impl Into<String>, ticker: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::channel(1000);
        Self {
            api_key: api_key.into(),
            ticker: ticker.into(),
            ws_url: None,
            insecure_transport: false,
            login_settle: DEFAULT_LOGIN_SETTLE,
            tx: Some(tx),
            rx: Some(rx),
            last_ws_activity_epoch_secs: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Override the endpoint and transport trust settings from feed config
    pub fn with_transport(mut self, ws_url: Option<String>, insecure_transport: bool) -> Self {
        self.ws_url = ws_url;
        self.insecure_transport = insecure_transport;
        self
    }

    /// Override the login settle delay
    pub fn with_login_settle(mut self, settle: Duration) -> Self {
        self.login_settle = settle;
        self
    }

    /// Spawn the websocket receiver task.
    ///
    /// Any transport error ends the task and drops the sender; the driver
    /// sees the channel close and treats the stream as fatally lost.
    fn spawn_receiver_task(
        mut ws: FmpWebSocket,
        tx: mpsc::Sender<RawMessage>,
        activity_tracker: Arc<AtomicU64>,
    ) {
        fn update_activity(tracker: &AtomicU64) {
            use std::time::{SystemTime, UNIX_EPOCH};
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            tracker.store(now, Ordering::SeqCst);
        }

        update_activity(&activity_tracker);

        tokio::spawn(async move {
            loop {
                match ws.recv().await {
                    Ok(raw) => {
                        update_activity(&activity_tracker);
                        if tx.send(raw).await.is_err() {
                            info!("Channel closed, stopping FMP receiver");
                            break;
                        }
                    }
                    Err(FmpWebSocketError::ConnectionClosed) => {
                        error!("FMP websocket connection closed");
                        break;
                    }
                    Err(e) => {
                        error!(error = %e, "FMP websocket error");
                        break;
                    }
                }
            }

            if let Err(e) = ws.close().await {
                error!(error = %e, "Error closing FMP websocket");
            }
        });
    }
}

#[async_trait]
impl Connector for FmpConnector {
    async fn connect(&mut self) -> Result<(), ConnectorError> {
        let tx = self.tx.take().ok_or_else(|| {
            ConnectorError::ConnectionFailed("connect() called twice".to_string())
        })?;

        let mut ws = FmpWebSocket::connect(self.ws_url.as_deref(), self.insecure_transport)
            .await
            .map_err(|e| ConnectorError::ConnectionFailed(e.to_string()))?;

        ws.login(&self.api_key)
            .await
            .map_err(|e| ConnectorError::AuthFailed(e.to_string()))?;

        // The feed sends no login ack; give it time to process the
        // credential before subscribing.
        tokio::time::sleep(self.login_settle).await;

        ws.subscribe(&self.ticker)
            .await
            .map_err(|e| ConnectorError::ConnectionFailed(format!("subscription: {}", e)))?;

        info!(ticker = %self.ticker, "FMP connector subscribed");

        Self::spawn_receiver_task(
            ws,
            tx,
            Arc::clone(&self.last_ws_activity_epoch_secs),
        );

        Ok(())
    }

    fn messages(&mut self) -> mpsc::Receiver<RawMessage> {
        self.rx
            .take()
            .expect("messages() called before connect() or called twice")
    }

    async fn close(&mut self) -> Result<(), ConnectorError> {
        // Drop the sender to signal the spawned task to stop
        self.tx = None;
        Ok(())
    }

    fn activity_handle(&self) -> Option<Arc<AtomicU64>> {
        Some(Arc::clone(&self.last_ws_activity_epoch_secs))
    }
}
