//! Pipeline driver
//!
//! Pulls each raw frame from the connector, gates on the trade classifier,
//! transforms qualifying frames into canonical records, and hands each one
//! to the sink. Sink failures are logged and absorbed; losing the feed is
//! fatal and propagates to the process boundary.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::select;
use tracing::{error, info};

use crate::error::ConnectorError;
use crate::message::RawMessage;
use crate::metrics::PipelineMetrics;
use crate::record::{classify, MessageKind, TradeRecord};
use crate::sink::WriteOutcome;
use crate::traits::{Connector, RecordWriter};

/// Runner orchestrates the capture pipeline
pub struct Runner<C: Connector, W: RecordWriter> {
    feed_name: String,
    connector: C,
    writer: W,
    metrics: PipelineMetrics,
    connected: Arc<AtomicBool>,
    /// Unix timestamp (seconds) of last message processed
    last_message_epoch_secs: Arc<AtomicU64>,
}

impl<C: Connector, W: RecordWriter> Runner<C, W> {
    pub fn new(feed_name: impl Into<String>, connector: C, writer: W) -> Self {
        let feed_name = feed_name.into();
        let metrics = PipelineMetrics::new(&feed_name);
        Self {
            feed_name,
            connector,
            writer,
            metrics,
            connected: Arc::new(AtomicBool::new(false)),
            last_message_epoch_secs: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns whether the connector is currently connected
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Returns a handle to the connected status
    pub fn connected_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.connected)
    }

    /// Returns a handle to the last message timestamp
    pub fn last_message_handle(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.last_message_epoch_secs)
    }

    /// Returns the connector's activity handle if available, falling back
    /// to the runner's last-message timestamp. Used for health staleness.
    pub fn activity_handle(&self) -> Arc<AtomicU64> {
        self.connector
            .activity_handle()
            .unwrap_or_else(|| Arc::clone(&self.last_message_epoch_secs))
    }

    fn update_last_message_time(&self) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.last_message_epoch_secs.store(now, Ordering::SeqCst);
        self.metrics.set_last_message_timestamp(now as f64);
    }

    /// Run the capture pipeline until cancelled or disconnected
    pub async fn run(
        &mut self,
        shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> Result<(), ConnectorError> {
        self.connector.connect().await?;
        self.connected.store(true, Ordering::SeqCst);
        self.metrics.set_connected(true);
        info!(feed = %self.feed_name, "Connected to data source");

        let mut rx = self.connector.messages();
        let mut shutdown = shutdown;

        loop {
            select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Shutdown signal received");
                        break;
                    }
                }
                msg = rx.recv() => {
                    match msg {
                        Some(raw) => {
                            self.process(&raw).await;
                            self.update_last_message_time();
                        }
                        None => {
                            // Channel closed - the transport is gone. This
                            // breaks the live-feed invariant, so it is fatal;
                            // the supervisor owns restarts.
                            self.connected.store(false, Ordering::SeqCst);
                            self.metrics.set_connected(false);
                            error!("Feed stream ended unexpectedly");
                            return Err(ConnectorError::Disconnected(
                                "message channel closed".to_string(),
                            ));
                        }
                    }
                }
            }
        }

        // Cleanup
        self.connected.store(false, Ordering::SeqCst);
        self.metrics.set_connected(false);
        self.writer.close().await.ok();
        self.connector.close().await?;

        Ok(())
    }

    /// Handle one frame: trades are transformed and written, everything
    /// else is surfaced for observability only.
    async fn process(&mut self, raw: &RawMessage) {
        match classify(raw) {
            MessageKind::Trade => {
                self.metrics.inc_message("trade");
                let record = TradeRecord::from_raw(raw);

                match self.writer.write(&record).await {
                    WriteOutcome::Written { key } => {
                        self.metrics.inc_record_written();
                        info!(key = %key, "Record stored");
                    }
                    WriteOutcome::Failed { key, reason } => {
                        self.metrics.inc_write_failure();
                        error!(key = %key, reason = %reason, "Failed to store record");
                    }
                }
            }
            MessageKind::Other => {
                self.metrics.inc_message("other");
                match serde_json::to_string(raw) {
                    Ok(text) => info!(message = %text, "Non-trade feed message"),
                    Err(_) => info!("Non-trade feed message"),
                }
            }
        }
    }
}
