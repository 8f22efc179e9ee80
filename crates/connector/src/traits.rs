use async_trait::async_trait;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::{ConnectorError, ResolverError, WriterError};
use crate::message::RawMessage;
use crate::record::TradeRecord;
use crate::sink::WriteOutcome;

/// Connector trait for streaming feed sources.
///
/// `connect()` performs the full handshake (connection, authentication,
/// subscription); afterwards `messages()` hands out the receiving end of an
/// unbounded-until-disconnect sequence of parsed frames. The channel closing
/// means the underlying transport is gone; there is no automatic reconnect.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establish the connection and complete the subscription handshake
    async fn connect(&mut self) -> Result<(), ConnectorError>;

    /// Get receiver for incoming parsed frames
    fn messages(&mut self) -> mpsc::Receiver<RawMessage>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), ConnectorError>;

    /// Get handle to last transport activity timestamp (epoch seconds).
    /// Used for health checks - returns None if the connector doesn't track
    /// activity.
    fn activity_handle(&self) -> Option<Arc<AtomicU64>> {
        None
    }
}

/// Writer trait for durable record sinks.
///
/// One record, one write attempt. Failures come back as data
/// ([`WriteOutcome::Failed`]) rather than errors: a rejected record must
/// never stop the stream, so the caller logs the outcome and moves on.
#[async_trait]
pub trait RecordWriter: Send + Sync {
    /// Attempt exactly one write of the record under its derived key
    async fn write(&mut self, record: &TradeRecord) -> WriteOutcome;

    /// Close and flush the writer
    async fn close(&mut self) -> Result<(), WriterError>;
}

/// KeyResolver trait for credential sources (env vars, Vault, etc.)
pub trait KeyResolver: Send + Sync {
    /// Resolve a single credential from a source string (e.g., "env:VAR")
    fn resolve(&self, source: &str) -> Result<String, ResolverError>;
}
