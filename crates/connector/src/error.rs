use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("authentication failed: {0}")]
    AuthFailed(String),
    #[error("disconnected: {0}")]
    Disconnected(String),
}

/// Errors from constructing or tearing down a sink.
///
/// Per-record write failures are not errors at this level; they surface as
/// [`crate::sink::WriteOutcome::Failed`] so the stream keeps flowing.
#[derive(Error, Debug)]
pub enum WriterError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("unsupported storage configuration: {0}")]
    UnsupportedStorage(String),
}

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("unsupported source: {0}")]
    UnsupportedSource(String),
    #[error("missing key: {0}")]
    MissingKey(String),
}
