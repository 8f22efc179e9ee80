//! tickvault-connector: Trade capture runtime components
//!
//! This crate provides the core components for subscribing to a streaming
//! market-data feed, normalizing trade events into canonical records, and
//! persisting each record as an individually-keyed object in durable storage.

pub mod error;
pub mod fmp;
pub mod message;
pub mod metrics;
pub mod record;
pub mod resolver;
pub mod runner;
pub mod server;
pub mod sink;
pub mod traits;

pub use error::{ConnectorError, ResolverError, WriterError};
pub use message::RawMessage;
pub use metrics::PipelineMetrics;
pub use record::{classify, MessageKind, TradeRecord};
pub use resolver::EnvResolver;
pub use runner::Runner;
pub use server::{create_router, run_server, ServerState};
pub use sink::{ObjectStoreWriter, WriteOutcome};
pub use traits::{Connector, KeyResolver, RecordWriter};
