//! tickvault-metadata: Feed and environment configuration types

pub mod environment;
pub mod error;
pub mod feed;

pub use environment::{
    Environment, KeySpec, KeyType, StorageConfig, StorageType, SubscriptionConfig,
};
pub use error::MetadataError;
pub use feed::{AuthMethod, Feed, FeedStatus, FeedType, FeedVersion};
