use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::MetadataError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    ApiKey,
    Storage,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    Local,
    S3,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeySpec {
    #[serde(rename = "type")]
    pub key_type: KeyType,
    pub description: Option<String>,
    pub required: Option<bool>,
    /// Where to resolve the credential from (e.g., "env:FMP_API_KEY")
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(rename = "type")]
    pub storage_type: StorageType,
    /// Base directory for local storage
    pub path: Option<String>,
    /// Bucket name for S3 storage
    pub bucket: Option<String>,
    /// Region override for S3 storage
    pub region: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionConfig {
    /// Instrument symbol to subscribe to on the feed
    pub ticker: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    pub feed: String,
    pub keys: Option<HashMap<String, KeySpec>>,
    pub subscription: SubscriptionConfig,
    pub storage: StorageConfig,
}

impl Environment {
    pub fn load(path: &Path) -> Result<Self, MetadataError> {
        let content = std::fs::read_to_string(path)?;
        let env: Environment = serde_yaml::from_str(&content)?;
        Ok(env)
    }

    /// Check that the storage section carries what its backend needs.
    pub fn validate(&self) -> Result<(), MetadataError> {
        match self.storage.storage_type {
            StorageType::S3 if self.storage.bucket.is_none() => Err(MetadataError::Invalid(
                "s3 storage requires a bucket".to_string(),
            )),
            StorageType::Local if self.storage.path.is_none() => Err(MetadataError::Invalid(
                "local storage requires a path".to_string(),
            )),
            _ => {
                if self.subscription.ticker.trim().is_empty() {
                    return Err(MetadataError::Invalid(
                        "subscription.ticker must not be empty".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}
