use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::MetadataError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FeedType {
    Websocket,
    Rest,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FeedStatus {
    #[default]
    Active,
    Deprecated,
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    ApiKey,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedVersion {
    pub version: String,
    pub effective_from: String,
    pub effective_to: Option<String>,
    pub protocol: String,
    pub endpoint: String,
    pub auth_method: Option<AuthMethod>,
    /// Skip certificate validation on the feed transport. The upstream
    /// provider's certificate setup requires this in some environments;
    /// it is an auditable trust exception, never an implicit default.
    #[serde(default)]
    pub insecure_transport: bool,
    /// Delay between the login and subscribe frames. The feed processes
    /// logins asynchronously and sends no acknowledgment to wait for.
    #[serde(default = "default_login_settle_ms")]
    pub login_settle_ms: u64,
}

fn default_login_settle_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    pub name: String,
    pub display_name: Option<String>,
    #[serde(rename = "type")]
    pub feed_type: FeedType,
    #[serde(default)]
    pub status: Option<FeedStatus>,
    pub versions: Vec<FeedVersion>,
}

impl Feed {
    pub fn load(path: &Path) -> Result<Self, MetadataError> {
        let content = std::fs::read_to_string(path)?;
        let feed: Feed = serde_yaml::from_str(&content)?;
        Ok(feed)
    }

    /// Get the version effective for a given date
    pub fn get_version_for_date(&self, date: NaiveDate) -> Option<&FeedVersion> {
        let date_str = date.format("%Y-%m-%d").to_string();

        let mut versions: Vec<_> = self.versions.iter().collect();
        versions.sort_by(|a, b| b.effective_from.cmp(&a.effective_from));

        for v in versions {
            if v.effective_from <= date_str {
                if let Some(ref to) = v.effective_to {
                    if to >= &date_str {
                        return Some(v);
                    }
                } else {
                    return Some(v);
                }
            }
        }
        None
    }

    /// Get the most recent version
    pub fn get_latest_version(&self) -> Option<&FeedVersion> {
        self.versions
            .iter()
            .max_by(|a, b| a.effective_from.cmp(&b.effective_from))
    }
}
