//! Canonical trade records and the trade/other dispatch gate.

use serde::{Deserialize, Serialize};

use crate::message::{fields, RawMessage};

/// Classification of one inbound feed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Carries the instrument symbol field; normalized and persisted.
    Trade,
    /// Status/control traffic (login results, heartbeats); logged only.
    Other,
}

/// Classify a raw frame by presence of the provider symbol field.
///
/// This is the only dispatch logic in the pipeline: there is no message-type
/// taxonomy upstream, just trade frames and everything else.
pub fn classify(raw: &RawMessage) -> MessageKind {
    if raw.contains_key(fields::SYMBOL) {
        MessageKind::Trade
    } else {
        MessageKind::Other
    }
}

/// The normalized per-trade record persisted to the sink.
///
/// Always fully populated: absent upstream fields take the documented
/// defaults. Constructed once per trade frame, serialized, and discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub ticker: String,
    pub timestamp: i64,
    pub exchange: String,
    pub trade_type: String,
    pub last_price: f64,
    pub volume_traded: f64,
}

impl TradeRecord {
    /// Build a record from a raw frame. Total: never fails, whatever keys
    /// are present or missing. Callers gate on [`classify`] first; this
    /// function does not check message kind itself.
    pub fn from_raw(raw: &RawMessage) -> Self {
        Self {
            ticker: string_field(raw, fields::SYMBOL),
            timestamp: raw
                .get(fields::TIMESTAMP)
                .and_then(|v| v.as_i64())
                .unwrap_or(0),
            exchange: string_field(raw, fields::EXCHANGE),
            trade_type: string_field(raw, fields::TRADE_TYPE),
            last_price: numeric_field(raw, fields::LAST_PRICE),
            volume_traded: numeric_field(raw, fields::LAST_SIZE),
        }
    }

    /// Derive the storage key: `{exchange}/{ticker}_{timestamp}.json`.
    ///
    /// Pure function of the exchange/ticker/timestamp triple. Records
    /// sharing all three collide, and the later write replaces the earlier
    /// object; the sink has no versioning or compare-and-swap.
    pub fn storage_key(&self) -> String {
        format!("{}/{}_{}.json", self.exchange, self.ticker, self.timestamp)
    }
}

fn string_field(raw: &RawMessage, key: &str) -> String {
    raw.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn numeric_field(raw: &RawMessage, key: &str) -> f64 {
    raw.get(key).and_then(|v| v.as_f64()).unwrap_or(0.0)
}
