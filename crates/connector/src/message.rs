//! Raw feed message shape and provider field names.
//!
//! The feed delivers arbitrary JSON objects; no schema is enforced here.
//! Unrecognized keys are ignored downstream and missing keys fall back to
//! documented defaults, so the payload stays an untyped mapping.

use serde_json::{Map, Value};

/// One parsed feed frame: string keys to heterogeneous scalar values.
pub type RawMessage = Map<String, Value>;

/// Provider field names recognized on inbound frames.
pub mod fields {
    /// Instrument symbol. Its presence is the sole trade discriminator.
    pub const SYMBOL: &str = "s";
    /// Provider-supplied event time (unit as delivered, not reinterpreted)
    pub const TIMESTAMP: &str = "t";
    /// Venue identifier
    pub const EXCHANGE: &str = "e";
    /// Event classification string
    pub const TRADE_TYPE: &str = "type";
    /// Last traded price
    pub const LAST_PRICE: &str = "lp";
    /// Last traded size
    pub const LAST_SIZE: &str = "ls";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_message_tolerates_arbitrary_keys() {
        let raw: RawMessage =
            serde_json::from_str(r#"{"event":"heartbeat","unknown":[1,2,3]}"#).unwrap();
        assert!(raw.contains_key("event"));
        assert!(!raw.contains_key(fields::SYMBOL));
    }
}
