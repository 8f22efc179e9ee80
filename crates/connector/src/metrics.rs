//! Prometheus metrics for the capture pipeline
//!
//! Tracks message flow, storage outcomes, and connection liveness per feed.

use once_cell::sync::Lazy;
use prometheus::{
    register_gauge_vec, register_int_counter_vec, register_int_gauge_vec, Encoder, GaugeVec,
    IntCounterVec, IntGaugeVec, TextEncoder,
};

const LABEL_FEED: &str = "feed";
const LABEL_KIND: &str = "kind";

/// Total messages received per feed and message kind
static MESSAGES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "tickvault_messages_total",
        "Total feed messages received",
        &[LABEL_FEED, LABEL_KIND]
    )
    .expect("Failed to register messages_total metric")
});

/// Total records persisted per feed
static RECORDS_WRITTEN_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "tickvault_records_written_total",
        "Total trade records stored",
        &[LABEL_FEED]
    )
    .expect("Failed to register records_written_total metric")
});

/// Total absorbed write failures per feed
static WRITE_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "tickvault_write_failures_total",
        "Total storage write failures (absorbed, non-fatal)",
        &[LABEL_FEED]
    )
    .expect("Failed to register write_failures_total metric")
});

/// Feed connection status (1 = connected, 0 = disconnected)
static FEED_CONNECTED: Lazy<IntGaugeVec> = Lazy::new(|| {
    register_int_gauge_vec!(
        "tickvault_feed_connected",
        "Feed connection status (1=connected, 0=disconnected)",
        &[LABEL_FEED]
    )
    .expect("Failed to register feed_connected metric")
});

/// Last message timestamp (epoch seconds) per feed
static LAST_MESSAGE_TIMESTAMP: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "tickvault_last_message_timestamp",
        "Unix timestamp of last message processed per feed",
        &[LABEL_FEED]
    )
    .expect("Failed to register last_message_timestamp metric")
});

/// Handle for recording metrics for one pipeline instance
#[derive(Clone)]
pub struct PipelineMetrics {
    feed: String,
}

impl PipelineMetrics {
    pub fn new(feed: impl Into<String>) -> Self {
        Self { feed: feed.into() }
    }

    /// Increment message counter for a message kind ("trade" or "other")
    pub fn inc_message(&self, kind: &str) {
        MESSAGES_TOTAL.with_label_values(&[&self.feed, kind]).inc();
    }

    pub fn inc_record_written(&self) {
        RECORDS_WRITTEN_TOTAL.with_label_values(&[&self.feed]).inc();
    }

    pub fn inc_write_failure(&self) {
        WRITE_FAILURES_TOTAL.with_label_values(&[&self.feed]).inc();
    }

    pub fn set_connected(&self, connected: bool) {
        FEED_CONNECTED
            .with_label_values(&[&self.feed])
            .set(i64::from(connected));
    }

    pub fn set_last_message_timestamp(&self, epoch_secs: f64) {
        LAST_MESSAGE_TIMESTAMP
            .with_label_values(&[&self.feed])
            .set(epoch_secs);
    }

    /// Get stored record count (for stats logging)
    pub fn get_records_written(&self) -> u64 {
        RECORDS_WRITTEN_TOTAL
            .with_label_values(&[&self.feed])
            .get()
    }

    /// Get absorbed write failure count (for stats logging)
    pub fn get_write_failures(&self) -> u64 {
        WRITE_FAILURES_TOTAL.with_label_values(&[&self.feed]).get()
    }
}

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to encode metrics as UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_metrics() {
        let metrics = PipelineMetrics::new("metrics-test-feed");

        metrics.inc_message("trade");
        metrics.inc_message("other");
        metrics.inc_record_written();
        metrics.inc_write_failure();
        metrics.set_connected(true);
        metrics.set_last_message_timestamp(1690000000.0);

        assert_eq!(metrics.get_records_written(), 1);
        assert_eq!(metrics.get_write_failures(), 1);
    }

    #[test]
    fn test_encode_metrics() {
        let metrics = PipelineMetrics::new("encode-test-feed");
        metrics.inc_message("trade");

        let body = encode_metrics().unwrap();
        assert!(body.contains("tickvault_messages_total"));
    }
}
