//! End-to-end pipeline tests over a scripted connector and an in-memory
//! object store: every frame the feed would deliver flows through classify,
//! transform, and the sink exactly as in production, minus the socket.

use std::sync::Arc;

use async_trait::async_trait;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, ObjectStoreExt};
use tokio::sync::mpsc;

use tickvault_connector_lib::{
    Connector, ConnectorError, ObjectStoreWriter, RawMessage, RecordWriter, Runner, TradeRecord,
    WriteOutcome, WriterError,
};

/// Connector that replays a fixed set of frames, then hangs until shutdown.
struct ScriptedConnector {
    frames: Vec<RawMessage>,
    rx: Option<mpsc::Receiver<RawMessage>>,
    tx: Option<mpsc::Sender<RawMessage>>,
}

impl ScriptedConnector {
    fn new(frames: Vec<&str>) -> Self {
        let (tx, rx) = mpsc::channel(64);
        Self {
            frames: frames
                .into_iter()
                .map(|f| serde_json::from_str(f).unwrap())
                .collect(),
            rx: Some(rx),
            tx: Some(tx),
        }
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&mut self) -> Result<(), ConnectorError> {
        let tx = self.tx.take().unwrap();
        let frames = std::mem::take(&mut self.frames);
        tokio::spawn(async move {
            for frame in frames {
                if tx.send(frame).await.is_err() {
                    break;
                }
            }
            // Keep the sender alive so the runner waits for shutdown
            // instead of treating the script's end as a disconnect.
            std::future::pending::<()>().await;
        });
        Ok(())
    }

    fn messages(&mut self) -> mpsc::Receiver<RawMessage> {
        self.rx.take().unwrap()
    }

    async fn close(&mut self) -> Result<(), ConnectorError> {
        Ok(())
    }
}

async fn run_pipeline(
    frames: Vec<&str>,
    store: Arc<dyn ObjectStore>,
) -> Result<(), ConnectorError> {
    let connector = ScriptedConnector::new(frames);
    let writer = ObjectStoreWriter::new(store, "pipeline-test");
    let mut runner = Runner::new("fmp-crypto", connector, writer);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let handle = tokio::spawn(async move { runner.run(shutdown_rx).await });

    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap()
}

async fn stored_record(store: &Arc<dyn ObjectStore>, key: &str) -> TradeRecord {
    let bytes = store
        .get(&ObjectPath::from(key))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn stored_keys(store: &Arc<dyn ObjectStore>) -> Vec<String> {
    use futures_util::StreamExt;
    let mut keys = Vec::new();
    let mut listing = store.list(None);
    while let Some(meta) = listing.next().await {
        keys.push(meta.unwrap().location.to_string());
    }
    keys.sort();
    keys
}

#[tokio::test]
async fn test_trade_frame_lands_under_derived_key() {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());

    run_pipeline(
        vec![r#"{"s":"BTCUSD","t":1690000000,"e":"CRYPTO","type":"T","lp":29000.5,"ls":0.01}"#],
        Arc::clone(&store),
    )
    .await
    .unwrap();

    let record = stored_record(&store, "CRYPTO/BTCUSD_1690000000.json").await;
    assert_eq!(record.ticker, "BTCUSD");
    assert_eq!(record.timestamp, 1690000000);
    assert_eq!(record.exchange, "CRYPTO");
    assert_eq!(record.trade_type, "T");
    assert_eq!(record.last_price, 29000.5);
    assert_eq!(record.volume_traded, 0.01);
}

#[tokio::test]
async fn test_control_frames_store_nothing() {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());

    run_pipeline(
        vec![
            r#"{"event":"subscribed"}"#,
            r#"{"event":"login","status":200}"#,
            r#"{"event":"heartbeat"}"#,
        ],
        Arc::clone(&store),
    )
    .await
    .unwrap();

    assert!(stored_keys(&store).await.is_empty());
}

#[tokio::test]
async fn test_missing_fields_take_defaults() {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());

    run_pipeline(
        vec![r#"{"s":"BTCUSD","t":1690000000,"e":"CRYPTO","type":"T"}"#],
        Arc::clone(&store),
    )
    .await
    .unwrap();

    let record = stored_record(&store, "CRYPTO/BTCUSD_1690000000.json").await;
    assert_eq!(record.last_price, 0.0);
    assert_eq!(record.volume_traded, 0.0);
    assert_eq!(record.ticker, "BTCUSD");
}

#[tokio::test]
async fn test_colliding_trades_last_write_wins() {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());

    run_pipeline(
        vec![
            r#"{"s":"BTCUSD","t":1690000000,"e":"CRYPTO","type":"T","lp":29000.5,"ls":0.01}"#,
            r#"{"s":"BTCUSD","t":1690000000,"e":"CRYPTO","type":"T","lp":29111.0,"ls":0.02}"#,
        ],
        Arc::clone(&store),
    )
    .await
    .unwrap();

    let keys = stored_keys(&store).await;
    assert_eq!(keys, vec!["CRYPTO/BTCUSD_1690000000.json".to_string()]);

    let record = stored_record(&store, "CRYPTO/BTCUSD_1690000000.json").await;
    assert_eq!(record.last_price, 29111.0);
    assert_eq!(record.volume_traded, 0.02);
}

#[tokio::test]
async fn test_mixed_stream_stores_only_trades() {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());

    run_pipeline(
        vec![
            r#"{"event":"subscribed"}"#,
            r#"{"s":"BTCUSD","t":1,"e":"CRYPTO","type":"T","lp":10.0,"ls":1.0}"#,
            r#"{"event":"heartbeat"}"#,
            r#"{"s":"BTCUSD","t":2,"e":"CRYPTO","type":"T","lp":11.0,"ls":2.0}"#,
        ],
        Arc::clone(&store),
    )
    .await
    .unwrap();

    let keys = stored_keys(&store).await;
    assert_eq!(
        keys,
        vec![
            "CRYPTO/BTCUSD_1.json".to_string(),
            "CRYPTO/BTCUSD_2.json".to_string(),
        ]
    );
}

/// Sink that rejects the first put and accepts the rest.
struct FlakyWriter {
    inner: ObjectStoreWriter,
    rejected_first: bool,
}

#[async_trait]
impl RecordWriter for FlakyWriter {
    async fn write(&mut self, record: &TradeRecord) -> WriteOutcome {
        if !self.rejected_first {
            self.rejected_first = true;
            return WriteOutcome::Failed {
                key: record.storage_key(),
                reason: "simulated sink rejection".to_string(),
            };
        }
        self.inner.write(record).await
    }

    async fn close(&mut self) -> Result<(), WriterError> {
        self.inner.close().await
    }
}

#[tokio::test]
async fn test_rejected_write_does_not_stop_the_stream() {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());

    let connector = ScriptedConnector::new(vec![
        r#"{"s":"BTCUSD","t":1,"e":"CRYPTO","type":"T","lp":10.0,"ls":1.0}"#,
        r#"{"s":"BTCUSD","t":2,"e":"CRYPTO","type":"T","lp":11.0,"ls":2.0}"#,
    ]);
    let writer = FlakyWriter {
        inner: ObjectStoreWriter::new(Arc::clone(&store), "pipeline-test"),
        rejected_first: false,
    };
    let mut runner = Runner::new("fmp-crypto", connector, writer);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let handle = tokio::spawn(async move { runner.run(shutdown_rx).await });

    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap().unwrap();

    // First trade was rejected, second still landed.
    let keys = stored_keys(&store).await;
    assert_eq!(keys, vec!["CRYPTO/BTCUSD_2.json".to_string()]);
}
