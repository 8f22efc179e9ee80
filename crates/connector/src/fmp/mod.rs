//! Financial Modeling Prep crypto feed
//!
//! Websocket client and connector for FMP's real-time crypto stream.
//! The feed authenticates with a bare API key sent in a login frame, then
//! streams one JSON object per market event after a subscribe frame.

pub mod config;
pub mod connector;
pub mod messages;
pub mod websocket;

pub use config::{ConfigError, FmpConfig};
pub use connector::FmpConnector;
pub use messages::{LoginCommand, SubscribeCommand};
pub use websocket::{FmpWebSocket, FmpWebSocketError, FMP_WS_URL};
