//! FMP websocket command frames
//!
//! Outbound frame shapes for the login/subscribe handshake. Inbound frames
//! have no fixed schema and stay untyped; see [`crate::message`].

use serde::Serialize;

/// Login frame: `{"event":"login","data":{"apiKey":"<key>"}}`
#[derive(Debug, Clone, Serialize)]
pub struct LoginCommand {
    pub event: &'static str,
    pub data: LoginData,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginData {
    #[serde(rename = "apiKey")]
    pub api_key: String,
}

impl LoginCommand {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            event: "login",
            data: LoginData {
                api_key: api_key.into(),
            },
        }
    }
}

/// Subscribe frame: `{"event":"subscribe","data":{"ticker":"<symbol>"}}`
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeCommand {
    pub event: &'static str,
    pub data: SubscribeData,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscribeData {
    pub ticker: String,
}

impl SubscribeCommand {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            event: "subscribe",
            data: SubscribeData {
                ticker: ticker.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_wire_shape() {
        let cmd = LoginCommand::new("my-key");
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(json, r#"{"event":"login","data":{"apiKey":"my-key"}}"#);
    }

    #[test]
    fn test_subscribe_wire_shape() {
        let cmd = SubscribeCommand::new("btcusd");
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(json, r#"{"event":"subscribe","data":{"ticker":"btcusd"}}"#);
    }
}
