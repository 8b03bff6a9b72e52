//! JSON bodies exchanged between the sampler and the aggregator.

use serde::{Deserialize, Serialize};

use crate::stats::PingAck;

/// Body of `POST /ping`.
///
/// Every field is optional on the wire so a missing `clientId` can be
/// reported as a 400 with a message rather than a body rejection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingRequest {
    #[serde(default, alias = "client_id")]
    pub client_id: Option<String>,

    /// Sampler clock reading taken just before sending (ms).
    #[serde(default)]
    pub timestamp: Option<f64>,
}

/// Body of a successful `POST /ping` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PongResponse {
    pub status: String,
    pub client_id: String,
    pub server_timestamp: f64,
    /// Omitted when the ping carried no timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_timestamp: Option<f64>,
}

impl From<PingAck> for PongResponse {
    fn from(ack: PingAck) -> Self {
        Self {
            status: "pong".into(),
            client_id: ack.client_id,
            server_timestamp: ack.server_timestamp,
            client_timestamp: ack.client_timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_client_id_is_accepted() {
        let req: PingRequest =
            serde_json::from_str(r#"{"client_id":"abc","timestamp":12.5}"#).unwrap();
        assert_eq!(req.client_id.as_deref(), Some("abc"));
        assert_eq!(req.timestamp, Some(12.5));
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let req: PingRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req, PingRequest::default());
    }

    #[test]
    fn pong_omits_absent_client_timestamp() {
        let pong = PongResponse {
            status: "pong".into(),
            client_id: "abc".into(),
            server_timestamp: 10.0,
            client_timestamp: None,
        };
        let json = serde_json::to_value(&pong).unwrap();
        assert!(json.get("clientTimestamp").is_none());

        let back: PongResponse = serde_json::from_value(json).unwrap();
        assert_eq!(back.client_timestamp, None);
    }
}
