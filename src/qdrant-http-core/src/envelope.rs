use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::ops::{Deref, DerefMut};

/// Status value the server reports for a successful operation
pub const STATUS_OK: &str = "ok";

/// Envelope wrapping every JSON response: `{time, status, result}`.
///
/// A 2xx HTTP status says the request was accepted; `status` says whether the
/// operation itself succeeded. Check both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Server-side processing time in seconds
    #[serde(default)]
    pub time: f64,
    pub status: String,
    pub result: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// The envelope arrived but its status was not `ok`
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("server reported status {status:?}")]
pub struct EnvelopeStatusError {
    pub status: String,
    pub time: f64,
}

impl<T> Envelope<T> {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Unwrap the payload, failing when the server status is not `ok`
    pub fn into_result(self) -> Result<T, EnvelopeStatusError> {
        if self.is_ok() {
            Ok(self.result)
        } else {
            Err(EnvelopeStatusError {
                status: self.status,
                time: self.time,
            })
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            time: self.time,
            status: self.status,
            result: f(self.result),
            usage: self.usage,
        }
    }
}

/// Open-ended JSON object for fields whose shape the server does not fix
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonMap(BTreeMap<String, serde_json::Value>);

impl JsonMap {
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }
}

impl Deref for JsonMap {
    type Target = BTreeMap<String, serde_json::Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for JsonMap {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Resource accounting attached to some responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub hardware: Option<HardwareUsage>,
    #[serde(default)]
    pub inference: Option<InferenceUsage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareUsage {
    #[serde(default)]
    pub cpu: u64,
    #[serde(default)]
    pub payload_io_read: u64,
    #[serde(default)]
    pub payload_io_write: u64,
    #[serde(default)]
    pub payload_index_io_read: u64,
    #[serde(default)]
    pub payload_index_io_write: u64,
    #[serde(default)]
    pub vector_io_read: u64,
    #[serde(default)]
    pub vector_io_write: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceUsage {
    #[serde(default)]
    pub models: HashMap<String, JsonMap>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_into_result() {
        let env: Envelope<bool> =
            serde_json::from_str(r#"{"time": 0.002, "status": "ok", "result": true}"#).unwrap();
        assert!(env.is_ok());
        assert!(env.usage.is_none());
        assert!(env.into_result().unwrap());
    }

    #[test]
    fn test_non_ok_status_is_failure() {
        let env: Envelope<bool> =
            serde_json::from_str(r#"{"time": 0.5, "status": "accepted", "result": false}"#)
                .unwrap();
        assert!(!env.is_ok());

        let err = env.into_result().unwrap_err();
        assert_eq!(err.status, "accepted");
        assert_eq!(err.time, 0.5);
    }

    #[test]
    fn test_usage_is_decoded() {
        let env: Envelope<serde_json::Value> = serde_json::from_str(
            r#"{
                "time": 0.1,
                "status": "ok",
                "result": null,
                "usage": {
                    "hardware": {"cpu": 3, "vector_io_read": 12},
                    "inference": {"models": {"bm25": {"tokens": 40}}}
                }
            }"#,
        )
        .unwrap();

        let usage = env.usage.unwrap();
        let hardware = usage.hardware.unwrap();
        assert_eq!(hardware.cpu, 3);
        assert_eq!(hardware.vector_io_read, 12);
        assert_eq!(hardware.payload_io_write, 0);

        let models = usage.inference.unwrap().models;
        assert_eq!(models["bm25"]["tokens"], 40);
    }

    #[test]
    fn test_json_map_is_transparent() {
        let map: JsonMap =
            serde_json::from_str(r#"{"consensus_thread_status": "working", "term": 7}"#).unwrap();
        assert_eq!(map.get_str("consensus_thread_status"), Some("working"));
        assert_eq!(map.get("term"), Some(&serde_json::json!(7)));
        assert_eq!(
            serde_json::to_value(&map).unwrap(),
            serde_json::json!({"consensus_thread_status": "working", "term": 7})
        );
    }

    #[test]
    fn test_map_keeps_metadata() {
        let env = Envelope {
            time: 1.5,
            status: "ok".to_string(),
            result: vec![1, 2, 3],
            usage: None,
        };
        let mapped = env.map(|v| v.len());
        assert_eq!(mapped.result, 3);
        assert_eq!(mapped.time, 1.5);
        assert!(mapped.is_ok());
    }
}
