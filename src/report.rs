// 🧾 Run Envelope - wraps any report with run id, timestamp and input fingerprints

use crate::table::Table;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one input table by content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputFingerprint {
    pub path: String,
    pub sha256: String,
    pub rows: usize,
}

impl InputFingerprint {
    pub fn of(path: impl Into<String>, table: &Table) -> Self {
        InputFingerprint {
            path: path.into(),
            sha256: table.fingerprint(),
            rows: table.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEnvelope<T> {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub inputs: Vec<InputFingerprint>,
    pub payload: T,
}

impl<T: Serialize> RunEnvelope<T> {
    pub fn new(inputs: Vec<InputFingerprint>, payload: T) -> Self {
        RunEnvelope {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            inputs,
            payload,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let table = Table::from_csv_reader("a,b\n1,2\n".as_bytes()).unwrap();
        let envelope = RunEnvelope::new(vec![InputFingerprint::of("in.csv", &table)], vec![1, 2, 3]);

        let json: serde_json::Value = serde_json::from_str(&envelope.to_json().unwrap()).unwrap();
        assert_eq!(json["inputs"][0]["path"], "in.csv");
        assert_eq!(json["inputs"][0]["rows"], 1);
        assert_eq!(json["inputs"][0]["sha256"].as_str().map(str::len), Some(64));
        assert_eq!(json["payload"], serde_json::json!([1, 2, 3]));
        assert!(json["run_id"].is_string());
    }

    #[test]
    fn test_run_ids_are_unique() {
        let a = RunEnvelope::new(Vec::new(), ());
        let b = RunEnvelope::new(Vec::new(), ());
        assert_ne!(a.run_id, b.run_id);
    }
}
