//! Wire types for the record API.
//!
//! # Design
//! Field names follow the API's camelCase JSON. These types are defined
//! independently of the mock-server crate; the integration tests catch any
//! drift between the two.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A record as returned by the remote source. `id` is assigned by the server
/// and never changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub current_time: String,
    #[serde(default)]
    pub is_deleted: bool,
}

/// Request payload for creating a record. The server assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecord {
    pub name: String,
    pub email: String,
    pub current_time: String,
}

/// Formats `at` the way the API stores `currentTime`: RFC 3339, millisecond
/// precision, `Z` suffix.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn record_uses_camel_case_keys() {
        let record = Record {
            id: 7,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            current_time: "2024-01-01T00:00:00Z".to_string(),
            is_deleted: true,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["currentTime"], "2024-01-01T00:00:00Z");
        assert_eq!(json["isDeleted"], true);
        assert!(json.get("current_time").is_none());
    }

    #[test]
    fn is_deleted_defaults_to_false_when_absent() {
        let record: Record = serde_json::from_str(
            r#"{"id":1,"name":"A","email":"a@x.com","currentTime":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(!record.is_deleted);
    }

    #[test]
    fn create_payload_has_no_id() {
        let input = CreateRecord {
            name: "Bob".to_string(),
            email: String::new(),
            current_time: "2024-01-01T00:00:00.000Z".to_string(),
        };
        let json = serde_json::to_value(&input).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["name"], "Bob");
    }

    #[test]
    fn timestamp_matches_iso_string_shape() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(timestamp(at), "2024-03-09T14:05:00.000Z");
    }
}
