/// Data models for the credential store.
/// Represents user records, statistics entries, and the HTTP request/response bodies.
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A single quiz result recorded for a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatEntry {
    pub good_answers: u32,
    pub wrong_answers: u32,
    #[serde(rename = "timeStamp")]
    pub timestamp: String,
}

impl StatEntry {
    /// Build an entry, stamping it with the current UTC time when the caller
    /// did not supply a timestamp (blank strings count as missing).
    pub fn new(good_answers: u32, wrong_answers: u32, timestamp: Option<String>) -> Self {
        let timestamp = timestamp
            .filter(|ts| !ts.trim().is_empty())
            .unwrap_or_else(now_iso8601);

        StatEntry {
            good_answers,
            wrong_answers,
            timestamp,
        }
    }
}

/// Current UTC time as RFC 3339 with millisecond precision, e.g. `2026-10-17T08:30:00.123Z`
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub statistics: Vec<StatEntry>,
}

// Request/Response DTOs
//
// Request fields are optional so that a missing field is reported by the
// handler as a validation error instead of a deserialization failure.

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStatisticsRequest {
    pub user_name: Option<String>,
    pub good_answers: Option<u32>,
    pub wrong_answers: Option<u32>,
    pub time_stamp: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsQuery {
    pub user_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatisticsResponse {
    pub statistics: Vec<StatEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_stat_entry_keeps_supplied_timestamp() {
        let entry = StatEntry::new(5, 2, Some("2025-10-20T10:00:00Z".to_string()));

        assert_eq!(entry.good_answers, 5);
        assert_eq!(entry.wrong_answers, 2);
        assert_eq!(entry.timestamp, "2025-10-20T10:00:00Z");
    }

    #[test]
    fn test_stat_entry_generates_timestamp() {
        let entry = StatEntry::new(1, 0, None);
        assert!(DateTime::parse_from_rfc3339(&entry.timestamp).is_ok());
        assert!(entry.timestamp.ends_with('Z'));
    }

    #[test]
    fn test_blank_timestamp_is_replaced() {
        let entry = StatEntry::new(1, 0, Some("   ".to_string()));
        assert!(DateTime::parse_from_rfc3339(&entry.timestamp).is_ok());
    }

    #[test]
    fn test_stat_entry_wire_names() {
        let entry = StatEntry::new(5, 2, Some("2025-10-20T10:00:00Z".to_string()));
        let json = serde_json::to_value(&entry).expect("Serialization failed");

        assert_eq!(
            json,
            serde_json::json!({
                "goodAnswers": 5,
                "wrongAnswers": 2,
                "timeStamp": "2025-10-20T10:00:00Z"
            })
        );
    }

    #[test]
    fn test_save_statistics_request_optional_timestamp() {
        let request: SaveStatisticsRequest =
            serde_json::from_str(r#"{"userName":"alice","goodAnswers":5,"wrongAnswers":2}"#)
                .expect("Deserialization failed");

        assert_eq!(request.user_name.as_deref(), Some("alice"));
        assert_eq!(request.good_answers, Some(5));
        assert_eq!(request.wrong_answers, Some(2));
        assert!(request.time_stamp.is_none());
    }

    #[test]
    fn test_credentials_request_missing_password() {
        let request: CredentialsRequest =
            serde_json::from_str(r#"{"username":"bob"}"#).expect("Deserialization failed");

        assert_eq!(request.username.as_deref(), Some("bob"));
        assert!(request.password.is_none());
    }
}
