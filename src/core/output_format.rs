//! Wire formats for log records
//!
//! Every sink carries one of these:
//! - Full: the whole record, metadata fields flattened into the JSON object
//! - Projected: only timestamp, level, message, path and statusCode, used for
//!   the high-volume tier to keep payloads small

use super::record::LogRecord;
use serde_json::{Map, Value};

/// Keys owned by the record itself; metadata cannot override them
const RESERVED_KEYS: [&str; 5] = ["timestamp", "level", "message", "path", "statusCode"];

/// Output format for log records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Entire record
    ///
    /// Example: `{"timestamp":"2025-01-08T10:30:45.000Z","level":"info","message":"Request processed","component":"AppService"}`
    #[default]
    Full,

    /// Fixed field projection, absent optionals as `null`
    ///
    /// Example: `{"timestamp":"2025-01-08T10:30:45.000Z","level":"debug","message":"x","path":null,"statusCode":null}`
    Projected,
}

impl OutputFormat {
    /// Format a record according to this output format
    ///
    /// Never fails: every value in a record is representable as JSON.
    pub fn format(&self, record: &LogRecord) -> String {
        let object = match self {
            OutputFormat::Full => Self::full_object(record),
            OutputFormat::Projected => Self::projected_object(record),
        };
        Value::Object(object).to_string()
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Full => "full",
            OutputFormat::Projected => "projected",
        }
    }

    fn full_object(record: &LogRecord) -> Map<String, Value> {
        let mut json_obj = Self::head(record);

        for (key, value) in record.metadata.fields() {
            if !RESERVED_KEYS.contains(&key.as_str()) {
                json_obj.insert(key.clone(), value.clone());
            }
        }

        if let Some(ref path) = record.path {
            json_obj.insert("path".to_string(), Value::String(path.clone()));
        }
        if let Some(status) = record.status_code {
            json_obj.insert("statusCode".to_string(), Value::Number(status.into()));
        }

        json_obj
    }

    fn projected_object(record: &LogRecord) -> Map<String, Value> {
        let mut json_obj = Self::head(record);

        json_obj.insert(
            "path".to_string(),
            record.path.clone().map(Value::String).unwrap_or(Value::Null),
        );
        json_obj.insert(
            "statusCode".to_string(),
            record
                .status_code
                .map(|status| Value::Number(status.into()))
                .unwrap_or(Value::Null),
        );

        json_obj
    }

    fn head(record: &LogRecord) -> Map<String, Value> {
        let mut json_obj = Map::new();
        json_obj.insert("timestamp".to_string(), Value::String(record.iso_timestamp()));
        json_obj.insert(
            "level".to_string(),
            Value::String(record.level.name().to_string()),
        );
        json_obj.insert("message".to_string(), Value::String(record.message.clone()));
        json_obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Level, LogContext};
    use serde_json::json;

    fn sample_record() -> LogRecord {
        LogRecord::new(Level::INFO, "estas por obtener un Hello world").with_metadata(
            LogContext::new()
                .with_field("class", "AppService")
                .with_field("method", "get_hello"),
        )
    }

    #[test]
    fn test_full_includes_metadata() {
        let output = OutputFormat::Full.format(&sample_record());
        let parsed: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["level"], "info");
        assert_eq!(parsed["message"], "estas por obtener un Hello world");
        assert_eq!(parsed["class"], "AppService");
        assert_eq!(parsed["method"], "get_hello");
        assert!(parsed.get("path").is_none());
        assert!(parsed.get("statusCode").is_none());
    }

    #[test]
    fn test_full_field_order() {
        let output = OutputFormat::Full.format(&sample_record().with_path("/hello"));
        let parsed: Map<String, Value> = serde_json::from_str(&output).unwrap();
        let keys: Vec<_> = parsed.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["timestamp", "level", "message", "class", "method", "path"]
        );
    }

    #[test]
    fn test_metadata_cannot_override_record_fields() {
        let record = LogRecord::new(Level::ERROR, "real")
            .with_metadata(LogContext::new().with_field("message", "fake").with_field("level", "debug"));
        let parsed: Value = serde_json::from_str(&OutputFormat::Full.format(&record)).unwrap();
        assert_eq!(parsed["message"], "real");
        assert_eq!(parsed["level"], "error");
    }

    #[test]
    fn test_projected_drops_metadata() {
        let record = sample_record().with_path("/throw").with_status_code(400);
        let parsed: Map<String, Value> =
            serde_json::from_str(&OutputFormat::Projected.format(&record)).unwrap();

        let keys: Vec<_> = parsed.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["timestamp", "level", "message", "path", "statusCode"]);
        assert_eq!(parsed["path"], json!("/throw"));
        assert_eq!(parsed["statusCode"], json!(400));
    }

    #[test]
    fn test_projected_absent_fields_are_null() {
        let parsed: Value =
            serde_json::from_str(&OutputFormat::Projected.format(&sample_record())).unwrap();
        assert!(parsed["path"].is_null());
        assert!(parsed["statusCode"].is_null());
        assert!(parsed.get("class").is_none());
    }
}
