//! Shared request-side types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::database::SqlValue;

#[derive(Debug, Error, PartialEq)]
pub enum BindError {
    #[error("Type '{kind}' not supported for field '{field}'")]
    UnsupportedType { field: &'static str, kind: &'static str },
}

/// One barcode scan as sent by the client.
///
/// Fields are kept loosely typed: whatever arrives is bound as-is and the
/// column constraints decide whether it is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    #[serde(default)]
    pub sequence: Value,
    #[serde(default)]
    pub text: Value,
    #[serde(default)]
    pub timestamp: Value,
}

impl ScanRecord {
    /// Read the three fields from an item of the `data` array. Non-object
    /// items yield a record of nulls.
    pub fn from_item(item: &Value) -> Self {
        let field = |name: &str| item.get(name).cloned().unwrap_or(Value::Null);
        Self {
            sequence: field("sequence"),
            text: field("text"),
            timestamp: field("timestamp"),
        }
    }

    /// Parameters for `(sequence, barcode_text, scan_timestamp)`, in that order
    pub fn params(&self) -> Result<Vec<SqlValue>, BindError> {
        Ok(vec![
            to_sql_value("sequence", &self.sequence)?,
            to_sql_value("text", &self.text)?,
            to_sql_value("timestamp", &self.timestamp)?,
        ])
    }
}

fn to_sql_value(field: &'static str, value: &Value) -> Result<SqlValue, BindError> {
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::Bool(b) => Ok(SqlValue::Integer(i64::from(*b))),
        Value::Number(n) => Ok(match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
        }),
        Value::String(s) => Ok(SqlValue::Text(s.clone())),
        Value::Array(_) => Err(BindError::UnsupportedType { field, kind: "array" }),
        Value::Object(_) => Err(BindError::UnsupportedType { field, kind: "object" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn binds_fields_positionally() {
        let record = ScanRecord::from_item(&json!({
            "sequence": 3,
            "text": "ABC123",
            "timestamp": "2024-01-01T00:00:00Z",
            "extra": "ignored"
        }));

        assert_eq!(
            record.params().unwrap(),
            vec![
                SqlValue::Integer(3),
                SqlValue::Text("ABC123".into()),
                SqlValue::Text("2024-01-01T00:00:00Z".into()),
            ]
        );
    }

    #[test]
    fn missing_fields_bind_null() {
        let record = ScanRecord::from_item(&json!({ "sequence": 1 }));
        let params = record.params().unwrap();
        assert_eq!(params[1], SqlValue::Null);
        assert_eq!(params[2], SqlValue::Null);

        let scalar = ScanRecord::from_item(&json!(42));
        assert_eq!(scalar, ScanRecord::default());
    }

    #[test]
    fn scalars_map_to_storage_classes() {
        let record = ScanRecord::from_item(&json!({
            "sequence": 2.5,
            "text": true,
            "timestamp": false
        }));
        assert_eq!(
            record.params().unwrap(),
            vec![SqlValue::Real(2.5), SqlValue::Integer(1), SqlValue::Integer(0)]
        );
    }

    #[test]
    fn nested_values_are_rejected() {
        let record = ScanRecord::from_item(&json!({ "sequence": 1, "text": {"raw": "x"} }));
        assert_eq!(
            record.params().unwrap_err(),
            BindError::UnsupportedType { field: "text", kind: "object" }
        );

        let record = ScanRecord::from_item(&json!({ "sequence": [1] }));
        assert!(record.params().unwrap_err().to_string().contains("'array'"));
    }
}
