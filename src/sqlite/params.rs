use rusqlite::types::Value;

use crate::quoting::{LiteralQuoter, quote_blob, quote_text};
use crate::types::SqlValue;

/// Convert a single `SqlValue` to a rusqlite `Value`.
///
/// Booleans become 1/0, timestamps `%F %T%.f` text, JSON its serialized text.
#[must_use]
pub fn to_sqlite_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Int(i) => Value::Integer(*i),
        SqlValue::Float(f) => Value::Real(*f),
        SqlValue::Text(s) => Value::Text(s.clone()),
        SqlValue::Bool(b) => Value::Integer(i64::from(*b)),
        SqlValue::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        SqlValue::Null => Value::Null,
        SqlValue::JSON(json) => Value::Text(json.to_string()),
        SqlValue::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}

/// `SQLite` literal rendering, used when sequences are inlined.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteLiteralQuoter;

impl LiteralQuoter for SqliteLiteralQuoter {
    fn quote_literal(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Int(i) => i.to_string(),
            // Debug keeps the fraction, so 1.0 stays a REAL.
            SqlValue::Float(f) if f.is_finite() => format!("{f:?}"),
            SqlValue::Float(f) => quote_text(&f.to_string()),
            SqlValue::Text(s) => quote_text(s),
            SqlValue::Bool(b) => i64::from(*b).to_string(),
            SqlValue::Timestamp(dt) => quote_text(&dt.format("%F %T%.f").to_string()),
            SqlValue::Null => "NULL".to_string(),
            SqlValue::JSON(json) => quote_text(&json.to_string()),
            SqlValue::Blob(bytes) => quote_blob(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn literals() {
        let q = SqliteLiteralQuoter;
        assert_eq!(q.quote_literal(&SqlValue::Int(-4)), "-4");
        assert_eq!(q.quote_literal(&SqlValue::Float(1.5)), "1.5");
        assert_eq!(q.quote_literal(&SqlValue::Float(2.0)), "2.0");
        assert_eq!(q.quote_literal(&SqlValue::from("it's")), "'it''s'");
        assert_eq!(q.quote_literal(&SqlValue::Bool(true)), "1");
        assert_eq!(q.quote_literal(&SqlValue::Null), "NULL");
        assert_eq!(q.quote_literal(&SqlValue::Blob(vec![0xde, 0xad])), "X'dead'");

        let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(q.quote_literal(&SqlValue::Timestamp(dt)), "'2024-03-01 12:30:00'");
    }

    #[test]
    fn bound_values() {
        assert_eq!(to_sqlite_value(&SqlValue::Bool(false)), Value::Integer(0));
        assert_eq!(
            to_sqlite_value(&SqlValue::JSON(serde_json::json!({"a": 1}))),
            Value::Text(r#"{"a":1}"#.to_string())
        );
    }
}
