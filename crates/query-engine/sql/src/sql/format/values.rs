//! Parameter values.

use query_engine_metadata::metadata::Value;

use crate::sql::ast::SqlValue;

/// The parameter a literal is sent as. Booleans are integers, dates are unix
/// seconds, and values SQLite has no class for are sent as text.
#[allow(clippy::cast_precision_loss)]
pub fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Char(c) => SqlValue::Text(c.to_string()),
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Guid(guid) => SqlValue::Text(guid.to_string()),
        Value::Enum { name, .. } => SqlValue::Text(name.clone()),
        Value::Single(_) | Value::Double(_) | Value::Decimal(_) => {
            value.as_f64().map_or(SqlValue::Null, SqlValue::Real)
        }
        Value::DateTime(date) => SqlValue::Real(date.timestamp_millis() as f64 / 1000.0),
        Value::DateTimeOffset(date) => SqlValue::Real(date.timestamp_millis() as f64 / 1000.0),
        Value::UInt64(v) => i64::try_from(*v).map_or(SqlValue::Real(*v as f64), SqlValue::Integer),
        Value::Byte(_)
        | Value::SByte(_)
        | Value::Int16(_)
        | Value::UInt16(_)
        | Value::Int32(_)
        | Value::UInt32(_)
        | Value::Int64(_) => value.as_i64().map_or(SqlValue::Null, SqlValue::Integer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_are_integers() {
        assert_eq!(to_sql_value(&Value::Bool(true)), SqlValue::Integer(1));
        assert_eq!(to_sql_value(&Value::Bool(false)), SqlValue::Integer(0));
    }

    #[test]
    fn wide_unsigned_values_become_reals() {
        assert_eq!(
            to_sql_value(&Value::UInt64(u64::MAX)),
            SqlValue::Real(u64::MAX as f64)
        );
        assert_eq!(to_sql_value(&Value::UInt64(7)), SqlValue::Integer(7));
    }

    #[test]
    fn characters_are_text() {
        assert_eq!(
            to_sql_value(&Value::Char('x')),
            SqlValue::Text("x".to_string())
        );
    }
}
