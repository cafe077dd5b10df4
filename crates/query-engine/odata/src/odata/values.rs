//! OData literal syntax.

use chrono::SecondsFormat;
use query_engine_metadata::metadata::{ClrType, Value};

/// The OData text of a literal value.
pub fn format_literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Byte(v) => v.to_string(),
        Value::SByte(v) => v.to_string(),
        Value::Int16(v) => v.to_string(),
        Value::UInt16(v) => v.to_string(),
        Value::Int32(v) => v.to_string(),
        Value::UInt32(v) => format!("{v}L"),
        Value::Int64(v) => format!("{v}L"),
        Value::UInt64(v) => format!("{v}L"),
        Value::Single(v) => format!("{}f", format_float(*v, false)),
        Value::Double(v) => format_float(*v, true),
        Value::Decimal(v) => format!("{v}M"),
        Value::Char(c) => quote(&c.to_string()),
        Value::String(s) => quote(s),
        // Enums travel by member name, as the serializer writes them.
        Value::Enum { name, .. } => quote(name),
        Value::Guid(guid) => format!("guid'{guid}'"),
        Value::DateTime(date) => format!(
            "datetimeoffset'{}'",
            date.to_rfc3339_opts(SecondsFormat::Millis, true)
        ),
        Value::DateTimeOffset(date) => format!(
            "datetimeoffset'{}'",
            date.to_rfc3339_opts(SecondsFormat::Millis, true)
        ),
    }
}

/// Single quote a string, doubling the quotes inside it.
pub fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// The shortest text that reads back as the same value of its own width.
/// Doubles always carry a fractional part so they read back as doubles.
fn format_float<F: Into<f64> + ToString + Copy>(value: F, mark_fraction: bool) -> String {
    let wide: f64 = value.into();
    if wide.is_nan() {
        return "NaN".to_string();
    }
    if wide.is_infinite() {
        return if wide > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    let text = value.to_string();
    if mark_fraction && text.chars().all(|c| c.is_ascii_digit() || c == '-') {
        format!("{text}.0")
    } else {
        text
    }
}

/// The `Edm` type names accepted by `cast`.
const EDM_TYPES: &[(&str, ClrType)] = &[
    ("Edm.Boolean", ClrType::Bool),
    ("Edm.Byte", ClrType::Byte),
    ("Edm.SByte", ClrType::SByte),
    ("Edm.Int16", ClrType::Int16),
    ("Edm.Int32", ClrType::Int32),
    ("Edm.Int64", ClrType::Int64),
    ("Edm.Single", ClrType::Single),
    ("Edm.Double", ClrType::Double),
    ("Edm.Decimal", ClrType::Decimal),
    ("Edm.String", ClrType::String),
    ("Edm.Guid", ClrType::Guid),
    ("Edm.DateTimeOffset", ClrType::DateTimeOffset),
];

pub fn clr_type_for_edm(name: &str) -> Option<ClrType> {
    EDM_TYPES
        .iter()
        .find(|(edm, _)| *edm == name)
        .map(|(_, ty)| ty.clone())
}
