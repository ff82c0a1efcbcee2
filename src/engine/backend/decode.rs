use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use serde_json::Value;

use crate::engine::backend::encoding::canonical_text;
use crate::engine::backend::native_type::{NativeMapping, ValueEncoding};
use crate::engine::types::{Cell, ColumnType};
use crate::shared::time::parse_timestamp;

/// Decodes one JSON-encoded value into the cell its native type maps to.
///
/// Errors are plain messages; callers attach backend and column names.
pub fn decode_cell(value: &Value, mapping: NativeMapping) -> Result<Cell, String> {
    if value.is_null() {
        return Ok(Cell::Null);
    }
    match (mapping.column_type, mapping.encoding) {
        (ColumnType::Varchar, ValueEncoding::Nested) => Ok(Cell::Text(canonical_text(value))),
        (ColumnType::Varchar, ValueEncoding::Stringified) => match value {
            Value::String(s) => Ok(Cell::Text(s.clone())),
            Value::Number(n) => Ok(Cell::Text(n.to_string())),
            other => Err(format!("expected string or number, got {}", other)),
        },
        (ColumnType::Varchar, _) => match value {
            Value::String(s) => Ok(Cell::Text(s.clone())),
            other => Err(format!("expected string, got {}", other)),
        },
        (ColumnType::Boolean, _) => value
            .as_bool()
            .map(Cell::Boolean)
            .ok_or_else(|| format!("expected boolean, got {}", value)),
        (ColumnType::Integer, _) => value
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .map(Cell::Integer)
            .ok_or_else(|| format!("expected 32-bit integer, got {}", value)),
        (ColumnType::Bigint, _) => decode_long(value).map(Cell::Long),
        (ColumnType::Double, _) => decode_double(value).map(Cell::Double),
        (ColumnType::Real, _) => decode_double(value).map(|d| Cell::Float(d as f32)),
        (ColumnType::Varbinary, _) => match value {
            Value::String(s) => BASE64_STANDARD
                .decode(s)
                .map(Cell::Binary)
                .map_err(|e| format!("invalid base64: {}", e)),
            other => Err(format!("expected base64 string, got {}", other)),
        },
        (ColumnType::Timestamp, _) => match value {
            Value::String(s) => parse_timestamp(s)
                .map(Cell::Timestamp)
                .ok_or_else(|| format!("unrecognized timestamp '{}'", s)),
            other => Err(format!("expected timestamp string, got {}", other)),
        },
        (ColumnType::Unknown, _) => Err(format!("value {} in a column of unknown type", value)),
    }
}

fn decode_long(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| format!("expected 64-bit integer, got {}", n)),
        // Some gateways quote 64-bit values to keep them exact.
        Value::String(s) => s
            .parse::<i64>()
            .map_err(|_| format!("expected 64-bit integer, got '{}'", s)),
        other => Err(format!("expected 64-bit integer, got {}", other)),
    }
}

fn decode_double(value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("expected number, got {}", n)),
        Value::String(s) => match s.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            other => other
                .parse::<f64>()
                .map_err(|_| format!("expected number, got '{}'", other)),
        },
        other => Err(format!("expected number, got {}", other)),
    }
}
