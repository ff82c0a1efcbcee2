use serde_json::{Map, Value};

/// Canonical text of a nested value: compact JSON, object keys sorted,
/// control characters escaped (`{"\u0000":-2147483648,"a":0}`).
///
/// Arrays keep their element order; a set arrives already ordered by the
/// backend and is encoded like a list.
pub fn canonical_text(value: &Value) -> String {
    canonicalize(value).to_string()
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::with_capacity(map.len());
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
