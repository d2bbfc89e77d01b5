//! Conversions between `Value` and JSON text.
//!
//! Real, String, List, Hash and Nil map onto number, string, array, object
//! and null and survive a round trip. Error, Matrix and Any are written as
//! diagnostic strings and come back as plain Strings.

use std::sync::Arc;

use super::{ErrorCode, Hash, List, Value};


/// Convert a value into a `serde_json::Value`. Never fails; non-finite
/// reals become null.
pub fn value_to_json(val: &Value) -> serde_json::Value {
    match val {
        Value::Empty | Value::Nil => serde_json::Value::Null,
        Value::Real(r) => serde_json::Number::from_f64(*r)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.to_string()),
        Value::List(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
        Value::Hash(h) => {
            let mut obj = serde_json::Map::new();
            for (k, v) in h.iter() {
                obj.insert(k.to_string(), value_to_json(v));
            }
            serde_json::Value::Object(obj)
        }
        Value::Error(e) => serde_json::Value::String(e.to_string()),
        Value::Matrix(m) => serde_json::Value::String(m.to_string()),
        Value::Any => serde_json::Value::String("*".to_string()),
    }
}

/// Convert a JSON value. Booleans become 1.0 / 0.0.
pub fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Real(if *b { 1.0 } else { 0.0 }),
        serde_json::Value::Number(n) => n.as_f64().map(Value::Real).unwrap_or(Value::Nil),
        serde_json::Value::String(s) => Value::String(Arc::new(s.clone())),
        serde_json::Value::Array(arr) => {
            Value::list(arr.iter().map(json_to_value).collect::<List>())
        }
        serde_json::Value::Object(obj) => {
            let mut hash = Hash::new();
            for (k, v) in obj {
                hash.set(k.clone(), json_to_value(v));
            }
            Value::hash(hash)
        }
    }
}

impl Value {
    /// Serialize to JSON text.
    pub fn to_json(&self) -> String {
        value_to_json(self).to_string()
    }

    /// Parse one JSON document from the front of `text` into this value.
    ///
    /// Returns the number of bytes consumed, so a caller can keep parsing the
    /// rest of a larger buffer. On malformed input the value becomes a
    /// bad-request Error and 0 is returned.
    pub fn build_from_json(&mut self, text: &str) -> usize {
        let mut stream = serde_json::Deserializer::from_str(text).into_iter::<serde_json::Value>();
        match stream.next() {
            Some(Ok(json)) => {
                *self = json_to_value(&json);
                stream.byte_offset()
            }
            Some(Err(e)) => {
                self.set_error(ErrorCode::BadRequest, format!("invalid json: {}", e));
                0
            }
            None => {
                self.set_error(ErrorCode::BadRequest, "invalid json: empty input");
                0
            }
        }
    }

    /// Parse a whole JSON document into a new value.
    pub fn from_json(text: &str) -> Value {
        let mut v = Value::Nil;
        v.build_from_json(text);
        v
    }
}
