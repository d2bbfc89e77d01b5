//! Common meta-type values.
//!
//! A meta-type is Nil (unknown), a String (description only) or a List whose
//! first element is a sample of the accepted value. `Any` in the sample slot
//! means the node accepts anything.

use crate::value::{List, Value};


/// Accepts and returns a real.
pub fn real_io() -> Value {
    sample(Value::real(0.0))
}

/// Accepts and returns a string.
pub fn string_io() -> Value {
    sample(Value::string(""))
}

/// Accepts and returns a hash.
pub fn hash_io() -> Value {
    sample(Value::hash(Default::default()))
}

/// Accepts anything.
pub fn any_io() -> Value {
    sample(Value::any())
}

/// Accepts a list shaped like `tag`, e.g. `"ff"` for a pair of reals.
pub fn list_io(tag: &str) -> Value {
    sample(Value::list(List::from_type_tag(tag)))
}

/// Sample taken from an existing value.
pub fn like(value: &Value) -> Value {
    sample(value.clone().or_nil())
}

/// Description only; no accepted value type.
pub fn info_only(text: &str) -> Value {
    Value::string(text)
}

fn sample(value: Value) -> Value {
    Value::list_of(vec![value])
}
