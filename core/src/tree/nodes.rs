//! Stock node behaviors.
//!
//! - `Container` groups children; reads collect them into a Hash and Hash
//!   writes fan out to them.
//! - `Parameter` holds a typed value and rejects writes of another type.
//! - `Placeholder` holds whatever it is given and grows children on demand.
//! - `ErrorSink` swallows errors routed to it and logs them.
//! - `Native` wraps a closure.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use super::object::{Object, ObjectOptions, Trigger};
use super::signature;
use crate::value::{Error, Value};


/// Url the error sink is mounted at unless configured otherwise.
pub const DEFAULT_ERROR_SINK: &str = "/.error";


// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Container;

impl Container {
    pub fn object(name: &str, info: &str) -> Arc<Object> {
        Object::with_options(name, ObjectOptions::new(signature::hash_io()).info(info), Container)
    }
}

impl Trigger for Container {
    fn trigger(&self, object: &Object, value: &Value) -> Value {
        match value {
            Value::Nil => object.to_hash(),
            Value::Hash(_) => object.from_hash(value),
            other => Error::bad_request(format!(
                "{} expects a hash (found '{}')",
                object.url(),
                other.type_tag()
            ))
            .into(),
        }
    }

    fn kind(&self) -> &'static str {
        "Object.Container"
    }
}


// ---------------------------------------------------------------------------
// Parameter
// ---------------------------------------------------------------------------

/// A typed value. Writes must match the type of the current value; a Nil
/// initial value accepts the first write of any type.
#[derive(Debug, Default)]
pub struct Parameter {
    value: RwLock<Value>,
}

impl Parameter {
    pub fn new(initial: Value) -> Self {
        Parameter {
            value: RwLock::new(initial.or_nil()),
        }
    }

    /// Meta-type for a parameter starting at `initial`; untyped when Nil.
    pub fn signature_for(initial: &Value) -> Value {
        if initial.is_nil() || initial.is_empty() {
            signature::any_io()
        } else {
            signature::like(initial)
        }
    }

    /// Node whose meta-type sample is the initial value.
    pub fn object(name: &str, initial: Value, info: &str) -> Arc<Object> {
        let options = ObjectOptions::new(Parameter::signature_for(&initial)).info(info);
        Object::with_options(name, options, Parameter::new(initial))
    }
}

impl Trigger for Parameter {
    fn trigger(&self, object: &Object, value: &Value) -> Value {
        if value.is_nil() {
            return self.value.read().clone();
        }
        let mut current = self.value.write();
        if !current.is_nil() && current.type_id() != value.type_id() {
            return Error::bad_request(format!(
                "{} expects '{}' (found '{}')",
                object.url(),
                current.type_tag(),
                value.type_tag()
            ))
            .into();
        }
        *current = value.clone();
        current.clone()
    }

    fn kind(&self) -> &'static str {
        "Object.Parameter"
    }
}


// ---------------------------------------------------------------------------
// Placeholder
// ---------------------------------------------------------------------------

/// Untyped storage used for lazily built paths.
#[derive(Debug, Default)]
pub struct Placeholder {
    value: RwLock<Value>,
}

impl Placeholder {
    pub fn object(name: &str) -> Arc<Object> {
        Object::new(name, Placeholder::default())
    }
}

impl Trigger for Placeholder {
    fn trigger(&self, _object: &Object, value: &Value) -> Value {
        if value.is_nil() {
            return self.value.read().clone().or_nil();
        }
        *self.value.write() = value.clone();
        value.clone()
    }

    fn build_child(&self, _object: &Arc<Object>, name: &str) -> Option<Arc<Object>> {
        Some(Placeholder::object(name))
    }

    fn kind(&self) -> &'static str {
        "Object.Placeholder"
    }
}


// ---------------------------------------------------------------------------
// ErrorSink
// ---------------------------------------------------------------------------

/// Receives errors nobody else handled. Reading it returns the last value
/// received.
#[derive(Debug, Default)]
pub struct ErrorSink {
    last: RwLock<Value>,
}

impl ErrorSink {
    pub fn object(name: &str) -> Arc<Object> {
        let options = ObjectOptions::new(signature::any_io())
            .info("Errors returned should end here.")
            .keep_last();
        Object::with_options(name, options, ErrorSink::default())
    }
}

impl Trigger for ErrorSink {
    fn trigger(&self, object: &Object, value: &Value) -> Value {
        if value.is_nil() {
            return self.last.read().clone().or_nil();
        }
        warn!(sink = %object.url(), error = %value, "unhandled error");
        *self.last.write() = value.clone();
        Value::Nil
    }

    fn kind(&self) -> &'static str {
        "Object.ErrorSink"
    }
}


// ---------------------------------------------------------------------------
// Native
// ---------------------------------------------------------------------------

type NativeFn = dyn Fn(&Object, &Value) -> Value + Send + Sync;

/// Behavior backed by a closure.
pub struct Native {
    func: Box<NativeFn>,
}

impl Native {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Object, &Value) -> Value + Send + Sync + 'static,
    {
        Native {
            func: Box::new(func),
        }
    }
}

impl Trigger for Native {
    fn trigger(&self, object: &Object, value: &Value) -> Value {
        (self.func)(object, value)
    }

    fn kind(&self) -> &'static str {
        "Object.Native"
    }
}
