//! Alias nodes.
//!
//! An alias forwards every call to another node through a handle. The
//! original keeps a weak list of its aliases and destroys them when it is
//! destroyed; an alias destroyed on its own removes itself from that list.

use std::sync::Arc;

use super::handle::ObjectHandle;
use super::object::{Object, ObjectOptions, Trigger};
use crate::value::{Error, Value};


pub struct Alias {
    original: ObjectHandle,
}

impl Alias {
    /// Create a detached alias of `original` named `name`. It shares the
    /// original's meta-type and info.
    pub fn object(name: &str, original: &Arc<Object>) -> Arc<Object> {
        let options = ObjectOptions::new(original.meta_type()).info(original.info());
        let alias = Object::with_options(
            name,
            options,
            Alias {
                original: ObjectHandle::hold(original),
            },
        );
        original.register_alias(&alias);
        alias
    }
}

impl Trigger for Alias {
    fn trigger(&self, object: &Object, value: &Value) -> Value {
        match self.original.get() {
            Some(original) => original.trigger(value),
            None => Error::not_found(format!(
                "{} (alias of destroyed {})",
                object.url(),
                self.original.url()
            ))
            .into(),
        }
    }

    fn destroyed(&self, object: &Object) {
        if let Some(original) = self.original.get() {
            original.unregister_alias(object);
        }
    }

    fn kind(&self) -> &'static str {
        "Object.Alias"
    }
}
