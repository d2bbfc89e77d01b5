//! Handles that tolerate the destruction of their target.
//!
//! A handle holds a weak reference. `get()` upgrades it for the duration of
//! one operation, which keeps the node's memory alive even if another thread
//! destroys the node meanwhile; once the node is destroyed, `get()` returns
//! None and `call()` answers with a not-found error.

use std::fmt;
use std::sync::{Arc, Weak};

use super::object::Object;
use crate::value::{Error, Value};


#[derive(Clone, Default)]
pub struct ObjectHandle {
    target: Weak<Object>,
    url: String,
}

impl ObjectHandle {
    /// Hold a node.
    pub fn hold(object: &Arc<Object>) -> Self {
        ObjectHandle {
            target: Arc::downgrade(object),
            url: object.url(),
        }
    }

    /// Strong reference to the target while it is alive.
    pub fn get(&self) -> Option<Arc<Object>> {
        self.target.upgrade().filter(|o| o.is_alive())
    }

    pub fn is_valid(&self) -> bool {
        self.get().is_some()
    }

    /// Url of the target when the handle was taken.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Invoke the target, or return a not-found error if it is gone.
    pub fn call(&self, value: &Value) -> Value {
        match self.get() {
            Some(object) => object.trigger(value),
            None => Error::not_found(format!("{} (object destroyed)", self.url)).into(),
        }
    }

    /// Drop the reference; the handle becomes inert.
    pub fn release(&mut self) {
        self.target = Weak::new();
    }

    pub fn points_to(&self, object: &Arc<Object>) -> bool {
        Weak::ptr_eq(&self.target, &Arc::downgrade(object))
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ObjectHandle({}{})",
            self.url,
            if self.is_valid() { "" } else { ", destroyed" }
        )
    }
}
