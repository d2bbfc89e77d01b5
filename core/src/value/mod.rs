//! Self-describing values — the data currency of every tree operation.
//!
//! `Value` is a tagged variant. String, List, Error and Hash payloads sit
//! behind an `Arc`: cloning a value shares the payload and bumps the count,
//! and mutating a shared payload copies it first (`Arc::make_mut`), so a
//! clone never observes a later edit of its source. Matrix payloads are
//! boxed and copied whole on every clone.
//!
//! Positional and keyed indexing never fail: a missing slot reads as the
//! shared `NIL` sentinel.

pub mod error;
mod hash;
mod json;
mod list;
mod matrix;
pub mod type_tag;

use std::borrow::Cow;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

pub use error::{Error, ErrorCode};
pub use hash::Hash;
pub use json::{json_to_value, value_to_json};
pub use list::List;
pub use matrix::{Matrix, MatrixKind};
pub use type_tag::TypeId;

use type_tag::{ANY_TAG, ERROR_TAG, HASH_TAG, MATRIX_TAG, NIL_TAG, REAL_TAG, STRING_TAG};


/// Sentinel returned by out-of-range or wrong-variant indexing.
pub static NIL: Value = Value::Nil;


/// The variant type exchanged with every node.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Not yet supplied. Stored or assigned, it collapses to `Nil`.
    #[default]
    Empty,
    /// Explicitly no value. As a `trigger` argument it means "read".
    Nil,
    Real(f64),
    String(Arc<String>),
    List(Arc<List>),
    Error(Arc<Error>),
    Hash(Arc<Hash>),
    Matrix(Box<Matrix>),
    /// Wildcard used in meta-types: accepts anything.
    Any,
}

impl Value {
    // -------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------

    pub fn nil() -> Value {
        Value::Nil
    }

    pub fn real(r: f64) -> Value {
        Value::Real(r)
    }

    pub fn string(s: impl Into<String>) -> Value {
        Value::String(Arc::new(s.into()))
    }

    pub fn list(list: List) -> Value {
        Value::List(Arc::new(list))
    }

    pub fn list_of(values: Vec<Value>) -> Value {
        Value::list(values.into_iter().collect())
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Value {
        Value::Error(Arc::new(Error::new(code, message)))
    }

    pub fn hash(hash: Hash) -> Value {
        Value::Hash(Arc::new(hash))
    }

    pub fn matrix(matrix: Matrix) -> Value {
        Value::Matrix(Box::new(matrix))
    }

    pub fn any() -> Value {
        Value::Any
    }

    /// Default-initialized value for a tag: one character gives a scalar,
    /// several give a fixed-arity list.
    pub fn from_type_tag(tag: &str) -> Value {
        let mut v = Value::Empty;
        v.set_type_tag(tag);
        v
    }

    /// Empty becomes Nil, everything else passes through.
    pub fn or_nil(self) -> Value {
        match self {
            Value::Empty => Value::Nil,
            other => other,
        }
    }

    // -------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Empty => "empty",
            Value::Nil => "nil",
            Value::Real(_) => "real",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Error(_) => "error",
            Value::Hash(_) => "hash",
            Value::Matrix(_) => "matrix",
            Value::Any => "any",
        }
    }

    /// Canonical signature: 'f', 's', 'H', 'M', 'N', '*', "" for Empty, the
    /// concatenation of element tags for a List.
    pub fn type_tag(&self) -> Cow<'static, str> {
        let c = match self {
            Value::Empty => return Cow::Borrowed(""),
            Value::List(list) => return Cow::Owned(list.type_tag()),
            Value::Nil => NIL_TAG,
            Value::Real(_) => REAL_TAG,
            Value::String(_) => STRING_TAG,
            Value::Error(_) => ERROR_TAG,
            Value::Hash(_) => HASH_TAG,
            Value::Matrix(_) => MATRIX_TAG,
            Value::Any => ANY_TAG,
        };
        Cow::Owned(c.to_string())
    }

    pub fn type_id(&self) -> TypeId {
        TypeId::of(&self.type_tag())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_real(&self) -> bool {
        matches!(self, Value::Real(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn is_hash(&self) -> bool {
        matches!(self, Value::Hash(_))
    }

    pub fn is_matrix(&self) -> bool {
        matches!(self, Value::Matrix(_))
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Value::Any)
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&Error> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&Hash> {
        match self {
            Value::Hash(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&Matrix> {
        match self {
            Value::Matrix(m) => Some(m),
            _ => None,
        }
    }

    /// Error code when this is an Error value.
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.as_error().map(Error::code)
    }

    /// True when both values hold the very same reference-counted payload.
    pub fn shares_payload_with(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Arc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            (Value::Error(a), Value::Error(b)) => Arc::ptr_eq(a, b),
            (Value::Hash(a), Value::Hash(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    // -------------------------------------------------------------------
    // Re-typing
    // -------------------------------------------------------------------

    /// Copy another value into this one. Assigning Empty gives Nil.
    pub fn set(&mut self, other: &Value) -> &mut Self {
        *self = other.clone().or_nil();
        self
    }

    pub fn set_nil(&mut self) -> &mut Self {
        *self = Value::Nil;
        self
    }

    pub fn set_empty(&mut self) -> &mut Self {
        *self = Value::Empty;
        self
    }

    pub fn set_any(&mut self) -> &mut Self {
        *self = Value::Any;
        self
    }

    pub fn set_real(&mut self, r: f64) -> &mut Self {
        *self = Value::Real(r);
        self
    }

    pub fn set_string(&mut self, s: impl Into<String>) -> &mut Self {
        *self = Value::string(s);
        self
    }

    pub fn set_list(&mut self, list: List) -> &mut Self {
        *self = Value::list(list);
        self
    }

    pub fn set_error(&mut self, code: ErrorCode, message: impl Into<String>) -> &mut Self {
        *self = Value::error(code, message);
        self
    }

    pub fn set_hash(&mut self, hash: Hash) -> &mut Self {
        *self = Value::hash(hash);
        self
    }

    pub fn set_matrix(&mut self, matrix: Matrix) -> &mut Self {
        *self = Value::matrix(matrix);
        self
    }

    /// Re-type from a tag string; see `from_type_tag`.
    pub fn set_type_tag(&mut self, tag: &str) -> &mut Self {
        let mut chars = tag.chars();
        *self = match (chars.next(), chars.next()) {
            (None, _) => Value::Empty,
            (Some(c), None) => type_tag::default_for_tag(c),
            _ => Value::list(List::from_type_tag(tag)),
        };
        self
    }

    /// Append text to a String value. Other variants are left untouched.
    pub fn append(&mut self, text: &str) -> &mut Self {
        if let Value::String(s) = self {
            Arc::make_mut(s).push_str(text);
        }
        self
    }

    // -------------------------------------------------------------------
    // List access
    // -------------------------------------------------------------------

    /// Number of list elements; 0 for every other variant.
    pub fn size(&self) -> usize {
        match self {
            Value::List(l) => l.len(),
            _ => 0,
        }
    }

    /// Append to a list. Empty/Nil start a new list; another scalar becomes
    /// the list's first element.
    pub fn push_back(&mut self, value: Value) -> &mut Self {
        if let Some(list) = self.promote_to_list() {
            list.push_back(value);
        }
        self
    }

    /// Prepend to a list, promoting like `push_back`.
    pub fn push_front(&mut self, value: Value) -> &mut Self {
        if let Some(list) = self.promote_to_list() {
            list.push_front(value);
        }
        self
    }

    /// Last list element, or the value itself when it is not a list.
    pub fn last(&self) -> &Value {
        match self {
            Value::List(l) => l.last().unwrap_or(&NIL),
            other => other,
        }
    }

    /// Replace a list slot. False when not a list or out of range.
    pub fn set_value_at(&mut self, pos: usize, value: Value) -> bool {
        match self {
            Value::List(l) if pos < l.len() => Arc::make_mut(l).set_value_at(pos, value),
            _ => false,
        }
    }

    fn promote_to_list(&mut self) -> Option<&mut List> {
        if matches!(self, Value::Empty | Value::Nil) {
            *self = Value::list(List::new());
        } else if !self.is_list() {
            let first = std::mem::take(self);
            *self = Value::list(List::from_values(vec![first]));
        }
        match self {
            Value::List(l) => Some(Arc::make_mut(l)),
            _ => None,
        }
    }

    // -------------------------------------------------------------------
    // Hash access
    // -------------------------------------------------------------------

    /// Keyed write. A non-Hash value is replaced by an empty Hash first.
    pub fn set_key(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        if !self.is_hash() {
            *self = Value::hash(Hash::new());
        }
        if let Value::Hash(h) = self {
            Arc::make_mut(h).set(key, value);
        }
        self
    }

    /// Keyed read; None when not a Hash or the key is absent.
    pub fn get_key(&self, key: &str) -> Option<&Value> {
        self.as_hash().and_then(|h| h.get(key))
    }
}

impl Index<usize> for Value {
    type Output = Value;

    fn index(&self, pos: usize) -> &Value {
        match self {
            Value::List(l) => l.get(pos).unwrap_or(&NIL),
            _ => &NIL,
        }
    }
}

impl Index<&str> for Value {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.get_key(key).unwrap_or(&NIL)
    }
}

impl From<Error> for Value {
    fn from(e: Error) -> Self {
        Value::Error(Arc::new(e))
    }
}

impl From<List> for Value {
    fn from(l: List) -> Self {
        Value::list(l)
    }
}

impl From<Hash> for Value {
    fn from(h: Hash) -> Self {
        Value::hash(h)
    }
}

impl From<Matrix> for Value {
    fn from(m: Matrix) -> Self {
        Value::matrix(m)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Nil => write!(f, "Nil"),
            Value::Real(r) => write!(f, "{r}"),
            Value::String(s) => write!(f, "\"{s}\""),
            Value::Error(e) => write!(f, "\"{e}\""),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Hash(h) => {
                write!(f, "{{")?;
                for (i, (k, v)) in h.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Value::Matrix(m) => write!(f, "{m}"),
            Value::Any => write!(f, "*"),
        }
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
