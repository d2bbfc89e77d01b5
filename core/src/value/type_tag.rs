//! Type-tag signatures.
//!
//! A tag is a compact string describing the shape of a value: one character
//! per scalar, a concatenation for lists. `TypeId` is a hash of the tag so
//! compatibility checks compare two integers.

use std::fmt;

use super::{Hash, Matrix, Value};


pub const REAL_TAG: char = 'f';
pub const STRING_TAG: char = 's';
pub const ERROR_TAG: char = 's';
pub const HASH_TAG: char = 'H';
pub const MATRIX_TAG: char = 'M';
pub const NIL_TAG: char = 'N';
pub const ANY_TAG: char = '*';


/// Hash of a type tag. Equal tags always give equal ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    /// FNV-1a over the tag bytes.
    pub fn of(tag: &str) -> Self {
        let mut hash: u32 = 0x811c_9dc5;
        for byte in tag.bytes() {
            hash ^= byte as u32;
            hash = hash.wrapping_mul(0x0100_0193);
        }
        TypeId(hash)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}


/// Default value for a single tag character. Unknown characters give Empty.
pub fn default_for_tag(c: char) -> Value {
    match c {
        REAL_TAG => Value::real(0.0),
        STRING_TAG => Value::string(""),
        HASH_TAG => Value::hash(Hash::new()),
        MATRIX_TAG => Value::matrix(Matrix::default()),
        ANY_TAG => Value::Any,
        NIL_TAG => Value::Nil,
        _ => Value::Empty,
    }
}
