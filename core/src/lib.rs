//! ctlspace core: dynamic values and a path-addressable tree of control
//! objects.
//!
//! - `value` holds the dynamically typed `Value` exchanged with every node.
//! - `tree` holds the nodes, the root registry and handles.
//! - `config` builds a tree from a YAML description.

pub mod config;
pub mod error;
pub mod tree;
pub mod value;

pub use error::CtlError;
pub use tree::{Object, ObjectHandle, Root, RootSettings, Trigger};
pub use value::{Error, ErrorCode, Value};
