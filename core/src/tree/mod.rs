//! The object tree.
//!
//! Nodes are addressed by slash urls from a `Root`. Each node answers calls
//! through a `Trigger` behavior; the stock behaviors live in `nodes`.

pub mod alias;
pub mod handle;
pub mod nodes;
pub mod object;
pub mod path;
pub mod root;
pub mod signature;

pub use alias::Alias;
pub use handle::ObjectHandle;
pub use nodes::{Container, ErrorSink, Native, Parameter, Placeholder, DEFAULT_ERROR_SINK};
pub use object::{Object, ObjectOptions, Trigger};
pub use path::ObjectPath;
pub use root::{Root, RootSettings};
