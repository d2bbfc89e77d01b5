//! YAML tree descriptions.
//!
//! A tree file lists root settings and the nodes to mount, in order.
//! Missing ancestors of a node are created as containers.
//!
//! ```yaml
//! settings:
//!   auto_build: false
//!   error_sink: "/.error"
//! nodes:
//!   - path: /synth/freq
//!     kind: parameter
//!     value: 440
//!     info: "Oscillator frequency in Hz."
//!   - path: /f
//!     kind: alias
//!     target: /synth/freq
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CtlError;
use crate::tree::{
    signature, Container, Object, ObjectOptions, ObjectPath, Parameter, Placeholder, Root,
    RootSettings,
};
use crate::value::{json_to_value, Value};


/// Top-level tree description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeConfig {
    #[serde(default)]
    pub settings: RootSettings,

    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
}


/// One node to mount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Absolute url of the node.
    pub path: String,

    #[serde(default)]
    pub kind: NodeKind,

    /// Initial value; also fixes the type of a parameter.
    #[serde(default)]
    pub value: Option<serde_yaml::Value>,

    #[serde(default)]
    pub info: String,

    #[serde(default)]
    pub keep_last: bool,

    /// Url of the aliased node (alias only).
    #[serde(default)]
    pub target: Option<String>,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Container,
    Parameter,
    Placeholder,
    Alias,
}


/// Load a tree description from a YAML file.
pub fn load(path: &Path) -> Result<TreeConfig, CtlError> {
    let content = std::fs::read_to_string(path).map_err(|source| CtlError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content)
}


/// Parse a tree description from a YAML string.
pub fn parse(content: &str) -> Result<TreeConfig, CtlError> {
    Ok(serde_yaml::from_str(content)?)
}


impl NodeConfig {
    fn initial_value(&self) -> Result<Value, CtlError> {
        match &self.value {
            Some(yaml) => Ok(json_to_value(&serde_json::to_value(yaml)?)),
            None => Ok(Value::Nil),
        }
    }

    fn options(&self, meta_type: Value) -> ObjectOptions {
        ObjectOptions {
            meta_type,
            info: self.info.clone(),
            keep_last: self.keep_last,
        }
    }
}


impl Root {
    /// Build a tree from a description. Fails on the first node that cannot
    /// be mounted.
    pub fn from_config(config: &TreeConfig) -> Result<Root, CtlError> {
        let root = Root::with_settings(config.settings.clone());
        for node in &config.nodes {
            if let Err(e) = mount_node(&root, node) {
                warn!(path = %node.path, error = %e, "config node not mounted");
                return Err(e);
            }
        }
        debug!(objects = root.object_count(), "tree built from config");
        Ok(root)
    }
}


fn mount_node(root: &Root, node: &NodeConfig) -> Result<(), CtlError> {
    let path = ObjectPath::parse(&node.path).map_err(|reason| CtlError::InvalidPath {
        path: node.path.clone(),
        reason,
    })?;
    let (Some(name), Some(parent)) = (path.name(), path.parent()) else {
        return Err(CtlError::invalid_node(&node.path, "cannot replace the root"));
    };
    if root.find(&node.path).is_some() {
        return Err(CtlError::invalid_node(&node.path, "already exists"));
    }
    ensure_containers(root, &parent)?;

    let value = node.initial_value()?;
    let object: Arc<Object> = match node.kind {
        NodeKind::Container => {
            Object::with_options(name, node.options(signature::hash_io()), Container)
        }
        NodeKind::Parameter => Object::with_options(
            name,
            node.options(Parameter::signature_for(&value)),
            Parameter::new(value),
        ),
        NodeKind::Placeholder => {
            let placeholder = Object::with_options(name, node.options(Value::Nil), Placeholder::default());
            if !value.is_nil() {
                placeholder.trigger(&value);
            }
            placeholder
        }
        NodeKind::Alias => {
            let Some(target) = node.target.as_deref() else {
                return Err(CtlError::invalid_node(&node.path, "alias needs a target"));
            };
            root.alias(target, &node.path)
                .map_err(|e| CtlError::invalid_node(&node.path, e.to_string()))?;
            return Ok(());
        }
    };

    root.mount(&node.path, object)
        .map_err(|e| CtlError::invalid_node(&node.path, e.to_string()))?;
    Ok(())
}


fn ensure_containers(root: &Root, path: &ObjectPath) -> Result<(), CtlError> {
    for depth in 1..=path.depth() {
        let url = path.prefix_url(depth);
        if root.find(&url).is_none() {
            let name = &path.segments()[depth - 1];
            root.mount(&url, Container::object(name, ""))
                .map_err(|e| CtlError::invalid_node(&url, e.to_string()))?;
        }
    }
    Ok(())
}
