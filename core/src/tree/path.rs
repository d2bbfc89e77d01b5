//! Slash path parser.
//!
//! Parses urls like `/synth/osc/freq` into segments. The root is the empty
//! path; `""` and `"/"` both name it. A missing leading slash is tolerated
//! and a trailing slash is ignored, but empty interior segments are not.

use std::fmt;


/// A parsed object path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ObjectPath {
    segments: Vec<String>,
}

impl ObjectPath {
    /// The root path (url `""`).
    pub fn root() -> Self {
        ObjectPath {
            segments: Vec::new(),
        }
    }

    /// Parse a slash-separated path.
    pub fn parse(input: &str) -> Result<Self, String> {
        let trimmed = input.trim();
        let body = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let body = body.strip_suffix('/').unwrap_or(body);
        if body.is_empty() {
            return Ok(ObjectPath::root());
        }

        let mut segments = Vec::new();
        for part in body.split('/') {
            if part.is_empty() {
                return Err(format!("empty segment in path '{}'", input));
            }
            segments.push(part.to_string());
        }
        Ok(ObjectPath { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Last segment; None for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Path of the parent; None for the root.
    pub fn parent(&self) -> Option<ObjectPath> {
        if self.is_root() {
            return None;
        }
        Some(ObjectPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Append one segment.
    pub fn join(&self, name: &str) -> ObjectPath {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        ObjectPath { segments }
    }

    /// Url of the first `depth` segments.
    pub fn prefix_url(&self, depth: usize) -> String {
        let mut out = String::new();
        for seg in &self.segments[..depth.min(self.segments.len())] {
            out.push('/');
            out.push_str(seg);
        }
        out
    }

    /// Canonical url: `""` for the root, `/a/b` otherwise.
    pub fn to_url(&self) -> String {
        self.prefix_url(self.segments.len())
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_url())
    }
}


/// True when `name` can be used as a single path segment.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/')
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
