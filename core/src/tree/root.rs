//! The tree root and its url index.
//!
//! `Root` is a cheap clonable handle on the shared root state: the root node
//! (url `""`), the settings, and a flat index from url to node so that calls
//! by path do not walk the tree. Paths that are not indexed are resolved by
//! building the missing tail from the deepest existing ancestor.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::alias::Alias;
use super::handle::ObjectHandle;
use super::nodes::{Container, ErrorSink, Placeholder, DEFAULT_ERROR_SINK};
use super::object::Object;
use super::path::{is_valid_name, ObjectPath};
use crate::value::{Error, Value};


/// Tree-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootSettings {
    /// Build unresolvable path tails out of placeholder nodes.
    pub auto_build: bool,
    /// Where the error sink is mounted; None for no sink.
    pub error_sink: Option<String>,
}

impl Default for RootSettings {
    fn default() -> Self {
        RootSettings {
            auto_build: false,
            error_sink: Some(DEFAULT_ERROR_SINK.to_string()),
        }
    }
}


pub(crate) struct RootShared {
    object: Arc<Object>,
    index: RwLock<HashMap<String, Weak<Object>>>,
    settings: RootSettings,
}

impl RootShared {
    pub(crate) fn register(&self, url: &str, object: &Weak<Object>) {
        self.index.write().insert(url.to_string(), object.clone());
    }

    /// Remove `url` from the index if it still points at `object`.
    pub(crate) fn unregister(&self, url: &str, object: &Object) {
        let mut index = self.index.write();
        if index
            .get(url)
            .is_some_and(|w| std::ptr::eq(w.as_ptr(), object))
        {
            index.remove(url);
        }
    }
}

impl Drop for RootShared {
    fn drop(&mut self) {
        self.object.destroy();
    }
}


#[derive(Clone)]
pub struct Root {
    shared: Arc<RootShared>,
}

impl Root {
    pub fn new() -> Root {
        Root::with_settings(RootSettings::default())
    }

    pub fn with_settings(settings: RootSettings) -> Root {
        let shared = Arc::new_cyclic(|weak| RootShared {
            object: Object::new_root(Container, weak.clone()),
            index: RwLock::new(HashMap::new()),
            settings,
        });
        shared.register("", &Arc::downgrade(&shared.object));
        let root = Root { shared };

        if let Some(path) = root.settings().error_sink.clone() {
            if let Err(e) = root.mount(&path, ErrorSink::object(".error")) {
                warn!(path = %path, error = %e, "could not mount error sink");
            }
        }
        root
    }

    pub(crate) fn from_shared(shared: Arc<RootShared>) -> Root {
        Root { shared }
    }

    /// The root node.
    pub fn object(&self) -> &Arc<Object> {
        &self.shared.object
    }

    pub fn settings(&self) -> &RootSettings {
        &self.shared.settings
    }

    /// Attach a node directly below the root.
    pub fn adopt(&self, child: Arc<Object>) -> Result<Arc<Object>, Error> {
        self.shared.object.adopt(child)
    }

    /// Attach `object` at `path`. Its name becomes the last segment (subject
    /// to the sibling collision rule); the parent is resolved like a call.
    pub fn mount(&self, path: &str, object: Arc<Object>) -> Result<Arc<Object>, Error> {
        let parsed = ObjectPath::parse(path).map_err(Error::bad_request)?;
        let (Some(name), Some(parent_path)) = (parsed.name(), parsed.parent()) else {
            return Err(Error::bad_request("cannot mount over the root"));
        };
        let parent = self.resolve(&parent_path)?;
        object.set_name(name)?;
        parent.adopt(object)
    }

    // -- lookup --------------------------------------------------------------

    /// Indexed lookup; never builds.
    pub fn find(&self, path: &str) -> Option<ObjectHandle> {
        let url = ObjectPath::parse(path).ok()?.to_url();
        self.lookup(&url).map(|o| ObjectHandle::hold(&o))
    }

    /// Resolve `path`, building missing nodes where a parent can build them.
    pub fn find_or_build(&self, path: &str) -> Result<ObjectHandle, Error> {
        let parsed = ObjectPath::parse(path).map_err(Error::bad_request)?;
        self.resolve(&parsed).map(|o| ObjectHandle::hold(&o))
    }

    /// Call the node at `path` with `value`. Unresolvable paths answer with a
    /// not-found error naming the path.
    pub fn call(&self, path: &str, value: &Value) -> Value {
        match self.find_or_build(path) {
            Ok(handle) => handle.call(value),
            Err(e) => e.into(),
        }
    }

    fn lookup(&self, url: &str) -> Option<Arc<Object>> {
        let hit = self.shared.index.read().get(url).and_then(Weak::upgrade)?;
        if hit.is_alive() && hit.url() == url {
            Some(hit)
        } else {
            None
        }
    }

    fn resolve(&self, path: &ObjectPath) -> Result<Arc<Object>, Error> {
        let url = path.to_url();
        if let Some(hit) = self.lookup(&url) {
            return Ok(hit);
        }

        let (mut current, depth) = self.deepest_existing(path);
        for name in &path.segments()[depth..] {
            current = match current.child(name) {
                Some(existing) => existing,
                None => self
                    .build_child(&current, name)
                    .ok_or_else(|| Error::not_found(url.clone()))?,
            };
        }
        Ok(current)
    }

    fn deepest_existing(&self, path: &ObjectPath) -> (Arc<Object>, usize) {
        for depth in (1..path.depth()).rev() {
            if let Some(hit) = self.lookup(&path.prefix_url(depth)) {
                return (hit, depth);
            }
        }
        (self.shared.object.clone(), 0)
    }

    fn build_child(&self, parent: &Arc<Object>, name: &str) -> Option<Arc<Object>> {
        if !is_valid_name(name) {
            return None;
        }
        let built = parent.build_child(name).or_else(|| {
            if self.shared.settings.auto_build {
                parent.adopt(Placeholder::object(name)).ok()
            } else {
                None
            }
        })?;
        if built.name() == name {
            debug!(url = %built.url(), kind = built.kind(), "built on demand");
            return Some(built);
        }
        // Another caller built the same name first.
        built.destroy();
        parent.child(name)
    }

    // -- structure -----------------------------------------------------------

    /// Destroy the node at `path` and its subtree.
    pub fn remove(&self, path: &str) -> Result<(), Error> {
        let object = self.existing(path)?;
        if object.is_root() {
            return Err(Error::bad_request("the root cannot be removed"));
        }
        object.destroy();
        Ok(())
    }

    /// Rename the node at `path`; returns its new url.
    pub fn rename(&self, path: &str, name: &str) -> Result<String, Error> {
        let object = self.existing(path)?;
        object.set_name(name)?;
        Ok(object.url())
    }

    /// Move the node at `path` below `new_parent`; returns its new url.
    pub fn move_to(&self, path: &str, new_parent: &str) -> Result<String, Error> {
        let object = self.existing(path)?;
        let parent = self.existing(new_parent)?;
        object.set_parent(Some(&parent))?;
        Ok(object.url())
    }

    /// Mount an alias of the node at `original` at `path`.
    pub fn alias(&self, original: &str, path: &str) -> Result<Arc<Object>, Error> {
        let target = self.existing(original)?;
        let name = ObjectPath::parse(path)
            .map_err(Error::bad_request)?
            .name()
            .unwrap_or_default()
            .to_string();
        let alias = Alias::object(&name, &target);
        match self.mount(path, alias.clone()) {
            Ok(mounted) => Ok(mounted),
            Err(e) => {
                alias.destroy();
                Err(e)
            }
        }
    }

    fn existing(&self, path: &str) -> Result<Arc<Object>, Error> {
        let url = ObjectPath::parse(path).map_err(Error::bad_request)?.to_url();
        self.lookup(&url).ok_or_else(|| Error::not_found(url))
    }

    /// Route an error to the error sink. Returns false when no sink is
    /// mounted.
    pub fn report_error(&self, error: &Value) -> bool {
        let Some(path) = self.settings().error_sink.as_deref() else {
            return false;
        };
        match self.find(path) {
            Some(sink) => {
                sink.call(error);
                true
            }
            None => false,
        }
    }

    // -- introspection -------------------------------------------------------

    /// Every indexed url, sorted. The root appears as `""`.
    pub fn urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .shared
            .index
            .read()
            .iter()
            .filter(|(_, w)| w.strong_count() > 0)
            .map(|(k, _)| k.clone())
            .collect();
        urls.sort();
        urls
    }

    /// Number of live nodes in the index, root included.
    pub fn object_count(&self) -> usize {
        self.shared
            .index
            .read()
            .values()
            .filter(|w| w.strong_count() > 0)
            .count()
    }
}

impl Default for Root {
    fn default() -> Self {
        Root::new()
    }
}

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Root")
            .field("settings", &self.shared.settings)
            .field("objects", &self.object_count())
            .finish()
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Barrier;
    use std::thread;

    use super::*;
    use crate::tree::nodes::Parameter;
    use crate::value::ErrorCode;

    fn bare() -> Root {
        Root::with_settings(RootSettings {
            auto_build: false,
            error_sink: None,
        })
    }

    fn lazy() -> Root {
        Root::with_settings(RootSettings {
            auto_build: true,
            error_sink: None,
        })
    }

    #[test]
    fn default_root_has_error_sink_last() {
        let root = Root::new();
        root.adopt(Container::object("synth", "")).unwrap();
        assert_eq!(root.object().child_names(), vec!["synth", ".error"]);
        assert!(root.report_error(&Value::error(ErrorCode::NotFound, "/x")));
        assert!(root.call("/.error", &Value::Nil).is_error());
    }

    #[test]
    fn call_by_path() {
        let root = bare();
        let synth = root.adopt(Container::object("synth", "")).unwrap();
        synth.adopt(Parameter::object("freq", Value::real(440.0), "")).unwrap();

        assert_eq!(root.call("/synth/freq", &Value::Nil), Value::real(440.0));
        assert_eq!(root.call("synth/freq/", &Value::real(1.0)), Value::real(1.0));
        assert_eq!(root.call("/", &Value::Nil).to_json(), r#"{"synth":{"freq":1.0}}"#);
    }

    #[test]
    fn unknown_path_is_not_found() {
        let root = bare();
        let r = root.call("/nope/deeper", &Value::Nil);
        assert_eq!(r.error_code(), Some(ErrorCode::NotFound));
        assert_eq!(r.as_error().unwrap().message(), "/nope/deeper");
        assert_eq!(
            root.call("/a//b", &Value::Nil).error_code(),
            Some(ErrorCode::BadRequest)
        );
    }

    #[test]
    fn auto_build_creates_placeholders() {
        let root = lazy();
        assert_eq!(root.call("/a/b/c/d", &Value::real(3.0)), Value::real(3.0));
        let handle = root.find("/a/b/c/d").unwrap();
        assert_eq!(handle.get().unwrap().url(), "/a/b/c/d");
        assert_eq!(root.find("/a/b").unwrap().get().unwrap().kind(), "Object.Placeholder");
        assert_eq!(root.call("/a/b/c/d", &Value::Nil), Value::real(3.0));
    }

    #[test]
    fn lazy_build_from_behavior() {
        let root = bare();
        let cache = root.adopt(Placeholder::object("cache")).unwrap();
        assert!(cache.child("x").is_none());
        root.call("/cache/x/y", &Value::string("v"));
        assert_eq!(root.find("/cache/x/y").unwrap().call(&Value::Nil), Value::string("v"));
        assert!(root.find("/other").is_none());
    }

    #[test]
    fn url_resolves_back_at_any_depth() {
        let root = lazy();
        root.find_or_build("/l1/l2/l3/l4/l5").unwrap();
        for url in root.urls() {
            let obj = root.find(&url).unwrap().get().unwrap();
            assert_eq!(obj.url(), url);
        }
        assert_eq!(root.object_count(), 6);
    }

    #[test]
    fn index_follows_rename_and_move() {
        let root = bare();
        let a = root.adopt(Container::object("a", "")).unwrap();
        let b = a.adopt(Container::object("b", "")).unwrap();
        b.adopt(Parameter::object("x", Value::real(1.0), "")).unwrap();
        root.adopt(Container::object("dest", "")).unwrap();

        assert_eq!(root.rename("/a/b", "bee").unwrap(), "/a/bee");
        assert!(root.find("/a/b/x").is_none());
        assert_eq!(root.call("/a/bee/x", &Value::Nil), Value::real(1.0));

        assert_eq!(root.move_to("/a/bee", "/dest").unwrap(), "/dest/bee");
        assert!(root.find("/a/bee").is_none());
        assert_eq!(root.call("/dest/bee/x", &Value::Nil), Value::real(1.0));
    }

    #[test]
    fn remove_clears_index() {
        let root = bare();
        let a = root.adopt(Container::object("a", "")).unwrap();
        a.adopt(Parameter::object("x", Value::real(1.0), "")).unwrap();
        let handle = root.find("/a/x").unwrap();

        root.remove("/a").unwrap();
        assert!(root.find("/a").is_none());
        assert!(root.find("/a/x").is_none());
        assert!(!handle.is_valid());
        assert_eq!(root.urls(), vec![""]);
        assert!(root.remove("/").is_err());
        assert_eq!(root.remove("/a").unwrap_err().code(), ErrorCode::NotFound);
    }

    #[test]
    fn alias_by_path() {
        let root = bare();
        root.adopt(Parameter::object("freq", Value::real(440.0), "")).unwrap();
        root.adopt(Container::object("shortcuts", "")).unwrap();
        root.alias("/freq", "/shortcuts/f").unwrap();

        assert_eq!(root.call("/shortcuts/f", &Value::real(880.0)), Value::real(880.0));
        assert_eq!(root.call("/freq", &Value::Nil), Value::real(880.0));

        root.remove("/freq").unwrap();
        assert!(root.find("/shortcuts/f").is_none());
        assert_eq!(
            root.call("/shortcuts/f", &Value::Nil).error_code(),
            Some(ErrorCode::NotFound)
        );
    }

    #[test]
    fn mount_applies_collision_rule() {
        let root = bare();
        root.mount("/osc", Container::object("x", "")).unwrap();
        let second = root.mount("/osc", Container::object("y", "")).unwrap();
        assert_eq!(second.url(), "/osc-1");
        assert!(root.mount("/", Container::object("z", "")).is_err());
    }

    #[test]
    fn dropping_root_destroys_tree() {
        let root = bare();
        let a = root.adopt(Container::object("a", "")).unwrap();
        let handle = a.handle();
        drop(a);
        drop(root);
        assert!(!handle.is_valid());
    }

    #[test]
    fn concurrent_mutation_and_enumeration() {
        const WRITERS: usize = 4;
        const READERS: usize = 4;
        const ROUNDS: usize = 200;

        let root = bare();
        root.adopt(Container::object("pool", "")).unwrap();
        let barrier = Barrier::new(WRITERS + READERS);

        thread::scope(|s| {
            for w in 0..WRITERS {
                let root = root.clone();
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    for i in 0..ROUNDS {
                        let name = format!("w{}-{}", w, i);
                        let node = Parameter::object(&name, Value::real(i as f64), "");
                        let node = root.mount(&format!("/pool/{}", name), node).unwrap();
                        if i % 2 == 0 {
                            node.destroy();
                        }
                    }
                });
            }
            for _ in 0..READERS {
                let root = root.clone();
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    for _ in 0..ROUNDS {
                        let pool = root.find("/pool").unwrap().get().unwrap();
                        for child in pool.children() {
                            let _ = child.trigger(&Value::Nil);
                        }
                        let _ = pool.list();
                        let _ = pool.tree();
                        let _ = root.call("/pool", &Value::Nil);
                    }
                });
            }
        });

        let pool = root.find("/pool").unwrap().get().unwrap();
        assert_eq!(pool.child_count(), WRITERS * ROUNDS / 2);
        for url in root.urls() {
            assert_eq!(root.find(&url).unwrap().get().unwrap().url(), url);
        }
        assert_eq!(root.object_count(), 2 + WRITERS * ROUNDS / 2);
    }
}
