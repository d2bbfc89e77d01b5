//! Tree nodes.
//!
//! An `Object` is a named node with a parent, ordered children, a meta-type
//! describing its accepted values, and a `Trigger` behavior that answers
//! calls. Nodes are shared as `Arc<Object>`; parents own their children,
//! while parent, root and alias links are weak.
//!
//! Lock order is the node's structure lock, then the parent children map,
//! then the child's own cells, then the root index. A node never takes
//! another node's structure lock while holding its own. Recursive walks take
//! a snapshot of the children first and never hold a lock while calling into
//! another node's behavior.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use super::handle::ObjectHandle;
use super::path::is_valid_name;
use super::root::{Root, RootShared};
use crate::value::{Error, Hash, List, Value};


// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

/// The variable part of a node: what happens when it is called.
pub trait Trigger: Send + Sync {
    /// Answer a call. `value` is Nil for a plain read.
    fn trigger(&self, object: &Object, value: &Value) -> Value;

    /// Build a child named `name` on demand. The returned node is adopted by
    /// the caller.
    fn build_child(&self, _object: &Arc<Object>, _name: &str) -> Option<Arc<Object>> {
        None
    }

    /// Called once while the node is being destroyed, before its children.
    fn destroyed(&self, _object: &Object) {}

    fn kind(&self) -> &'static str {
        "Object"
    }
}


/// Construction options for a node.
#[derive(Debug, Clone, Default)]
pub struct ObjectOptions {
    /// Nil, a String (info only) or a List whose first element is a sample
    /// of the accepted value.
    pub meta_type: Value,
    pub info: String,
    /// Keep this node after all its regular siblings.
    pub keep_last: bool,
}

impl ObjectOptions {
    pub fn new(meta_type: Value) -> Self {
        ObjectOptions {
            meta_type,
            ..Default::default()
        }
    }

    pub fn info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    pub fn keep_last(mut self) -> Self {
        self.keep_last = true;
        self
    }
}


// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

pub struct Object {
    me: Weak<Object>,
    name: RwLock<String>,
    url: RwLock<String>,
    parent: RwLock<Weak<Object>>,
    root: RwLock<Weak<RootShared>>,
    children: RwLock<IndexMap<String, Arc<Object>>>,
    aliases: Mutex<Vec<Weak<Object>>>,
    /// Serializes reparent, rename and destroy of this node.
    structure: Mutex<()>,
    meta_type: RwLock<Value>,
    info: RwLock<String>,
    keep_last: bool,
    is_root: bool,
    alive: AtomicBool,
    behavior: Box<dyn Trigger>,
}

impl Object {
    /// Create a detached node with default options.
    pub fn new(name: impl Into<String>, behavior: impl Trigger + 'static) -> Arc<Object> {
        Object::with_options(name, ObjectOptions::default(), behavior)
    }

    /// Create a detached node.
    pub fn with_options(
        name: impl Into<String>,
        options: ObjectOptions,
        behavior: impl Trigger + 'static,
    ) -> Arc<Object> {
        Object::build(name.into(), options, Box::new(behavior), false, Weak::new())
    }

    pub(crate) fn new_root(
        behavior: impl Trigger + 'static,
        root: Weak<RootShared>,
    ) -> Arc<Object> {
        Object::build(String::new(), ObjectOptions::default(), Box::new(behavior), true, root)
    }

    fn build(
        name: String,
        options: ObjectOptions,
        behavior: Box<dyn Trigger>,
        is_root: bool,
        root: Weak<RootShared>,
    ) -> Arc<Object> {
        let url = if is_root { String::new() } else { name.clone() };
        Arc::new_cyclic(|me| Object {
            me: me.clone(),
            name: RwLock::new(name),
            url: RwLock::new(url),
            parent: RwLock::new(Weak::new()),
            root: RwLock::new(root),
            children: RwLock::new(IndexMap::new()),
            aliases: Mutex::new(Vec::new()),
            structure: Mutex::new(()),
            meta_type: RwLock::new(options.meta_type.or_nil()),
            info: RwLock::new(options.info),
            keep_last: options.keep_last,
            is_root,
            alive: AtomicBool::new(true),
            behavior,
        })
    }

    // -- accessors ---------------------------------------------------------

    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    /// Slash path from the root; the bare name when detached.
    pub fn url(&self) -> String {
        self.url.read().clone()
    }

    pub fn info(&self) -> String {
        self.info.read().clone()
    }

    pub fn set_info(&self, info: impl Into<String>) {
        *self.info.write() = info.into();
    }

    pub fn meta_type(&self) -> Value {
        self.meta_type.read().clone()
    }

    pub fn set_meta_type(&self, meta_type: Value) {
        *self.meta_type.write() = meta_type.or_nil();
    }

    pub fn keep_last(&self) -> bool {
        self.keep_last
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Behavior kind, e.g. `Object.Parameter`.
    pub fn kind(&self) -> &'static str {
        self.behavior.kind()
    }

    pub fn parent(&self) -> Option<Arc<Object>> {
        self.parent.read().upgrade()
    }

    /// The root this node is mounted under, if any.
    pub fn root(&self) -> Option<Root> {
        self.root.read().upgrade().map(Root::from_shared)
    }

    pub(crate) fn root_weak(&self) -> Weak<RootShared> {
        self.root.read().clone()
    }

    pub fn handle(&self) -> ObjectHandle {
        match self.me.upgrade() {
            Some(me) => ObjectHandle::hold(&me),
            None => ObjectHandle::default(),
        }
    }

    // -- children ----------------------------------------------------------

    /// Snapshot of the children in order.
    pub fn children(&self) -> Vec<Arc<Object>> {
        self.children.read().values().cloned().collect()
    }

    pub fn child_names(&self) -> Vec<String> {
        self.children.read().keys().cloned().collect()
    }

    pub fn child_count(&self) -> usize {
        self.children.read().len()
    }

    pub fn has_children(&self) -> bool {
        !self.children.read().is_empty()
    }

    pub fn child(&self, name: &str) -> Option<Arc<Object>> {
        self.children.read().get(name).cloned()
    }

    /// Child at a position in the ordered sequence.
    pub fn child_at(&self, index: usize) -> Option<ObjectHandle> {
        self.children
            .read()
            .get_index(index)
            .map(|(_, c)| ObjectHandle::hold(c))
    }

    // -- calls -------------------------------------------------------------

    /// Invoke the behavior. An Empty argument is passed on as Nil.
    pub fn trigger(&self, value: &Value) -> Value {
        if !self.is_alive() {
            return Error::not_found(format!("{} (object destroyed)", self.url())).into();
        }
        trace!(url = %self.url(), "trigger");
        let result = if value.is_empty() {
            self.behavior.trigger(self, &Value::Nil)
        } else {
            self.behavior.trigger(self, value)
        };
        result.or_nil()
    }

    /// Ask the behavior for a child named `name` and adopt it.
    pub fn build_child(self: &Arc<Self>, name: &str) -> Option<Arc<Object>> {
        let built = self.behavior.build_child(self, name)?;
        self.adopt(built).ok()
    }

    // -- structure ---------------------------------------------------------

    /// Make `child` a child of this node, moving it out of its previous
    /// parent. A colliding name is changed to `name-1`, `name-2`, ...
    pub fn adopt(self: &Arc<Self>, child: Arc<Object>) -> Result<Arc<Object>, Error> {
        child.set_parent(Some(self))?;
        Ok(child)
    }

    /// Reparent this node; `None` detaches it. When the new parent is
    /// destroyed mid-move the node ends up detached and NotFound is returned.
    pub fn set_parent(self: &Arc<Self>, parent: Option<&Arc<Object>>) -> Result<(), Error> {
        let _structure = self.structure.lock();
        if !self.is_alive() {
            return Err(Error::not_found(format!("{} (object destroyed)", self.url())));
        }
        if self.is_root {
            return Err(Error::bad_request("the root cannot be moved"));
        }
        if let Some(p) = parent {
            if !p.is_alive() {
                return Err(Error::not_found(format!("{} (object destroyed)", p.url())));
            }
            if p.is_self_or_descendant_of(self) {
                return Err(Error::bad_request(format!(
                    "cannot move {} below itself",
                    self.url()
                )));
            }
            if !is_valid_name(&self.name()) {
                return Err(Error::bad_request(format!("invalid name '{}'", self.name())));
            }
        }

        if let Some(old) = self.parent() {
            old.unregister_child(self);
        }
        *self.parent.write() = parent.map(Arc::downgrade).unwrap_or_default();
        if let Some(p) = parent {
            if !p.register_child(self) {
                *self.parent.write() = Weak::new();
                self.moved();
                return Err(Error::not_found(format!("{} (object destroyed)", p.url())));
            }
        }
        self.moved();
        if parent.is_some() {
            debug!(url = %self.url(), kind = self.kind(), "adopted");
        }
        Ok(())
    }

    /// Change the name. The sibling collision rule applies.
    pub fn set_name(self: &Arc<Self>, name: &str) -> Result<(), Error> {
        if self.is_root {
            return Err(Error::bad_request("the root cannot be renamed"));
        }
        if !is_valid_name(name) {
            return Err(Error::bad_request(format!("invalid name '{}'", name)));
        }
        let structure = self.structure.lock();
        if !self.is_alive() {
            return Err(Error::not_found(format!("{} (object destroyed)", self.url())));
        }
        match self.parent() {
            Some(parent) => {
                parent.unregister_child(self);
                *self.name.write() = name.to_string();
                if !parent.register_child(self) {
                    // The parent is going away; its subtree goes with it.
                    drop(structure);
                    self.destroy();
                    return Err(Error::not_found(format!("{} (object destroyed)", parent.url())));
                }
            }
            None => *self.name.write() = name.to_string(),
        }
        self.moved();
        debug!(url = %self.url(), "renamed");
        Ok(())
    }

    fn is_self_or_descendant_of(&self, other: &Object) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        let mut cursor = self.parent();
        while let Some(node) = cursor {
            if std::ptr::eq(Arc::as_ptr(&node), other) {
                return true;
            }
            cursor = node.parent();
        }
        false
    }

    /// Insert `child` under its (possibly collision-renamed) name. Refused,
    /// returning false, when either node is already destroyed.
    fn register_child(&self, child: &Arc<Object>) -> bool {
        let mut children = self.children.write();
        if !self.is_alive() || !child.is_alive() {
            return false;
        }
        let mut name = child.name();
        while children.contains_key(&name) {
            name = next_name(&name);
        }
        if name != child.name() {
            debug!(from = %child.name(), to = %name, "renamed on collision");
            *child.name.write() = name.clone();
        }
        let pos = if child.keep_last {
            children.len()
        } else {
            children
                .values()
                .position(|c| c.keep_last)
                .unwrap_or(children.len())
        };
        children.shift_insert(pos, name, child.clone());
        true
    }

    fn unregister_child(&self, child: &Arc<Object>) {
        let mut children = self.children.write();
        let name = child.name();
        let key = match children.get(&name) {
            Some(c) if Arc::ptr_eq(c, child) => Some(name),
            _ => children
                .iter()
                .find(|(_, c)| Arc::ptr_eq(c, child))
                .map(|(k, _)| k.clone()),
        };
        if let Some(key) = key {
            children.shift_remove(&key);
        }
    }

    /// Recompute url and root after a structural change, and refresh the
    /// root index for this node and its subtree.
    fn moved(&self) {
        let parent = self.parent();
        let (url, root) = match &parent {
            Some(p) => (format!("{}/{}", p.url(), self.name()), p.root_weak()),
            None if self.is_root => (String::new(), self.root_weak()),
            None => (self.name(), Weak::new()),
        };

        let old_url = std::mem::replace(&mut *self.url.write(), url.clone());
        let old_root = std::mem::replace(&mut *self.root.write(), root.clone());
        if let Some(r) = old_root.upgrade() {
            r.unregister(&old_url, self);
        }
        if let Some(r) = root.upgrade() {
            r.register(&url, &self.me);
        }

        for child in self.children() {
            child.moved();
        }
    }

    /// Destroy this node and its subtree. Handles to any of them stop
    /// resolving; aliases of any of them are destroyed too.
    pub fn destroy(self: &Arc<Self>) {
        if self.is_root {
            self.destroy_children();
            return;
        }
        {
            let _structure = self.structure.lock();
            if !self.alive.swap(false, Ordering::AcqRel) {
                return;
            }
            debug!(url = %self.url(), "destroy");

            if let Some(parent) = self.parent() {
                parent.unregister_child(self);
            }
            *self.parent.write() = Weak::new();
            let root = std::mem::take(&mut *self.root.write());
            if let Some(r) = root.upgrade() {
                r.unregister(&self.url(), self);
            }
        }

        let aliases = std::mem::take(&mut *self.aliases.lock());
        for alias in aliases.iter().filter_map(Weak::upgrade) {
            alias.destroy();
        }

        self.behavior.destroyed(self);
        self.destroy_children();
    }

    fn destroy_children(&self) {
        let children: Vec<Arc<Object>> = self.children.write().drain(..).map(|(_, c)| c).collect();
        for child in children {
            child.destroy();
        }
    }

    // -- aliases -----------------------------------------------------------

    pub(crate) fn register_alias(&self, alias: &Arc<Object>) {
        self.aliases.lock().push(Arc::downgrade(alias));
    }

    pub(crate) fn unregister_alias(&self, alias: &Object) {
        self.aliases
            .lock()
            .retain(|w| w.strong_count() > 0 && !std::ptr::eq(w.as_ptr(), alias));
    }

    pub fn alias_count(&self) -> usize {
        self.aliases
            .lock()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    // -- introspection -----------------------------------------------------

    /// Names of the children; those with children of their own end in `/`.
    pub fn list(&self) -> Value {
        self.children()
            .iter()
            .map(|c| {
                if c.has_children() {
                    Value::string(format!("{}/", c.name()))
                } else {
                    Value::string(c.name())
                }
            })
            .collect::<List>()
            .into()
    }

    /// `[[name, type], ...]` for every child, where type comes from
    /// `type_with_current_value`.
    pub fn list_with_type(&self) -> Value {
        self.children()
            .iter()
            .map(|c| {
                let name = if c.has_children() {
                    format!("{}/", c.name())
                } else {
                    c.name()
                };
                Value::list_of(vec![Value::string(name), c.type_with_current_value()])
            })
            .collect::<List>()
            .into()
    }

    /// Urls of every descendant relative to this node, depth first.
    pub fn tree(&self) -> Value {
        let base = self.url().len();
        let mut out = List::new();
        self.collect_tree(base, &mut out);
        out.into()
    }

    fn collect_tree(&self, base: usize, out: &mut List) {
        for child in self.children() {
            let url = child.url();
            out.push_back(Value::string(url.get(base..).unwrap_or(&url)));
            child.collect_tree(base, out);
        }
    }

    /// The meta-type with its sample replaced by the current value.
    pub fn type_with_current_value(&self) -> Value {
        let mut meta = self.meta_type();
        if meta.is_string() || meta.is_nil() || meta.is_empty() {
            return meta.or_nil();
        }
        if !meta.is_list() {
            return Error::internal(format!(
                "Invalid meta type. Should be a list (found '{}').",
                meta.type_tag()
            ))
            .into();
        }

        let sample = meta[0].clone();
        if sample.is_any() || sample.is_nil() {
            return meta;
        }
        let current = self.trigger(&Value::Nil);
        if current.is_nil() {
            return meta;
        }
        if current.type_id() != sample.type_id() {
            return Error::internal(format!(
                "Current value type not matching meta type (expected '{}' found '{}').",
                sample.type_tag(),
                current.type_tag()
            ))
            .into();
        }
        meta.set_value_at(0, current);
        meta
    }

    /// Collect the current values of the subtree as a Hash keyed by child
    /// name. Leaves answer with their value; Nil answers are skipped.
    pub fn to_hash(&self) -> Value {
        if !self.has_children() {
            return self.trigger(&Value::Nil);
        }
        let mut hash = Hash::new();
        for child in self.children() {
            let v = child.to_hash();
            if !v.is_nil() {
                hash.set(child.name(), v);
            }
        }
        hash.into()
    }

    /// Call each child named by a key of `value` with the associated value.
    /// Returns a Hash of per-key results; unknown keys get a not-found error.
    pub fn from_hash(&self, value: &Value) -> Value {
        let Some(hash) = value.as_hash() else {
            return Error::bad_request(format!(
                "{} expects a hash (found '{}')",
                self.url(),
                value.type_tag()
            ))
            .into();
        };
        let mut results = Hash::new();
        for (key, v) in hash.iter() {
            let result = match self.child(key) {
                Some(child) => child.trigger(v),
                None => Error::not_found(format!("{}/{}", self.url(), key)).into(),
            };
            results.set(key, result);
        }
        results.into()
    }

    /// True when no entry of a `from_hash` result is an Error.
    pub fn set_all_ok(&self, value: &Value) -> bool {
        match self.from_hash(value) {
            Value::Hash(results) => results.iter().all(|(_, v)| !v.is_error()),
            _ => false,
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("url", &self.url())
            .field("kind", &self.kind())
            .field("children", &self.child_count())
            .field("alive", &self.is_alive())
            .finish()
    }
}


/// `osc` -> `osc-1`, `osc-1` -> `osc-2`.
fn next_name(name: &str) -> String {
    if let Some((stem, suffix)) = name.rsplit_once('-') {
        if !stem.is_empty() && !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = suffix.parse::<u64>() {
                return format!("{}-{}", stem, n + 1);
            }
        }
    }
    format!("{}-1", name)
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::nodes::{Container, Native, Parameter, Placeholder};
    use crate::tree::signature;
    use crate::value::ErrorCode;
    use std::sync::Barrier;
    use std::thread;

    fn container(name: &str) -> Arc<Object> {
        Object::new(name, Container)
    }

    fn last(name: &str) -> Arc<Object> {
        Object::with_options(name, ObjectOptions::default().keep_last(), Container)
    }

    #[test]
    fn next_name_increments_suffix() {
        assert_eq!(next_name("osc"), "osc-1");
        assert_eq!(next_name("osc-1"), "osc-2");
        assert_eq!(next_name("osc-9"), "osc-10");
        assert_eq!(next_name("a-b"), "a-b-1");
        assert_eq!(next_name("-3"), "-3-1");
    }

    #[test]
    fn adopt_sets_url() {
        let synth = container("synth");
        let osc = synth.adopt(container("osc")).unwrap();
        assert_eq!(osc.url(), "synth/osc");
        assert!(Arc::ptr_eq(&osc.parent().unwrap(), &synth));
        assert_eq!(synth.child_names(), vec!["osc"]);
    }

    #[test]
    fn collision_renames() {
        let synth = container("synth");
        synth.adopt(container("osc")).unwrap();
        let second = synth.adopt(container("osc")).unwrap();
        let third = synth.adopt(container("osc")).unwrap();
        assert_eq!(second.name(), "osc-1");
        assert_eq!(third.name(), "osc-2");
        assert_eq!(synth.child_names(), vec!["osc", "osc-1", "osc-2"]);
    }

    #[test]
    fn keep_last_children_stay_at_the_end() {
        let parent = container("p");
        parent.adopt(last("z")).unwrap();
        parent.adopt(container("a")).unwrap();
        parent.adopt(last("y")).unwrap();
        parent.adopt(container("b")).unwrap();
        assert_eq!(parent.child_names(), vec!["a", "b", "z", "y"]);

        let flags: Vec<bool> = parent.children().iter().map(|c| c.keep_last()).collect();
        let first_last = flags.iter().position(|f| *f).unwrap();
        assert!(flags[first_last..].iter().all(|f| *f));
    }

    #[test]
    fn reparent_moves_between_parents() {
        let a = container("a");
        let b = container("b");
        let x = a.adopt(container("x")).unwrap();
        b.adopt(x.clone()).unwrap();
        assert_eq!(a.child_count(), 0);
        assert_eq!(x.url(), "b/x");
    }

    #[test]
    fn cannot_adopt_ancestor() {
        let a = container("a");
        let b = a.adopt(container("b")).unwrap();
        let err = b.adopt(a.clone()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::BadRequest);
        assert!(a.adopt(a.clone()).is_err());
    }

    #[test]
    fn detach_makes_url_the_name() {
        let a = container("a");
        let x = a.adopt(container("x")).unwrap();
        x.set_parent(None).unwrap();
        assert_eq!(x.url(), "x");
        assert!(x.parent().is_none());
    }

    #[test]
    fn rename_updates_descendant_urls() {
        let a = container("a");
        let b = a.adopt(container("b")).unwrap();
        let c = b.adopt(container("c")).unwrap();
        b.set_name("bee").unwrap();
        assert_eq!(c.url(), "a/bee/c");
        assert!(a.child("bee").is_some());
        assert!(b.set_name("no/slash").is_err());
    }

    #[test]
    fn rename_collides_with_sibling() {
        let a = container("a");
        a.adopt(container("x")).unwrap();
        let y = a.adopt(container("y")).unwrap();
        y.set_name("x").unwrap();
        assert_eq!(y.name(), "x-1");
    }

    #[test]
    fn destroy_detaches_subtree() {
        let a = container("a");
        let b = a.adopt(container("b")).unwrap();
        let c = b.adopt(container("c")).unwrap();
        b.destroy();
        assert!(!b.is_alive());
        assert!(!c.is_alive());
        assert_eq!(a.child_count(), 0);
        assert!(b.trigger(&Value::Nil).is_error());
        assert!(a.adopt(b.clone()).is_err());
    }

    #[test]
    fn adopt_into_destroyed_parent_is_refused() {
        let a = container("a");
        let gone = container("gone");
        let x = a.adopt(container("x")).unwrap();
        gone.destroy();
        let err = gone.adopt(x.clone()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(gone.child_count(), 0);
        assert!(x.is_alive());
        assert!(a.child("x").is_some());
    }

    #[test]
    fn destroy_racing_adopt_leaves_no_dead_child() {
        for _ in 0..2000 {
            let p1 = container("p1");
            let p2 = container("p2");
            let x = p1.adopt(container("x")).unwrap();
            let barrier = Barrier::new(2);

            thread::scope(|s| {
                s.spawn(|| {
                    barrier.wait();
                    x.destroy();
                });
                s.spawn(|| {
                    barrier.wait();
                    let _ = p2.adopt(x.clone());
                });
            });

            assert!(!x.is_alive());
            assert!(x.parent().is_none());
            assert!(p2.children().iter().all(|c| c.is_alive()));
            assert_eq!(p1.child_count(), 0);
            assert_eq!(p2.child_count(), 0);
        }
    }

    #[test]
    fn destroy_racing_parent_adopt_leaves_no_live_orphan() {
        for _ in 0..2000 {
            let a = container("a");
            let p = container("p");
            let x = a.adopt(container("x")).unwrap();
            let barrier = Barrier::new(2);

            thread::scope(|s| {
                s.spawn(|| {
                    barrier.wait();
                    p.destroy();
                });
                s.spawn(|| {
                    barrier.wait();
                    let _ = p.adopt(x.clone());
                });
            });

            assert_eq!(p.child_count(), 0);
            // Either the move lost (x stays put or is detached) or x went
            // down with its new parent.
            if x.is_alive() {
                assert!(x.parent().map_or(true, |q| Arc::ptr_eq(&q, &a)));
            } else {
                assert_eq!(a.child_count(), 0);
            }
        }
    }

    #[test]
    fn child_at_follows_order() {
        let p = container("p");
        p.adopt(container("a")).unwrap();
        p.adopt(container("b")).unwrap();
        assert_eq!(p.child_at(1).unwrap().get().unwrap().name(), "b");
        assert!(p.child_at(2).is_none());
    }

    #[test]
    fn list_marks_non_leaves() {
        let p = container("p");
        let a = p.adopt(container("a")).unwrap();
        a.adopt(container("inner")).unwrap();
        p.adopt(container("b")).unwrap();
        assert_eq!(p.list().to_string(), r#"["a/", "b"]"#);
    }

    #[test]
    fn tree_lists_relative_urls() {
        let p = container("p");
        let a = p.adopt(container("a")).unwrap();
        a.adopt(container("x")).unwrap();
        p.adopt(container("b")).unwrap();
        let urls: Vec<String> = p
            .tree()
            .as_list()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();
        assert_eq!(urls, vec!["/a", "/a/x", "/b"]);
    }

    #[test]
    fn type_with_current_value_substitutes_sample() {
        let freq = Parameter::object("freq", Value::real(440.0), "Hz");
        let t = freq.type_with_current_value();
        assert_eq!(t[0], Value::real(440.0));
    }

    #[test]
    fn type_with_current_value_reports_mismatch() {
        let liar = Object::with_options(
            "liar",
            ObjectOptions::new(signature::real_io()),
            Native::new(|_, _| Value::string("not a number")),
        );
        let t = liar.type_with_current_value();
        assert_eq!(t.error_code(), Some(ErrorCode::Internal));
        let msg = t.as_error().unwrap().message().to_string();
        assert!(msg.contains("expected 'f'"));
        assert!(msg.contains("found 's'"));
    }

    #[test]
    fn type_with_current_value_edge_cases() {
        let info = Object::with_options(
            "info",
            ObjectOptions::new(signature::info_only("just text")),
            Container,
        );
        assert_eq!(info.type_with_current_value(), Value::string("just text"));

        let untyped = container("untyped");
        assert!(untyped.type_with_current_value().is_nil());

        let bad = Object::with_options("bad", ObjectOptions::new(Value::real(1.0)), Container);
        let t = bad.type_with_current_value();
        assert!(t.as_error().unwrap().message().starts_with("Invalid meta type"));

        let quiet = Object::with_options(
            "quiet",
            ObjectOptions::new(signature::real_io()),
            Native::new(|_, _| Value::Nil),
        );
        assert_eq!(quiet.type_with_current_value(), signature::real_io());
    }

    #[test]
    fn to_hash_and_from_hash() {
        let synth = container("synth");
        synth.adopt(Parameter::object("freq", Value::real(440.0), "")).unwrap();
        synth.adopt(Parameter::object("wave", Value::string("sine"), "")).unwrap();
        synth.adopt(Placeholder::object("empty")).unwrap();

        let h = synth.to_hash();
        assert_eq!(h.to_json(), r#"{"freq":440.0,"wave":"sine"}"#);

        let update = Value::from_json(r#"{"freq": 220, "nope": 1}"#);
        let results = synth.from_hash(&update);
        assert_eq!(results["freq"], Value::real(220.0));
        assert_eq!(results["nope"].error_code(), Some(ErrorCode::NotFound));
        assert!(!synth.set_all_ok(&update));
        assert!(synth.set_all_ok(&Value::from_json(r#"{"wave": "saw"}"#)));
        assert_eq!(synth.child("wave").unwrap().trigger(&Value::Nil), Value::string("saw"));
    }

    #[test]
    fn from_hash_rejects_non_hash() {
        let synth = container("synth");
        assert_eq!(
            synth.from_hash(&Value::real(1.0)).error_code(),
            Some(ErrorCode::BadRequest)
        );
    }

    #[test]
    fn empty_argument_arrives_as_nil() {
        let echo = Object::new(
            "echo",
            Native::new(|_, v| Value::string(v.type_name())),
        );
        assert_eq!(echo.trigger(&Value::Empty), Value::string("nil"));
    }
}
