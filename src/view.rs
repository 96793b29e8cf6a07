use std::rc::Rc;

use indexmap::IndexMap;

use crate::arena::{Arena, Ref};
use crate::types::{DocValue, Number};

/// A bare `(arena, slot index)` pair, the payload of `DocValue::View`.
#[derive(Debug, Clone)]
pub struct ViewRef {
    pub(crate) arena: Arena,
    pub(crate) index: usize,
}

impl ViewRef {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// The result of resolving one slot: scalars verbatim, composites as lazy
/// views that dereference child indices only on access.
#[derive(Debug, Clone)]
pub enum Resolved {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(ArrayView),
    Object(ObjectView),
    Opaque(serde_json::Value),
}

impl Resolved {
    pub const fn is_null(&self) -> bool {
        matches!(self, Resolved::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Resolved::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Resolved::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Resolved::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Resolved::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayView> {
        match self {
            Resolved::Array(view) => Some(view),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectView> {
        match self {
            Resolved::Object(view) => Some(view),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Resolved::Null => "null",
            Resolved::Bool(_) => "boolean",
            Resolved::Number(_) => "number",
            Resolved::String(_) => "string",
            Resolved::Array(_) => "array",
            Resolved::Object(_) => "object",
            Resolved::Opaque(_) => "opaque",
        }
    }
}

/// Resolved values feed back into flattening: views keep their slot
/// binding, so re-interning one into its own arena allocates nothing.
impl From<Resolved> for DocValue {
    fn from(resolved: Resolved) -> Self {
        match resolved {
            Resolved::Null => DocValue::Null,
            Resolved::Bool(b) => DocValue::Bool(b),
            Resolved::Number(n) => DocValue::Number(n),
            Resolved::String(s) => DocValue::String(s),
            Resolved::Array(view) => view.into(),
            Resolved::Object(view) => view.into(),
            Resolved::Opaque(v) => DocValue::opaque(v),
        }
    }
}

impl From<ArrayView> for DocValue {
    fn from(view: ArrayView) -> Self {
        DocValue::View(ViewRef {
            arena: view.arena,
            index: view.index,
        })
    }
}

impl From<ObjectView> for DocValue {
    fn from(view: ObjectView) -> Self {
        DocValue::View(ViewRef {
            arena: view.arena,
            index: view.index,
        })
    }
}

/// Lazy projection of an array slot.
///
/// Holds a snapshot of the slot body taken when the view was constructed;
/// reads resolve child indices through the arena on demand. Writes route
/// the new value through interning, update the slot, and refresh this
/// view's snapshot — but snapshots held by *other* views of the same slot
/// go stale.
#[derive(Debug, Clone)]
pub struct ArrayView {
    arena: Arena,
    index: usize,
    snapshot: Rc<Vec<Ref>>,
}

impl ArrayView {
    pub(crate) fn new(arena: Arena, index: usize, snapshot: Rc<Vec<Ref>>) -> Self {
        Self {
            arena,
            index,
            snapshot,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    pub fn get(&self, pos: usize) -> Option<Resolved> {
        self.snapshot
            .get(pos)
            .map(|reference| self.arena.resolve_ref(*reference))
    }

    pub fn iter(&self) -> impl Iterator<Item = Resolved> + '_ {
        self.snapshot
            .iter()
            .map(|reference| self.arena.resolve_ref(*reference))
    }

    /// Replace the element at `pos`, interning `value` into the arena.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of bounds.
    pub fn set(&mut self, pos: usize, value: &DocValue) {
        let len = self.len();
        if pos >= len {
            panic!("index {pos} out of bounds for array view of length {len}");
        }
        let reference = self.arena.intern(value);
        self.snapshot = self.arena.write_array_body(self.index, |items| {
            items[pos] = reference;
        });
    }

    /// Append `value`, interning it into the arena.
    pub fn push(&mut self, value: &DocValue) {
        let reference = self.arena.intern(value);
        self.snapshot = self.arena.write_array_body(self.index, |items| {
            items.push(reference);
        });
    }

    /// Remove and resolve the element at `pos`. The removed value's slot
    /// stays in the arena; only the reference goes away.
    pub fn remove(&mut self, pos: usize) -> Option<Resolved> {
        let removed = self.get(pos)?;
        self.snapshot = self.arena.write_array_body(self.index, |items| {
            items.remove(pos);
        });
        Some(removed)
    }

    pub(crate) fn snapshot(&self) -> &Rc<Vec<Ref>> {
        &self.snapshot
    }

    pub(crate) fn arena(&self) -> &Arena {
        &self.arena
    }
}

/// Lazy projection of an object slot. Same snapshot semantics as
/// [`ArrayView`], keyed access instead of positional.
#[derive(Debug, Clone)]
pub struct ObjectView {
    arena: Arena,
    index: usize,
    snapshot: Rc<IndexMap<String, Ref>>,
}

impl ObjectView {
    pub(crate) fn new(arena: Arena, index: usize, snapshot: Rc<IndexMap<String, Ref>>) -> Self {
        Self {
            arena,
            index,
            snapshot,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.snapshot.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<Resolved> {
        self.snapshot
            .get(key)
            .map(|reference| self.arena.resolve_ref(*reference))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.snapshot.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Resolved)> {
        self.snapshot
            .iter()
            .map(|(key, reference)| (key.as_str(), self.arena.resolve_ref(*reference)))
    }

    /// Insert or replace `key`, interning `value` into the arena. Existing
    /// keys keep their insertion position.
    pub fn insert(&mut self, key: impl Into<String>, value: &DocValue) {
        let key = key.into();
        let reference = self.arena.intern(value);
        self.snapshot = self.arena.write_object_body(self.index, |entries| {
            entries.insert(key, reference);
        });
    }

    /// Remove and resolve `key`. The removed value's slot stays in the
    /// arena; only the reference goes away. Later entries shift up to keep
    /// insertion order compact.
    pub fn remove(&mut self, key: &str) -> Option<Resolved> {
        let removed = self.get(key)?;
        self.snapshot = self.arena.write_object_body(self.index, |entries| {
            entries.shift_remove(key);
        });
        Some(removed)
    }

    pub(crate) fn snapshot(&self) -> &Rc<IndexMap<String, Ref>> {
        &self.snapshot
    }

    pub(crate) fn arena(&self) -> &Arena {
        &self.arena
    }
}
