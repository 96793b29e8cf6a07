use std::any::Any;
use std::cell::{Ref as CellRef, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::types::{DocValue, Number, Object};
use crate::view::{ArrayView, ObjectView, Resolved, ViewRef};

/// A reference-position value inside a composite slot.
///
/// Null and booleans are stored literally where they occur; everything else
/// is the index of the slot holding the interned value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ref {
    Null,
    Bool(bool),
    Index(usize),
}

/// One addressable element of the arena.
///
/// `Null` doubles as the transient placeholder pushed while a composite's
/// body is still being built; every placeholder is overwritten before the
/// flattening call that pushed it returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Ref>),
    Object(IndexMap<String, Ref>),
    Opaque(serde_json::Value),
}

impl Slot {
    pub fn type_name(&self) -> &'static str {
        match self {
            Slot::Null => "null",
            Slot::Bool(_) => "boolean",
            Slot::Number(_) => "number",
            Slot::String(_) => "string",
            Slot::Array(_) => "array",
            Slot::Object(_) => "object",
            Slot::Opaque(_) => "opaque",
        }
    }
}

/// Interning key for scalar slots, by value equality. Floats key on their
/// bit pattern so `-0.0` and `0.0` (and distinct NaN payloads) stay apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ScalarKey {
    PosInt(u64),
    NegInt(i64),
    FloatBits(u64),
    Text(String),
}

impl ScalarKey {
    fn from_number(n: Number) -> Self {
        match n {
            Number::PosInt(u) => ScalarKey::PosInt(u),
            Number::NegInt(i) if i >= 0 => ScalarKey::PosInt(i as u64),
            Number::NegInt(i) => ScalarKey::NegInt(i),
            Number::Float(f) => ScalarKey::FloatBits(f.to_bits()),
        }
    }
}

/// Interning key for composite slots, by identity rather than content.
/// `Ptr` is the address of the caller's shared payload; `Foreign` is a slot
/// of another arena being re-flattened into this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum IdentityKey {
    Ptr(usize),
    Foreign(usize, usize),
}

enum Reserved {
    /// Already interned, or falls inside a pre-loaded region: use as-is.
    Known(usize),
    /// Freshly reserved; a placeholder sits at this index awaiting `fill`.
    Fresh(usize),
}

/// Identity table entry. The pinned allocation keeps the keyed address
/// from being handed to a different composite while this entry can still
/// match it.
struct IdentityEntry {
    index: usize,
    pin: Option<Rc<dyn Any>>,
}

impl fmt::Debug for IdentityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityEntry")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

/// Cached snapshot of a composite slot's body, shared by every view handed
/// out for that slot.
#[derive(Debug, Clone)]
pub(crate) enum ViewBody {
    Array(Rc<Vec<Ref>>),
    Object(Rc<IndexMap<String, Ref>>),
}

#[derive(Debug, Default)]
struct ArenaInner {
    slots: Vec<Slot>,
    scalar_ids: HashMap<ScalarKey, usize>,
    identity_ids: HashMap<IdentityKey, IdentityEntry>,
    next_id: usize,
    dirty: bool,
    views: HashMap<usize, ViewBody>,
}

/// The flattened representation of a document: an ordered slot sequence
/// plus the interning tables that built it.
///
/// `Arena` is a cheap-to-clone handle; clones share state. It is
/// deliberately `!Send`/`!Sync`: one logical caller owns an arena at a
/// time, and the multi-step interning procedure has no internal atomicity.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    inner: Rc<RefCell<ArenaInner>>,
}

impl Arena {
    /// Flatten `value` into a fresh arena.
    ///
    /// Slot 0 holds the flattened root.
    ///
    /// # Panics
    ///
    /// Panics if the root does not land in slot 0, which happens exactly
    /// when `value` is a bare null or boolean (those are never given slots).
    pub fn for_value(value: &DocValue) -> Arena {
        let arena = Arena::load(Vec::new());
        let root = arena.intern(value);
        assert_eq!(root, Ref::Index(0), "root of a fresh arena must land in slot 0");
        arena.inner.borrow_mut().dirty = false;
        arena
    }

    /// Wrap an already-flattened slot sequence.
    ///
    /// No interning is performed over the existing slots; both tables start
    /// empty and `next_id` starts past the loaded region, so later
    /// flattening calls never dedup against pre-existing content.
    pub fn load(slots: Vec<Slot>) -> Arena {
        let next_id = slots.len();
        Arena {
            inner: Rc::new(RefCell::new(ArenaInner {
                slots,
                next_id,
                ..ArenaInner::default()
            })),
        }
    }

    /// An arena holding a single empty object.
    pub fn new_object() -> Arena {
        Arena::for_value(&DocValue::object(Object::new()))
    }

    /// An arena holding a single empty array.
    pub fn new_array() -> Arena {
        Arena::for_value(&DocValue::array(Vec::new()))
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().slots.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.borrow().dirty
    }

    /// Reset the dirty flag, e.g. after persisting the encoded arena.
    pub fn mark_clean(&self) {
        self.inner.borrow_mut().dirty = false;
    }

    /// Borrow the raw slot sequence. This is the wire-format payload.
    pub fn slots(&self) -> CellRef<'_, [Slot]> {
        CellRef::map(self.inner.borrow(), |inner| inner.slots.as_slice())
    }

    /// Resolve slot 0, the root of the originally flattened value.
    pub fn root(&self) -> Resolved {
        self.resolve(0)
    }

    /// Resolve one slot: scalars come back verbatim, composite slots come
    /// back as lazy views. Repeated resolution of the same index returns
    /// views over one shared snapshot.
    ///
    /// # Panics
    ///
    /// Panics if `index` names no slot. A dangling index cannot be produced
    /// by flattening, so it signals a corrupted or mismatched arena.
    pub fn resolve(&self, index: usize) -> Resolved {
        {
            let inner = self.inner.borrow();
            let slot = inner.slots.get(index).unwrap_or_else(|| {
                panic!(
                    "dangling reference: slot {index} out of range for arena of {} slots",
                    inner.slots.len()
                )
            });
            match slot {
                Slot::Null => return Resolved::Null,
                Slot::Bool(b) => return Resolved::Bool(*b),
                Slot::Number(n) => return Resolved::Number(*n),
                Slot::String(s) => return Resolved::String(s.clone()),
                Slot::Opaque(v) => return Resolved::Opaque(v.clone()),
                Slot::Array(_) | Slot::Object(_) => {}
            }
        }
        match self.view_body(index) {
            ViewBody::Array(snapshot) => {
                Resolved::Array(ArrayView::new(self.clone(), index, snapshot))
            }
            ViewBody::Object(snapshot) => {
                Resolved::Object(ObjectView::new(self.clone(), index, snapshot))
            }
        }
    }

    /// Resolve a reference-position value from a composite slot body.
    pub fn resolve_ref(&self, reference: Ref) -> Resolved {
        match reference {
            Ref::Null => Resolved::Null,
            Ref::Bool(b) => Resolved::Bool(b),
            Ref::Index(index) => self.resolve(index),
        }
    }

    fn view_body(&self, index: usize) -> ViewBody {
        let mut inner = self.inner.borrow_mut();
        if let Some(body) = inner.views.get(&index) {
            return body.clone();
        }
        let body = match &inner.slots[index] {
            Slot::Array(items) => ViewBody::Array(Rc::new(items.clone())),
            Slot::Object(entries) => ViewBody::Object(Rc::new(entries.clone())),
            other => panic!("slot {index} is not composite ({})", other.type_name()),
        };
        inner.views.insert(index, body.clone());
        body
    }

    /// Flatten one value into this arena, returning its reference-position
    /// form: a literal for null/bool, otherwise the index of its slot.
    ///
    /// Composites record their table entry and reserve their index before
    /// their children are examined, so a cycle re-entering the same
    /// composite hits the table instead of recursing forever.
    pub(crate) fn intern(&self, value: &DocValue) -> Ref {
        match value {
            DocValue::Null => Ref::Null,
            DocValue::Bool(b) => Ref::Bool(*b),
            DocValue::Number(n) => {
                let key = ScalarKey::from_number(*n);
                let n = *n;
                Ref::Index(self.intern_scalar(key, || Slot::Number(n)))
            }
            DocValue::String(s) => {
                let key = ScalarKey::Text(s.clone());
                let s = s.clone();
                Ref::Index(self.intern_scalar(key, || Slot::String(s)))
            }
            DocValue::Array(items) => {
                let key = IdentityKey::Ptr(Rc::as_ptr(items) as usize);
                let pin: Rc<dyn Any> = items.clone();
                let index = match self.reserve(key, Some(pin)) {
                    Reserved::Known(index) => return Ref::Index(index),
                    Reserved::Fresh(index) => index,
                };
                let body: Vec<Ref> = items.borrow().iter().map(|item| self.intern(item)).collect();
                self.fill(index, Slot::Array(body));
                Ref::Index(index)
            }
            DocValue::Object(entries) => {
                let key = IdentityKey::Ptr(Rc::as_ptr(entries) as usize);
                let pin: Rc<dyn Any> = entries.clone();
                let index = match self.reserve(key, Some(pin)) {
                    Reserved::Known(index) => return Ref::Index(index),
                    Reserved::Fresh(index) => index,
                };
                let body: IndexMap<String, Ref> = entries
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), self.intern(v)))
                    .collect();
                self.fill(index, Slot::Object(body));
                Ref::Index(index)
            }
            DocValue::Opaque(raw) => {
                let key = IdentityKey::Ptr(Rc::as_ptr(raw) as usize);
                let pin: Rc<dyn Any> = raw.clone();
                let index = match self.reserve(key, Some(pin)) {
                    Reserved::Known(index) => return Ref::Index(index),
                    Reserved::Fresh(index) => index,
                };
                self.fill(index, Slot::Opaque((**raw).clone()));
                Ref::Index(index)
            }
            DocValue::View(view) if self.ptr_eq(&view.arena) => Ref::Index(view.index),
            DocValue::View(view) => self.intern_foreign(view),
        }
    }

    /// Flatten a slot of another arena into this one, structurally. The
    /// foreign `(arena, index)` pair serves as the identity key, so two
    /// references to the same foreign slot still collapse here.
    fn intern_foreign(&self, view: &ViewRef) -> Ref {
        match view.arena.resolve(view.index) {
            Resolved::Null => Ref::Null,
            Resolved::Bool(b) => Ref::Bool(b),
            Resolved::Number(n) => {
                let key = ScalarKey::from_number(n);
                Ref::Index(self.intern_scalar(key, || Slot::Number(n)))
            }
            Resolved::String(s) => {
                let key = ScalarKey::Text(s.clone());
                Ref::Index(self.intern_scalar(key, || Slot::String(s)))
            }
            Resolved::Opaque(raw) => {
                let key = IdentityKey::Foreign(view.arena.addr(), view.index);
                let index = match self.reserve(key, Some(view.arena.pin())) {
                    Reserved::Known(index) => return Ref::Index(index),
                    Reserved::Fresh(index) => index,
                };
                self.fill(index, Slot::Opaque(raw));
                Ref::Index(index)
            }
            Resolved::Array(array) => {
                let key = IdentityKey::Foreign(view.arena.addr(), view.index);
                let index = match self.reserve(key, Some(view.arena.pin())) {
                    Reserved::Known(index) => return Ref::Index(index),
                    Reserved::Fresh(index) => index,
                };
                let foreign = array.arena().clone();
                let body: Vec<Ref> = array
                    .snapshot()
                    .iter()
                    .map(|child| self.intern_foreign_ref(&foreign, *child))
                    .collect();
                self.fill(index, Slot::Array(body));
                Ref::Index(index)
            }
            Resolved::Object(object) => {
                let key = IdentityKey::Foreign(view.arena.addr(), view.index);
                let index = match self.reserve(key, Some(view.arena.pin())) {
                    Reserved::Known(index) => return Ref::Index(index),
                    Reserved::Fresh(index) => index,
                };
                let foreign = object.arena().clone();
                let body: IndexMap<String, Ref> = object
                    .snapshot()
                    .iter()
                    .map(|(k, child)| (k.clone(), self.intern_foreign_ref(&foreign, *child)))
                    .collect();
                self.fill(index, Slot::Object(body));
                Ref::Index(index)
            }
        }
    }

    fn intern_foreign_ref(&self, foreign: &Arena, child: Ref) -> Ref {
        match child {
            Ref::Null => Ref::Null,
            Ref::Bool(b) => Ref::Bool(b),
            Ref::Index(index) => self.intern_foreign(&ViewRef {
                arena: foreign.clone(),
                index,
            }),
        }
    }

    fn intern_scalar(&self, key: ScalarKey, build: impl FnOnce() -> Slot) -> usize {
        let mut inner = self.inner.borrow_mut();
        if let Some(&index) = inner.scalar_ids.get(&key) {
            return index;
        }
        let index = inner.next_id;
        inner.next_id += 1;
        inner.scalar_ids.insert(key, index);
        if index < inner.slots.len() {
            // Pre-loaded region: taken as-is, never re-filled.
            return index;
        }
        inner.slots.push(build());
        inner.dirty = true;
        index
    }

    /// Reserve an index for a composite and record its table entry. The
    /// entry must land in the table before the caller recurses into the
    /// composite's children; that ordering is what terminates cycles.
    ///
    /// `pin` must hold the allocation behind a `Ptr` key; an address-based
    /// key is only valid while its allocation is alive.
    fn reserve(&self, key: IdentityKey, pin: Option<Rc<dyn Any>>) -> Reserved {
        let mut inner = self.inner.borrow_mut();
        if let Some(entry) = inner.identity_ids.get(&key) {
            return Reserved::Known(entry.index);
        }
        let index = inner.next_id;
        inner.next_id += 1;
        inner.identity_ids.insert(key, IdentityEntry { index, pin });
        if index < inner.slots.len() {
            // Pre-loaded region: taken as-is, never re-filled.
            return Reserved::Known(index);
        }
        inner.slots.push(Slot::Null);
        Reserved::Fresh(index)
    }

    fn fill(&self, index: usize, slot: Slot) {
        let mut inner = self.inner.borrow_mut();
        inner.slots[index] = slot;
        inner.dirty = true;
    }

    /// Rewrite an array slot's body in place, refreshing the cached view
    /// snapshot. Used by the view write path.
    pub(crate) fn write_array_body(
        &self,
        index: usize,
        edit: impl FnOnce(&mut Vec<Ref>),
    ) -> Rc<Vec<Ref>> {
        let mut inner = self.inner.borrow_mut();
        let Slot::Array(items) = &mut inner.slots[index] else {
            panic!("slot {index} is not an array");
        };
        edit(items);
        let snapshot = Rc::new(items.clone());
        inner.views.insert(index, ViewBody::Array(snapshot.clone()));
        inner.dirty = true;
        snapshot
    }

    /// Rewrite an object slot's body in place, refreshing the cached view
    /// snapshot. Used by the view write path.
    pub(crate) fn write_object_body(
        &self,
        index: usize,
        edit: impl FnOnce(&mut IndexMap<String, Ref>),
    ) -> Rc<IndexMap<String, Ref>> {
        let mut inner = self.inner.borrow_mut();
        let Slot::Object(entries) = &mut inner.slots[index] else {
            panic!("slot {index} is not an object");
        };
        edit(entries);
        let snapshot = Rc::new(entries.clone());
        inner.views.insert(index, ViewBody::Object(snapshot.clone()));
        inner.dirty = true;
        snapshot
    }

    pub(crate) fn ptr_eq(&self, other: &Arena) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.inner) as usize
    }

    pub(crate) fn pin(&self) -> Rc<dyn Any> {
        self.inner.clone()
    }
}
