//! Flatten nested document values into an interned slot arena.
//!
//! Every composite value in the input is replaced by the integer index of
//! the slot holding its expanded form; equal scalars and identical (same
//! object) composites collapse to one slot. The arena is itself a plain
//! JSON array, so the wire format is just its compact encoding. Shared
//! subtrees and cycles flatten to finite output because a composite's slot
//! index is recorded before its children are examined.
//!
//! ```
//! use acrobatic_json::DocValue;
//! use serde_json::json;
//!
//! let value = DocValue::from(json!({"a": 1, "b": [1, "a"]}));
//! let encoded = acrobatic_json::dumps(&value)?;
//! assert_eq!(encoded, r#"[{"a":1,"b":2},1,[1,3],"a"]"#);
//! # Ok::<(), acrobatic_json::Error>(())
//! ```
//!
//! Reading back goes through lazy views rather than eager rehydration:
//!
//! ```
//! use acrobatic_json::Resolved;
//!
//! let arena = acrobatic_json::loads(r#"[{"a":1,"b":2},1,[1,3],"a"]"#)?;
//! let Resolved::Object(root) = arena.root() else { unreachable!() };
//! let Some(Resolved::Array(b)) = root.get("b") else { unreachable!() };
//! assert_eq!(b.get(1).and_then(|v| v.as_str().map(String::from)), Some("a".into()));
//! # Ok::<(), acrobatic_json::Error>(())
//! ```
//!
//! Flattening recurses once per nesting level. Pathologically deep
//! non-cyclic input can exhaust the stack; bounding input depth is the
//! caller's responsibility.

pub mod arena;
pub mod decode;
pub mod encode;
pub mod error;
pub mod types;
pub mod view;

use std::io::Write;

pub use crate::arena::{Arena, Ref, Slot};
pub use crate::error::{Error, ErrorKind, Location};
pub use crate::types::{DocValue, Number, Object};
pub use crate::view::{ArrayView, ObjectView, Resolved};

pub type Result<T> = std::result::Result<T, Error>;

/// Flatten `value` into a fresh arena and return its compact encoding.
pub fn dumps(value: &DocValue) -> Result<String> {
    let arena = Arena::for_value(value);
    encode::to_string(&arena)
}

/// Parse a previously encoded arena. Inverse of [`dumps`] up to interning
/// tables, which start empty on the loaded arena.
pub fn loads(input: &str) -> Result<Arena> {
    decode::from_str(input)
}

/// Encode an existing arena to a writer, compact separators.
pub fn to_writer<W: Write>(writer: W, arena: &Arena) -> Result<()> {
    encode::to_writer(writer, arena)
}
