use std::io::Write;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::arena::{Arena, Ref, Slot};
use crate::error::Error;
use crate::types::Number;
use crate::Result;

/// Encode the arena's raw slot sequence as a compact JSON array.
///
/// serde_json's default writer emits no whitespace, which is exactly the
/// wire format: no envelope, no version tag, slot 0 is the root by
/// convention.
pub fn to_string(arena: &Arena) -> Result<String> {
    serde_json::to_string(&*arena.slots()).map_err(|e| Error::encode(e.to_string()))
}

pub fn to_vec(arena: &Arena) -> Result<Vec<u8>> {
    serde_json::to_vec(&*arena.slots()).map_err(|e| Error::encode(e.to_string()))
}

pub fn to_writer<W: Write>(writer: W, arena: &Arena) -> Result<()> {
    serde_json::to_writer(writer, &*arena.slots()).map_err(|e| Error::encode(e.to_string()))
}

impl Serialize for Ref {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Ref::Null => serializer.serialize_unit(),
            Ref::Bool(b) => serializer.serialize_bool(*b),
            Ref::Index(index) => serializer.serialize_u64(*index as u64),
        }
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Number::PosInt(u) => serializer.serialize_u64(*u),
            Number::NegInt(i) => serializer.serialize_i64(*i),
            Number::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Number::Float(f) => Err(serde::ser::Error::custom(format!(
                "number {f} has no JSON representation"
            ))),
        }
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Slot::Null => serializer.serialize_unit(),
            Slot::Bool(b) => serializer.serialize_bool(*b),
            Slot::Number(n) => n.serialize(serializer),
            Slot::String(s) => serializer.serialize_str(s),
            Slot::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Slot::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, reference) in entries {
                    map.serialize_entry(key, reference)?;
                }
                map.end()
            }
            Slot::Opaque(v) => v.serialize(serializer),
        }
    }
}
