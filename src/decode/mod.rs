use indexmap::IndexMap;
use serde_json::Value;

use crate::arena::{Arena, Ref, Slot};
use crate::error::Error;
use crate::types::Number;
use crate::Result;

/// Parse the wire format back into an arena via the load path.
///
/// Classification per slot: strings and numbers are scalar slots; arrays
/// and objects whose entries are all null/bool/non-negative-integer are
/// reference-bearing composites; any other array or object is taken as an
/// opaque slot that the encoder had rendered verbatim.
pub fn from_str(input: &str) -> Result<Arena> {
    let raw: Value = serde_json::from_str(input)
        .map_err(|e| Error::decode(e.to_string()).with_location(e.line(), e.column()))?;
    let Value::Array(items) = raw else {
        return Err(Error::decode("expected a top-level array of slots"));
    };
    let count = items.len();
    let slots = items
        .iter()
        .enumerate()
        .map(|(index, value)| slot_from_value(index, value, count))
        .collect::<Result<Vec<Slot>>>()?;
    Ok(Arena::load(slots))
}

fn slot_from_value(slot: usize, value: &Value, count: usize) -> Result<Slot> {
    match value {
        Value::Null => Ok(Slot::Null),
        Value::Bool(b) => Ok(Slot::Bool(*b)),
        Value::Number(n) => Ok(Slot::Number(Number::from(n))),
        Value::String(s) => Ok(Slot::String(s.clone())),
        Value::Array(items) => {
            let refs: Option<Vec<Ref>> = items.iter().map(ref_from_value).collect();
            match refs {
                Some(refs) => {
                    check_bounds(slot, &refs, count)?;
                    Ok(Slot::Array(refs))
                }
                None => Ok(Slot::Opaque(value.clone())),
            }
        }
        Value::Object(map) => {
            let refs: Option<IndexMap<String, Ref>> = map
                .iter()
                .map(|(key, v)| ref_from_value(v).map(|r| (key.clone(), r)))
                .collect();
            match refs {
                Some(refs) => {
                    let values: Vec<Ref> = refs.values().copied().collect();
                    check_bounds(slot, &values, count)?;
                    Ok(Slot::Object(refs))
                }
                None => Ok(Slot::Opaque(value.clone())),
            }
        }
    }
}

fn ref_from_value(value: &Value) -> Option<Ref> {
    match value {
        Value::Null => Some(Ref::Null),
        Value::Bool(b) => Some(Ref::Bool(*b)),
        Value::Number(n) => n.as_u64().map(|u| Ref::Index(u as usize)),
        _ => None,
    }
}

fn check_bounds(slot: usize, refs: &[Ref], count: usize) -> Result<()> {
    for reference in refs {
        if let Ref::Index(index) = reference {
            if *index >= count {
                return Err(Error::decode(format!(
                    "slot {slot}: reference to index {index} out of range ({count} slots)"
                )));
            }
        }
    }
    Ok(())
}
