use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::types::Number;
use crate::view::ViewRef;

/// An object body: keys unique, insertion order preserved.
pub type Object = IndexMap<String, DocValue>;

/// A nested document value handed to the flattener.
///
/// Composite payloads are reference-counted so that two occurrences of the
/// *same* array or object (an alias, or a cycle) stay distinguishable from
/// two separately built but equal ones. Cloning a composite `DocValue`
/// clones the handle, not the payload, so clones alias.
#[derive(Clone, Debug, Default)]
pub enum DocValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Rc<RefCell<Vec<DocValue>>>),
    Object(Rc<RefCell<Object>>),
    /// Stored verbatim into one slot, never recursed into. May still fail
    /// downstream if the text encoder cannot represent it.
    Opaque(Rc<serde_json::Value>),
    /// A value previously resolved out of an arena. Feeding it back into the
    /// same arena reuses its slot index without allocating.
    View(ViewRef),
}

impl DocValue {
    pub fn array(items: Vec<DocValue>) -> Self {
        DocValue::Array(Rc::new(RefCell::new(items)))
    }

    pub fn object(entries: Object) -> Self {
        DocValue::Object(Rc::new(RefCell::new(entries)))
    }

    pub fn opaque(value: serde_json::Value) -> Self {
        DocValue::Opaque(Rc::new(value))
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, DocValue::Null)
    }

    pub const fn is_composite(&self) -> bool {
        matches!(self, DocValue::Array(_) | DocValue::Object(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            DocValue::Null => "null",
            DocValue::Bool(_) => "boolean",
            DocValue::Number(_) => "number",
            DocValue::String(_) => "string",
            DocValue::Array(_) => "array",
            DocValue::Object(_) => "object",
            DocValue::Opaque(_) => "opaque",
            DocValue::View(_) => "view",
        }
    }
}

impl From<bool> for DocValue {
    fn from(b: bool) -> Self {
        DocValue::Bool(b)
    }
}

impl From<&str> for DocValue {
    fn from(s: &str) -> Self {
        DocValue::String(s.to_string())
    }
}

impl From<String> for DocValue {
    fn from(s: String) -> Self {
        DocValue::String(s)
    }
}

impl From<Number> for DocValue {
    fn from(n: Number) -> Self {
        DocValue::Number(n)
    }
}

impl From<i64> for DocValue {
    fn from(n: i64) -> Self {
        DocValue::Number(Number::from(n))
    }
}

impl From<i32> for DocValue {
    fn from(n: i32) -> Self {
        DocValue::Number(Number::from(n))
    }
}

impl From<u64> for DocValue {
    fn from(n: u64) -> Self {
        DocValue::Number(Number::from(n))
    }
}

impl From<f64> for DocValue {
    fn from(n: f64) -> Self {
        DocValue::Number(Number::from(n))
    }
}

impl From<Vec<DocValue>> for DocValue {
    fn from(items: Vec<DocValue>) -> Self {
        DocValue::array(items)
    }
}

impl From<Object> for DocValue {
    fn from(entries: Object) -> Self {
        DocValue::object(entries)
    }
}

/// Builds a tree of fresh identities: every array and object in the JSON
/// input becomes a newly allocated composite, so nothing aliases.
impl From<serde_json::Value> for DocValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => DocValue::Null,
            serde_json::Value::Bool(b) => DocValue::Bool(b),
            serde_json::Value::Number(n) => DocValue::Number(Number::from(&n)),
            serde_json::Value::String(s) => DocValue::String(s),
            serde_json::Value::Array(items) => {
                DocValue::array(items.into_iter().map(DocValue::from).collect())
            }
            serde_json::Value::Object(map) => {
                let entries = map
                    .into_iter()
                    .map(|(key, value)| (key, DocValue::from(value)))
                    .collect();
                DocValue::object(entries)
            }
        }
    }
}

impl From<&serde_json::Value> for DocValue {
    fn from(value: &serde_json::Value) -> Self {
        value.clone().into()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::DocValue;

    #[rstest::rstest]
    fn test_clone_aliases_composites() {
        let arr = DocValue::array(vec![DocValue::from(1i64)]);
        let alias = arr.clone();
        if let (DocValue::Array(a), DocValue::Array(b)) = (&arr, &alias) {
            assert!(std::rc::Rc::ptr_eq(a, b));
            a.borrow_mut().push(DocValue::Null);
            assert_eq!(b.borrow().len(), 2);
        } else {
            panic!("expected arrays");
        }
    }

    #[rstest::rstest]
    fn test_from_json_builds_fresh_identities() {
        let value = DocValue::from(json!({"a": [1, 2], "b": null}));
        assert_eq!(value.type_name(), "object");
        let DocValue::Object(entries) = value else {
            panic!("expected object");
        };
        let entries = entries.borrow();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["a"].type_name(), "array");
        assert!(entries["b"].is_null());
    }

    #[rstest::rstest]
    fn test_scalar_conversions() {
        assert_eq!(DocValue::from("x").type_name(), "string");
        assert_eq!(DocValue::from(3.5f64).type_name(), "number");
        assert_eq!(DocValue::from(true).type_name(), "boolean");
    }
}
