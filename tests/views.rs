use rstest::rstest;
use serde_json::json;

use acrobatic_json::{Arena, DocValue, Resolved, Slot};

fn object_root(arena: &Arena) -> acrobatic_json::ObjectView {
    match arena.root() {
        Resolved::Object(view) => view,
        other => panic!("expected object root, got {}", other.type_name()),
    }
}

fn array_root(arena: &Arena) -> acrobatic_json::ArrayView {
    match arena.root() {
        Resolved::Array(view) => view,
        other => panic!("expected array root, got {}", other.type_name()),
    }
}

#[rstest]
fn test_lazy_navigation_by_key_and_position() {
    let arena = Arena::for_value(&DocValue::from(json!({"a": 1, "b": [1, "a"]})));
    let root = object_root(&arena);

    assert_eq!(root.len(), 2);
    assert!(root.contains_key("a"));
    assert_eq!(root.get("a").and_then(|v| v.as_i64()), Some(1));
    assert!(root.get("missing").is_none());

    let Some(Resolved::Array(b)) = root.get("b") else {
        panic!("expected array under \"b\"");
    };
    assert_eq!(b.len(), 2);
    assert_eq!(b.get(0).and_then(|v| v.as_i64()), Some(1));
    assert_eq!(
        b.get(1).and_then(|v| v.as_str().map(String::from)),
        Some("a".to_string())
    );
    assert!(b.get(2).is_none());
}

#[rstest]
fn test_iteration_preserves_insertion_order() {
    let arena = Arena::for_value(&DocValue::from(json!({"z": 1, "a": 2, "m": 3})));
    let root = object_root(&arena);
    let keys: Vec<&str> = root.keys().collect();
    assert_eq!(keys, vec!["z", "a", "m"]);

    let values: Vec<i64> = root.iter().filter_map(|(_, v)| v.as_i64()).collect();
    assert_eq!(values, vec![1, 2, 3]);
}

#[rstest]
fn test_null_and_bool_resolve_inline() {
    let arena = Arena::for_value(&DocValue::from(json!([null, true])));
    let root = array_root(&arena);
    assert!(root.get(0).unwrap().is_null());
    assert_eq!(root.get(1).and_then(|v| v.as_bool()), Some(true));
}

#[rstest]
fn test_set_routes_through_interning() {
    let arena = Arena::for_value(&DocValue::from(json!(["x", "y"])));
    assert!(!arena.is_dirty());

    let mut root = array_root(&arena);
    // "x" is already interned, so replacing "y" with "x" allocates nothing.
    let len_before = arena.len();
    root.set(1, &DocValue::from("x"));
    assert_eq!(arena.len(), len_before);
    assert!(arena.is_dirty());

    let encoded = acrobatic_json::encode::to_string(&arena).unwrap();
    assert_eq!(encoded, r#"[[1,1],"x","y"]"#);
}

#[rstest]
fn test_insert_and_remove_keys() {
    let arena = Arena::for_value(&DocValue::from(json!({"a": 1})));
    let mut root = object_root(&arena);

    root.insert("b", &DocValue::from(json!([true])));
    assert_eq!(root.len(), 2);
    let Some(Resolved::Array(b)) = root.get("b") else {
        panic!("expected inserted array");
    };
    assert_eq!(b.get(0).and_then(|v| v.as_bool()), Some(true));

    let removed = root.remove("a").unwrap();
    assert_eq!(removed.as_i64(), Some(1));
    assert_eq!(root.len(), 1);
    assert!(root.get("a").is_none());

    // The orphaned scalar slot stays behind; only the reference is gone.
    let slot_count = arena.len();
    assert!(arena
        .slots()
        .iter()
        .any(|slot| *slot == Slot::Number(acrobatic_json::Number::PosInt(1))));
    assert_eq!(arena.len(), slot_count);
}

#[rstest]
fn test_push_and_remove_positions() {
    let arena = Arena::for_value(&DocValue::from(json!([1])));
    let mut root = array_root(&arena);

    root.push(&DocValue::from("tail"));
    assert_eq!(root.len(), 2);

    let removed = root.remove(0).unwrap();
    assert_eq!(removed.as_i64(), Some(1));
    assert_eq!(root.len(), 1);
    assert_eq!(
        root.get(0).and_then(|v| v.as_str().map(String::from)),
        Some("tail".to_string())
    );
    assert!(root.remove(5).is_none());
}

#[rstest]
#[should_panic(expected = "out of bounds")]
fn test_set_out_of_bounds_panics() {
    let arena = Arena::for_value(&DocValue::from(json!([1])));
    let mut root = array_root(&arena);
    root.set(3, &DocValue::Null);
}

#[rstest]
fn test_writes_refresh_writer_but_stale_other_views() {
    let arena = Arena::for_value(&DocValue::from(json!(["old"])));
    let mut writer = array_root(&arena);
    let reader = array_root(&arena);

    writer.push(&DocValue::from("new"));

    assert_eq!(writer.len(), 2);
    // The reader still sees the snapshot taken at its construction.
    assert_eq!(reader.len(), 1);
    // A view resolved after the write picks up the new body.
    assert_eq!(array_root(&arena).len(), 2);
}

#[rstest]
fn test_feeding_root_view_back_creates_cycle() {
    let arena = Arena::for_value(&DocValue::from(json!(["seed"])));
    let mut root = array_root(&arena);

    root.push(&DocValue::from(array_root(&arena)));

    let encoded = acrobatic_json::encode::to_string(&arena).unwrap();
    assert_eq!(encoded, r#"[[1,0],"seed"]"#);
}

#[rstest]
fn test_foreign_view_is_reflattened_structurally() {
    let source = Arena::for_value(&DocValue::from(json!({"shared": [1, 2]})));
    let Some(shared) = object_root(&source).get("shared") else {
        panic!("expected shared array");
    };

    let target = Arena::for_value(&DocValue::from(json!(["seed"])));
    let mut root = array_root(&target);
    let foreign = DocValue::from(shared);
    root.push(&foreign);
    root.push(&foreign);

    let encoded = acrobatic_json::encode::to_string(&target).unwrap();
    // Both pushes collapse to one copied slot because the foreign slot's
    // identity is remembered.
    assert_eq!(encoded, r#"[[1,2,2],"seed",[3,4],1,2]"#);
}

#[rstest]
fn test_opaque_resolves_verbatim() {
    let arena = Arena::for_value(&DocValue::array(vec![DocValue::opaque(json!({"w": [1]}))]));
    let root = array_root(&arena);
    let Some(Resolved::Opaque(raw)) = root.get(0) else {
        panic!("expected opaque");
    };
    assert_eq!(raw, json!({"w": [1]}));
}
