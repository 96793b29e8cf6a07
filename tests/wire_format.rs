use rstest::rstest;
use serde_json::json;

use acrobatic_json::{encode, Arena, DocValue, ErrorKind, Number, Resolved};

#[rstest]
#[case(json!({"a": 1, "b": [1, "a"]}))]
#[case(json!([null, true, -7, 3.25, "x", {"k": "x"}]))]
#[case(json!({"o": {}, "a": []}))]
fn test_encode_load_reencode_is_stable(#[case] input: serde_json::Value) {
    let arena = Arena::for_value(&DocValue::from(&input));
    let encoded = encode::to_string(&arena).unwrap();

    let reloaded = acrobatic_json::loads(&encoded).unwrap();
    assert_eq!(*arena.slots(), *reloaded.slots());
    assert_eq!(encode::to_string(&reloaded).unwrap(), encoded);
}

#[rstest]
fn test_loaded_arena_resolves_like_built_one() {
    let arena = acrobatic_json::loads(r#"[{"a":1,"b":2},1,[1,3],"a"]"#).unwrap();
    let Resolved::Object(root) = arena.root() else {
        panic!("expected object root");
    };
    assert_eq!(root.get("a").and_then(|v| v.as_i64()), Some(1));
    let Some(Resolved::Array(b)) = root.get("b") else {
        panic!("expected array under \"b\"");
    };
    assert_eq!(b.get(0).and_then(|v| v.as_i64()), Some(1));
    assert_eq!(
        b.get(1).and_then(|v| v.as_str().map(String::from)),
        Some("a".to_string())
    );
}

#[rstest]
fn test_loaded_arena_does_not_dedup_against_existing_slots() {
    // Loading never rebuilds the interning tables, so a value equal to a
    // pre-existing slot still gets a fresh slot.
    let arena = acrobatic_json::loads(r#"[[1],"x"]"#).unwrap();
    let Resolved::Array(mut root) = arena.root() else {
        panic!("expected array root");
    };
    root.push(&DocValue::from("x"));

    assert_eq!(arena.len(), 3);
    assert_eq!(encode::to_string(&arena).unwrap(), r#"[[1,2],"x","x"]"#);
    assert!(arena.is_dirty());
}

#[rstest]
fn test_to_vec_matches_to_string() {
    let arena = Arena::for_value(&DocValue::from(json!(["x", ["x"]])));
    let text = encode::to_string(&arena).unwrap();
    let bytes = encode::to_vec(&arena).unwrap();
    assert_eq!(bytes, text.as_bytes());
}

#[rstest]
fn test_to_writer_produces_wire_format() {
    let arena = Arena::for_value(&DocValue::from(json!([true, 2])));
    let mut out = Vec::new();
    acrobatic_json::to_writer(&mut out, &arena).unwrap();
    assert_eq!(out, br#"[[true,1],2]"#);
}

#[rstest]
fn test_dumps_non_finite_float_reports_encode_error() {
    let value = DocValue::array(vec![DocValue::Number(Number::Float(f64::INFINITY))]);
    let error = acrobatic_json::dumps(&value).unwrap_err();
    assert_eq!(error.kind, ErrorKind::Encode);
}

#[rstest]
fn test_loads_rejects_malformed_input() {
    let error = acrobatic_json::loads("not json").unwrap_err();
    assert_eq!(error.kind, ErrorKind::Decode);
    assert!(error.location.is_some());

    let error = acrobatic_json::loads("42").unwrap_err();
    assert_eq!(error.kind, ErrorKind::Decode);
}

#[rstest]
fn test_loads_rejects_dangling_reference() {
    let error = acrobatic_json::loads(r#"[[1,7],"x"]"#).unwrap_err();
    assert_eq!(error.kind, ErrorKind::Decode);
    assert!(error.message.contains("index 7"));
}
