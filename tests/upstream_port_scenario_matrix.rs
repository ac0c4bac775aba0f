//! Worked scenarios mirroring the ones jsonpath_ng's own test suite uses to
//! pin down edge cases around `Nothing`, existence, and operator
//! precedence.

use jqpath::JsonPath;
use serde_json::json;

fn values(path: &str, doc: &serde_json::Value) -> Vec<serde_json::Value> {
    JsonPath::compile(path).unwrap().find(doc).into_iter().map(|n| n.value).collect()
}

#[test]
fn null_value_is_distinct_from_missing_field() {
    let doc = json!({"a": null});
    assert_eq!(values("$.a", &doc), vec![json!(null)]);
    assert_eq!(values("$.b", &doc), Vec::<serde_json::Value>::new());
}

#[test]
fn existence_filter_keeps_explicit_null() {
    let doc = json!({"items": [{"v": null}, {"other": 1}]});
    assert_eq!(values("$.items[?(@.v)]", &doc), vec![json!({"v": null})]);
}

#[test]
fn match_requires_whole_string_search_allows_substring() {
    let doc = json!({"items": [{"s": "hello world"}, {"s": "hello"}]});
    assert_eq!(
        values(r#"$.items[?(match(@.s, "hello"))]"#, &doc),
        vec![json!({"s": "hello"})]
    );
    let mut matched = values(r#"$.items[?(search(@.s, "hello"))]"#, &doc);
    matched.sort_by_key(|v| v.to_string());
    let mut expected = vec![json!({"s": "hello world"}), json!({"s": "hello"})];
    expected.sort_by_key(|v| v.to_string());
    assert_eq!(matched, expected);
}

#[test]
fn descendants_with_filter_and_value_nothing_case() {
    let doc = json!({
        "a": {"price": 5},
        "b": {"a": {"price": 15}},
        "c": {"name": "no price here"}
    });
    let matched = values("$..[?(@.price)]", &doc);
    assert_eq!(matched.len(), 2);
}

#[test]
fn value_of_multi_node_path_is_nothing() {
    // `$..c` matches two nodes here, so `value($..c)` is Nothing and the
    // filter keeps elements where `length(@.a)` is also Nothing — not the
    // first of the two `c` values.
    let doc = json!({
        "c": "cd",
        "values": [{"a": "ab"}, {"c": "d"}, {"a": null}]
    });
    let mut matched = values("$..values[?(length(@.a)==value($..c))]", &doc);
    matched.sort_by_key(|v| v.to_string());
    let mut expected = vec![json!({"c": "d"}), json!({"a": null})];
    expected.sort_by_key(|v| v.to_string());
    assert_eq!(matched, expected);
}

#[test]
fn surrogate_pair_key_lookup() {
    let key = char::from_u32(0x1D11E).unwrap().to_string();
    let doc = json!({ key: "treble clef" });
    assert_eq!(values(r#"$["𝄞"]"#, &doc), vec![json!("treble clef")]);
}

#[test]
fn union_of_index_and_slice_preserves_order_and_duplicates() {
    let doc = json!([10, 20, 30, 40]);
    assert_eq!(values("$[0]|$[0:2]", &doc), vec![json!(10), json!(10), json!(20)]);
}

#[test]
fn and_binds_tighter_than_or() {
    // a && b || c: with a=false, b=true, c=true this is true only because
    // of the trailing `|| c`, not because `a && b` holds.
    let item = json!({"a": false, "b": true, "c": true});
    let doc = json!([item.clone()]);
    assert_eq!(values("$[?(@.a && @.b || @.c)]", &doc), vec![item]);
}
