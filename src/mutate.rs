//! In-place mutation helpers: `update`, `update_or_create`, and `filter`.
//!
//! These operate on `&mut Value` directly rather than through the
//! [`crate::datum::Datum`] zipper used for reads — aliasing rules mean the
//! zipper's borrowed-reference design can't also hand out a mutable
//! reference to the same node, so mutation walks the tree a second way.
//! Selectors that can't match more than a fixed shape (`where`, `wherenot`,
//! `` `parent` ``, `&`) are accepted by the parser but are no-ops here: a
//! document has no well-defined "write" through a node relationship built
//! for filtering or intersecting reads.

use crate::ast::JsonPathNode;
use serde_json::Value;

/// Replaces every node `path` matches with the result of calling `f` on its
/// current value. Missing nodes are left untouched.
pub fn update<F: FnMut(&Value) -> Value>(root: &mut Value, path: &JsonPathNode, mut f: F) {
    for_each_mut(path, root, &mut |v| {
        *v = f(v);
    });
}

/// Like [`update`], but creates the object keys or array slots a path names
/// when they don't exist yet, so e.g. `$.meta.count` can be written even if
/// `meta` does not yet exist.
pub fn update_or_create<F: FnMut(&Value) -> Value>(root: &mut Value, path: &JsonPathNode, mut f: F) {
    for_each_mut_or_create(path, root, &mut |v| {
        *v = f(v);
    });
}

/// Removes every node for which `predicate` returns true. `predicate` sees
/// the value before removal.
pub fn filter<P: Fn(&Value) -> bool>(root: &mut Value, path: &JsonPathNode, predicate: P) {
    remove_matching(path, root, &predicate);
}

fn for_each_mut(node: &JsonPathNode, value: &mut Value, f: &mut dyn FnMut(&mut Value)) {
    match node {
        JsonPathNode::Root | JsonPathNode::This => f(value),
        JsonPathNode::Fields { names, wildcard } => match value {
            Value::Object(map) => {
                if *wildcard {
                    for v in map.values_mut() {
                        f(v);
                    }
                } else {
                    for name in names {
                        if let Some(v) = map.get_mut(name) {
                            f(v);
                        }
                    }
                }
            }
            Value::Array(arr) if *wildcard => {
                for v in arr.iter_mut() {
                    f(v);
                }
            }
            _ => {}
        },
        JsonPathNode::Index(i) => {
            if let Value::Array(arr) = value {
                if let Some(idx) = resolve_index(*i, arr.len()) {
                    f(&mut arr[idx]);
                }
            }
        }
        JsonPathNode::Slice { start, end, step } => {
            if let Value::Array(arr) = value {
                for idx in slice_indices(*start, *end, *step, arr.len()) {
                    f(&mut arr[idx]);
                }
            }
        }
        JsonPathNode::Child(left, right) => {
            for_each_mut(left, value, &mut |v| for_each_mut(right, v, f));
        }
        JsonPathNode::Descendants(left, right) => {
            for_each_mut(left, value, &mut |v| {
                for_each_descendant_mut(v, &mut |d| for_each_mut(right, d, f));
            });
        }
        JsonPathNode::Union(left, right) => {
            for_each_mut(left, value, f);
            for_each_mut(right, value, f);
        }
        JsonPathNode::Filter(left, expr) => {
            for_each_mut(left, value, &mut |v| for_each_filtered_child_mut(v, expr, f));
        }
        JsonPathNode::Where(_, _)
        | JsonPathNode::WhereNot(_, _)
        | JsonPathNode::Intersect(_, _)
        | JsonPathNode::Parent(_) => {}
    }
}

/// Applies `f` to each element/value of `value` for which `expr` evaluates
/// true with `@` bound to that child — mirrors [`JsonPathNode::Filter`]'s
/// read semantics, which iterate the matched node's children rather than
/// testing the node itself.
fn for_each_filtered_child_mut(value: &mut Value, expr: &crate::ast::FilterExpr, f: &mut dyn FnMut(&mut Value)) {
    match value {
        Value::Object(map) => {
            for v in map.values_mut() {
                let keep = {
                    let snap = crate::datum::Datum::root(&*v);
                    crate::eval::evaluate_bool(expr, &snap, &snap)
                };
                if keep {
                    f(v);
                }
            }
        }
        Value::Array(arr) => {
            for v in arr.iter_mut() {
                let keep = {
                    let snap = crate::datum::Datum::root(&*v);
                    crate::eval::evaluate_bool(expr, &snap, &snap)
                };
                if keep {
                    f(v);
                }
            }
        }
        _ => {}
    }
}

fn for_each_mut_or_create(node: &JsonPathNode, value: &mut Value, f: &mut dyn FnMut(&mut Value)) {
    match node {
        JsonPathNode::Root | JsonPathNode::This => f(value),
        JsonPathNode::Fields { names, wildcard } => {
            if *wildcard {
                for_each_mut(node, value, f);
                return;
            }
            if !value.is_object() {
                *value = Value::Object(Default::default());
            }
            if let Value::Object(map) = value {
                for name in names {
                    let entry = map.entry(name.clone()).or_insert(Value::Null);
                    f(entry);
                }
            }
        }
        JsonPathNode::Index(i) => {
            if !value.is_array() {
                *value = Value::Array(Vec::new());
            }
            if let Value::Array(arr) = value {
                let target = if *i < 0 { None } else { Some(*i as usize) };
                if let Some(idx) = target {
                    if idx >= arr.len() {
                        arr.resize_with(idx + 1, || Value::Object(Default::default()));
                    }
                    f(&mut arr[idx]);
                } else if let Some(idx) = resolve_index(*i, arr.len()) {
                    f(&mut arr[idx]);
                }
            }
        }
        JsonPathNode::Child(left, right) => {
            for_each_mut_or_create(left, value, &mut |v| for_each_mut_or_create(right, v, f));
        }
        // Creating through a wildcard, slice, descendants, union, filter, or
        // a relational selector is ambiguous — there is no single slot to
        // create — so those fall back to plain `update` semantics.
        other => for_each_mut(other, value, f),
    }
}

fn for_each_descendant_mut(value: &mut Value, f: &mut dyn FnMut(&mut Value)) {
    f(value);
    match value {
        Value::Object(map) => {
            for v in map.values_mut() {
                for_each_descendant_mut(v, f);
            }
        }
        Value::Array(arr) => {
            for v in arr.iter_mut() {
                for_each_descendant_mut(v, f);
            }
        }
        _ => {}
    }
}

fn remove_matching<P: Fn(&Value) -> bool>(node: &JsonPathNode, value: &mut Value, predicate: &P) {
    match node {
        JsonPathNode::Root | JsonPathNode::This => {}
        JsonPathNode::Fields { names, wildcard } => {
            if let Value::Object(map) = value {
                if *wildcard {
                    map.retain(|_, v| !predicate(v));
                } else {
                    for name in names {
                        if map.get(name).map(predicate).unwrap_or(false) {
                            map.remove(name);
                        }
                    }
                }
            } else if let Value::Array(arr) = value {
                if *wildcard {
                    arr.retain(|v| !predicate(v));
                }
            }
        }
        JsonPathNode::Index(i) => {
            if let Value::Array(arr) = value {
                if let Some(idx) = resolve_index(*i, arr.len()) {
                    if predicate(&arr[idx]) {
                        arr.remove(idx);
                    }
                }
            }
        }
        JsonPathNode::Slice { start, end, step } => {
            if let Value::Array(arr) = value {
                let mut indices = slice_indices(*start, *end, *step, arr.len());
                indices.sort_unstable_by(|a, b| b.cmp(a));
                for idx in indices {
                    if predicate(&arr[idx]) {
                        arr.remove(idx);
                    }
                }
            }
        }
        JsonPathNode::Child(left, right) => {
            for_each_mut(left, value, &mut |v| remove_matching(right, v, predicate));
        }
        JsonPathNode::Descendants(left, right) => {
            for_each_mut(left, value, &mut |v| {
                for_each_descendant_mut(v, &mut |d| remove_matching(right, d, predicate));
            });
        }
        JsonPathNode::Union(left, right) => {
            remove_matching(left, value, predicate);
            remove_matching(right, value, predicate);
        }
        JsonPathNode::Filter(left, expr) => {
            for_each_mut(left, value, &mut |v| remove_filtered_children(v, expr, predicate));
        }
        JsonPathNode::Where(_, _)
        | JsonPathNode::WhereNot(_, _)
        | JsonPathNode::Intersect(_, _)
        | JsonPathNode::Parent(_) => {}
    }
}

/// Removes each element/value of `value` for which `expr` evaluates true
/// (with `@` bound to that child) AND `predicate` holds — the same
/// children [`for_each_filtered_child_mut`] would visit, but dropped
/// rather than mutated in place.
fn remove_filtered_children<P: Fn(&Value) -> bool>(
    value: &mut Value,
    expr: &crate::ast::FilterExpr,
    predicate: &P,
) {
    let matches = |v: &Value| -> bool {
        let snap = crate::datum::Datum::root(v);
        crate::eval::evaluate_bool(expr, &snap, &snap) && predicate(v)
    };
    match value {
        Value::Object(map) => map.retain(|_, v| !matches(v)),
        Value::Array(arr) => arr.retain(|v| !matches(v)),
        _ => {}
    }
}

fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let i = if index < 0 { index + len } else { index };
    if i >= 0 && i < len {
        Some(i as usize)
    } else {
        None
    }
}

fn slice_indices(start: Option<i64>, end: Option<i64>, step: Option<i64>, len: usize) -> Vec<usize> {
    let len_i = len as i64;
    let step = step.unwrap_or(1);
    if step == 0 || len == 0 {
        return vec![];
    }
    let (lo_default, hi_default) = if step > 0 { (0, len_i) } else { (len_i - 1, -1) };
    let normalize = |v: i64| -> i64 {
        if v < 0 {
            (v + len_i).max(if step > 0 { 0 } else { -1 })
        } else {
            v.min(if step > 0 { len_i } else { len_i - 1 })
        }
    };
    let mut i = start.map(normalize).unwrap_or(lo_default);
    let stop = end.map(normalize).unwrap_or(hi_default);
    let mut out = Vec::new();
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        if i >= 0 && i < len_i {
            out.push(i as usize);
        }
        i += step;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use serde_json::json;

    #[test]
    fn update_replaces_matched_field() {
        let mut doc = json!({"a": 1, "b": 2});
        let node = parse("$.a").unwrap();
        update(&mut doc, &node, |v| json!(v.as_i64().unwrap() + 10));
        assert_eq!(doc, json!({"a": 11, "b": 2}));
    }

    #[test]
    fn update_or_create_fills_in_missing_object_path() {
        let mut doc = json!({});
        let node = parse("$.meta.count").unwrap();
        update_or_create(&mut doc, &node, |_| json!(1));
        assert_eq!(doc, json!({"meta": {"count": 1}}));
    }

    #[test]
    fn update_or_create_extends_array() {
        let mut doc = json!({"items": []});
        let node = parse("$.items[2]").unwrap();
        update_or_create(&mut doc, &node, |_| json!("x"));
        assert_eq!(doc, json!({"items": [{}, {}, "x"]}));
    }

    #[test]
    fn filter_removes_matching_array_elements() {
        let mut doc = json!({"items": [1, 2, 3, 4]});
        let node = parse("$.items[*]").unwrap();
        filter(&mut doc, &node, |v| v.as_i64().map(|n| n % 2 == 0).unwrap_or(false));
        assert_eq!(doc, json!({"items": [1, 3]}));
    }
}
