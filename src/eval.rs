//! Evaluates a compiled [`JsonPathNode`] against a document, producing an
//! ordered list of matches as zipper [`Datum`]s. Evaluation is total: a
//! query that matches nothing returns an empty list rather than failing,
//! and no input ever causes a panic.

use crate::ast::{ComparisonOp, FilterExpr, FilterLiteral, FunctionCall, JsonPathNode};
use crate::datum::{Datum, Step};
use crate::functions;
use crate::value::FilterValue;
use serde_json::Value;
use std::cmp::Ordering;
use std::rc::Rc;

/// Evaluates `node` against an entire document, returning every match.
pub fn find_in_document<'a>(node: &JsonPathNode, document: &'a Value) -> Vec<Rc<Datum<'a>>> {
    let root = Datum::root(document);
    find(node, &root, &root)
}

/// Evaluates `node` with `datum` as the current context and `root` as `$`.
pub fn find<'a>(
    node: &JsonPathNode,
    datum: &Rc<Datum<'a>>,
    root: &Rc<Datum<'a>>,
) -> Vec<Rc<Datum<'a>>> {
    match node {
        JsonPathNode::Root => vec![Rc::clone(root)],
        JsonPathNode::This => vec![Rc::clone(datum)],
        JsonPathNode::Fields { names, wildcard } => eval_fields(names, *wildcard, datum),
        JsonPathNode::Index(i) => eval_index(*i, datum),
        JsonPathNode::Slice { start, end, step } => eval_slice(*start, *end, *step, datum),
        JsonPathNode::Child(left, right) => find(left, datum, root)
            .iter()
            .flat_map(|d| find(right, d, root))
            .collect(),
        JsonPathNode::Descendants(left, right) => find(left, datum, root)
            .iter()
            .flat_map(descendants_and_self)
            .flat_map(|d| find(right, &d, root))
            .collect(),
        JsonPathNode::Where(left, right) => find(left, datum, root)
            .into_iter()
            .filter(|d| !find(right, d, root).is_empty())
            .collect(),
        JsonPathNode::WhereNot(left, right) => find(left, datum, root)
            .into_iter()
            .filter(|d| find(right, d, root).is_empty())
            .collect(),
        JsonPathNode::Union(left, right) => {
            let mut out = find(left, datum, root);
            out.extend(find(right, datum, root));
            out
        }
        // Reserved by the grammar but never implemented upstream; total
        // evaluation means this reports as "matches nothing" rather than
        // panicking.
        JsonPathNode::Intersect(_, _) => vec![],
        // `[?(expr)]` iterates the ELEMENTS of whatever `left` matched
        // (array items or object values), keeping those for which `expr`
        // is true with `@` bound to the element — not `left`'s match
        // itself. `$.items[?(@.price<10)]` filters each item in `items`.
        JsonPathNode::Filter(left, expr) => find(left, datum, root)
            .into_iter()
            .flat_map(|d| filter_children(&d, expr, root))
            .collect(),
        JsonPathNode::Parent(inner) => find(inner, datum, root)
            .iter()
            .filter_map(|d| d.parent_datum())
            .collect(),
    }
}

fn eval_fields<'a>(names: &[String], wildcard: bool, datum: &Rc<Datum<'a>>) -> Vec<Rc<Datum<'a>>> {
    match datum.value {
        Value::Object(map) => {
            if wildcard {
                map.iter()
                    .map(|(k, v)| Datum::child(datum, Step::Field(k.clone()), v))
                    .collect()
            } else {
                names
                    .iter()
                    .filter_map(|n| map.get(n).map(|v| Datum::child(datum, Step::Field(n.clone()), v)))
                    .collect()
            }
        }
        Value::Array(arr) => {
            if wildcard {
                arr.iter()
                    .enumerate()
                    .map(|(i, v)| Datum::child(datum, Step::Index(i as i64), v))
                    .collect()
            } else {
                vec![]
            }
        }
        _ => vec![],
    }
}

fn eval_index<'a>(index: i64, datum: &Rc<Datum<'a>>) -> Vec<Rc<Datum<'a>>> {
    let Value::Array(arr) = datum.value else {
        return vec![];
    };
    match resolve_index(index, arr.len()) {
        Some(i) => vec![Datum::child(datum, Step::Index(index), &arr[i])],
        None => vec![],
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

fn eval_slice<'a>(
    start: Option<i64>,
    end: Option<i64>,
    step: Option<i64>,
    datum: &Rc<Datum<'a>>,
) -> Vec<Rc<Datum<'a>>> {
    // Non-array scalars are coerced into a one-element array before
    // slicing, so `$.store.info[0:1]` works on a bare object the same way
    // it would on `[info]`.
    let items: Vec<(i64, &Value)> = match datum.value {
        Value::Array(arr) => arr.iter().enumerate().map(|(i, v)| (i as i64, v)).collect(),
        other => vec![(0, other)],
    };
    let len = items.len() as i64;
    let step = step.unwrap_or(1);
    if step == 0 || len == 0 {
        return vec![];
    }

    let (lo_default, hi_default) = if step > 0 { (0, len) } else { (len - 1, -1) };
    let normalize = |v: i64| -> i64 {
        if v < 0 {
            (v + len).max(if step > 0 { 0 } else { -1 })
        } else {
            v.min(if step > 0 { len } else { len - 1 })
        }
    };

    let mut i = start.map(normalize).unwrap_or(lo_default);
    let stop = end.map(normalize).unwrap_or(hi_default);

    let mut out = Vec::new();
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        if i >= 0 && i < len {
            let (orig_index, value) = items[i as usize];
            out.push(Datum::child(datum, Step::Index(orig_index), value));
        }
        i += step;
    }
    out
}

fn filter_children<'a>(
    datum: &Rc<Datum<'a>>,
    expr: &FilterExpr,
    root: &Rc<Datum<'a>>,
) -> Vec<Rc<Datum<'a>>> {
    let children = eval_fields(&[], true, datum);
    children.into_iter().filter(|c| evaluate_bool(expr, c, root)).collect()
}

fn descendants_and_self<'a>(datum: &Rc<Datum<'a>>) -> Vec<Rc<Datum<'a>>> {
    let mut out = vec![Rc::clone(datum)];
    match datum.value {
        Value::Object(map) => {
            for (k, v) in map {
                out.extend(descendants_and_self(&Datum::child(datum, Step::Field(k.clone()), v)));
            }
        }
        Value::Array(arr) => {
            for (i, v) in arr.iter().enumerate() {
                out.extend(descendants_and_self(&Datum::child(datum, Step::Index(i as i64), v)));
            }
        }
        _ => {}
    }
    out
}

// ---- filter sub-language ------------------------------------------------

/// Existence/truthiness evaluation used for a filter body and for operands
/// of `&&`, `||`, and `!`.
pub fn evaluate_bool<'a>(expr: &FilterExpr, datum: &Rc<Datum<'a>>, root: &Rc<Datum<'a>>) -> bool {
    match expr {
        FilterExpr::CurrentNode => true,
        FilterExpr::Path(node) => !find(node, datum, root).is_empty(),
        FilterExpr::Literal(_) => true,
        FilterExpr::Comparison(left, op, right) => {
            let lv = evaluate_value(left, datum, root);
            let rv = evaluate_value(right, datum, root);
            compare(&lv, *op, &rv)
        }
        FilterExpr::And(left, right) => evaluate_bool(left, datum, root) && evaluate_bool(right, datum, root),
        FilterExpr::Or(left, right) => evaluate_bool(left, datum, root) || evaluate_bool(right, datum, root),
        FilterExpr::Not(inner) => !evaluate_bool(inner, datum, root),
        FilterExpr::Call(call, args) => evaluate_call(*call, args, datum, root).is_truthy(),
    }
}

/// Value evaluation used for comparison operands and function arguments.
pub fn evaluate_value<'a>(
    expr: &FilterExpr,
    datum: &Rc<Datum<'a>>,
    root: &Rc<Datum<'a>>,
) -> FilterValue {
    match expr {
        FilterExpr::CurrentNode => FilterValue::Value(datum.value.clone()),
        FilterExpr::Path(node) => {
            let matches = find(node, datum, root);
            match matches.first() {
                Some(m) => FilterValue::Value(m.value.clone()),
                None => FilterValue::Nothing,
            }
        }
        FilterExpr::Literal(lit) => literal_to_value(lit),
        FilterExpr::Call(call, args) => evaluate_call(*call, args, datum, root),
        FilterExpr::Comparison(_, _, _) | FilterExpr::And(_, _) | FilterExpr::Or(_, _) | FilterExpr::Not(_) => {
            FilterValue::Value(Value::Bool(evaluate_bool(expr, datum, root)))
        }
    }
}

fn literal_to_value(lit: &FilterLiteral) -> FilterValue {
    FilterValue::Value(match lit {
        FilterLiteral::Null => Value::Null,
        FilterLiteral::Bool(b) => Value::Bool(*b),
        FilterLiteral::Int(i) => Value::from(*i),
        FilterLiteral::Float(f) => serde_json::Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        FilterLiteral::Str(s) => Value::String(s.clone()),
    })
}

fn evaluate_call<'a>(
    call: FunctionCall,
    args: &[FilterExpr],
    datum: &Rc<Datum<'a>>,
    root: &Rc<Datum<'a>>,
) -> FilterValue {
    match call {
        FunctionCall::Match => {
            let haystack = evaluate_value(&args[0], datum, root);
            let pattern = evaluate_value(&args[1], datum, root);
            functions::call_match(&haystack, &pattern)
        }
        FunctionCall::Search => {
            let haystack = evaluate_value(&args[0], datum, root);
            let pattern = evaluate_value(&args[1], datum, root);
            functions::call_search(&haystack, &pattern)
        }
        FunctionCall::Length => {
            let v = evaluate_value(&args[0], datum, root);
            functions::call_length(&v)
        }
        FunctionCall::Count => {
            if let FilterExpr::Path(node) = &args[0] {
                functions::call_count(find(node, datum, root).len())
            } else {
                functions::call_count(0)
            }
        }
        FunctionCall::Value => {
            if let FilterExpr::Path(node) = &args[0] {
                let matches = find(node, datum, root);
                let unique = if matches.len() == 1 { matches.first().map(|d| d.value) } else { None };
                functions::call_value(unique)
            } else {
                evaluate_value(&args[0], datum, root)
            }
        }
    }
}

fn compare(left: &FilterValue, op: ComparisonOp, right: &FilterValue) -> bool {
    match op {
        ComparisonOp::Eq => left.values_equal(right),
        ComparisonOp::Ne => !left.values_equal(right),
        ComparisonOp::Lt => left.partial_compare(right) == Some(Ordering::Less),
        ComparisonOp::Gt => left.partial_compare(right) == Some(Ordering::Greater),
        ComparisonOp::Le => {
            left.both_nothing(right)
                || matches!(left.partial_compare(right), Some(Ordering::Less) | Some(Ordering::Equal))
        }
        ComparisonOp::Ge => {
            left.both_nothing(right)
                || matches!(left.partial_compare(right), Some(Ordering::Greater) | Some(Ordering::Equal))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use serde_json::json;

    fn run(path: &str, doc: &Value) -> Vec<Value> {
        let node = parse(path).unwrap();
        find_in_document(&node, doc).into_iter().map(|d| d.value.clone()).collect()
    }

    #[test]
    fn dotted_field_access() {
        let doc = json!({"store": {"name": "acme"}});
        assert_eq!(run("$.store.name", &doc), vec![json!("acme")]);
    }

    #[test]
    fn wildcard_over_array() {
        let doc = json!([1, 2, 3]);
        assert_eq!(run("$[*]", &doc), vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn negative_index() {
        let doc = json!([1, 2, 3]);
        assert_eq!(run("$[-1]", &doc), vec![json!(3)]);
    }

    #[test]
    fn slice_scalar_coercion() {
        let doc = json!({"a": 1});
        assert_eq!(run("$.a[0:1]", &doc), vec![json!(1)]);
    }

    #[test]
    fn slice_with_zero_step_is_empty() {
        let doc = json!([1, 2, 3]);
        assert_eq!(run("$[0:3:0]", &doc), Vec::<Value>::new());
    }

    #[test]
    fn descendants_collects_every_level() {
        let doc = json!({"a": {"b": {"a": 1}}, "a2": 2});
        let mut got = run("$..a", &doc);
        got.sort_by_key(|v| v.to_string());
        let mut want = vec![json!({"b": {"a": 1}}), json!(1)];
        want.sort_by_key(|v| v.to_string());
        assert_eq!(got, want);
    }

    #[test]
    fn filter_keeps_matching_items() {
        let doc = json!({"items": [{"price": 5}, {"price": 20}]});
        assert_eq!(run("$.items[?(@.price < 10)]", &doc), vec![json!({"price": 5})]);
    }

    #[test]
    fn filter_existence_keeps_null() {
        let doc = json!({"items": [{"v": null}, {}]});
        assert_eq!(run("$.items[?(@.v)]", &doc), vec![json!({"v": null})]);
    }

    #[test]
    fn union_concatenates_with_duplicates() {
        let doc = json!([10, 20, 30]);
        assert_eq!(run("$[0]|$[0:2]", &doc), vec![json!(10), json!(10), json!(20)]);
    }

    #[test]
    fn and_or_short_circuit_precedence() {
        // a && b || c: with a=false this is true only via the trailing
        // `|| c`, proving `&&` binds tighter than `||`.
        let item = json!({"a": false, "b": true, "c": true});
        let doc = json!([item.clone()]);
        assert_eq!(run("$[?(@.a && @.b || @.c)]", &doc), vec![item]);
    }
}
