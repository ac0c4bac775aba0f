//! A JSONPath expression compiler and evaluator.
//!
//! Compiles a JSONPath string into a [`JsonPathNode`] query tree, then
//! finds matching nodes in a [`serde_json::Value`] document, reporting
//! each match's value alongside the canonical path that reached it. Also
//! exposes `update`/`update_or_create`/`filter` for in-place mutation.
//!
//! # Example
//!
//! ```
//! use jqpath::JsonPath;
//! use serde_json::json;
//!
//! let path = JsonPath::compile("$.store.books[*].author").unwrap();
//!
//! let doc = json!({
//!     "store": {
//!         "books": [
//!             {"author": "Nigel Rees", "title": "Sayings of the Century"},
//!             {"author": "Evelyn Waugh", "title": "Sword of Honour"}
//!         ]
//!     }
//! });
//!
//! let results = path.find(&doc);
//! assert_eq!(results.len(), 2);
//! assert_eq!(results[0].path, "$['store']['books'][0]['author']");
//! ```

mod ast;
mod datum;
pub mod error;
mod eval;
mod functions;
mod lexer;
mod mutate;
mod parser;
mod util;
mod validator;
mod value;

pub use ast::{ComparisonOp, FilterExpr, FilterLiteral, FunctionCall, JsonPathNode};
pub use error::{LexError, ParseError};
pub use value::FilterValue;

use serde_json::Value;

/// A single matched location in a document: its value and the canonical
/// path that reached it.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub value: Value,
    pub path: String,
}

/// A compiled JSONPath expression, ready to be evaluated against any
/// number of documents.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    node: JsonPathNode,
}

impl JsonPath {
    /// Compiles `expr` into a query tree, running the static validator
    /// (singular-query-in-comparison, function arity, literal-in-boolean
    /// position, index range/format) along the way.
    pub fn compile(expr: &str) -> Result<JsonPath, ParseError> {
        Ok(JsonPath { node: parser::parse(expr)? })
    }

    /// Every node this path matches in `document`, in document order.
    pub fn find(&self, document: &Value) -> Vec<Node> {
        eval::find_in_document(&self.node, document)
            .into_iter()
            .map(|d| Node { value: d.value.clone(), path: util::canonical_path(&d.path_steps()) })
            .collect()
    }

    /// Replaces every matched node's value with `f` applied to its current
    /// value. Nodes the path doesn't already reach are left untouched.
    pub fn update<F: FnMut(&Value) -> Value>(&self, document: &mut Value, f: F) {
        mutate::update(document, &self.node, f);
    }

    /// Like [`JsonPath::update`], but creates missing object keys and array
    /// slots along the way so the write always lands somewhere.
    pub fn update_or_create<F: FnMut(&Value) -> Value>(&self, document: &mut Value, f: F) {
        mutate::update_or_create(document, &self.node, f);
    }

    /// Removes every matched node for which `predicate` returns true.
    pub fn filter<P: Fn(&Value) -> bool>(&self, document: &mut Value, predicate: P) {
        mutate::filter(document, &self.node, predicate);
    }
}

/// Shorthand for `JsonPath::compile(expr)?.find(document)`.
pub fn find(expr: &str, document: &Value) -> Result<Vec<Node>, ParseError> {
    Ok(JsonPath::compile(expr)?.find(document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compiles_and_finds() {
        let path = JsonPath::compile("$.store.books[*].author").unwrap();
        let doc = json!({
            "store": {
                "books": [
                    {"author": "Nigel Rees"},
                    {"author": "Evelyn Waugh"}
                ]
            }
        });
        let results = path.find(&doc);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].value, json!("Nigel Rees"));
        assert_eq!(results[0].path, "$['store']['books'][0]['author']");
    }

    #[test]
    fn invalid_expression_reports_parse_error() {
        assert!(JsonPath::compile(" $.a").is_err());
    }

    #[test]
    fn convenience_find_function() {
        let doc = json!({"a": 1});
        let results = find("$.a", &doc).unwrap();
        assert_eq!(results[0].value, json!(1));
    }

    #[test]
    fn update_mutates_in_place() {
        let path = JsonPath::compile("$.count").unwrap();
        let mut doc = json!({"count": 1});
        path.update(&mut doc, |v| json!(v.as_i64().unwrap() + 1));
        assert_eq!(doc, json!({"count": 2}));
    }
}
