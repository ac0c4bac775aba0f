//! Static checks applied to a filter expression once the query tree for it
//! has been built, before the surrounding path is accepted by the parser.

use crate::ast::{FilterExpr, JsonPathNode};
use crate::error::ParseError;

/// A path is singular if it is guaranteed to match at most one node: no
/// wildcards, slices, unions, descendants, or filters anywhere in it.
pub fn is_singular_query(node: &JsonPathNode) -> bool {
    match node {
        JsonPathNode::Root | JsonPathNode::This => true,
        JsonPathNode::Fields { wildcard, names, .. } => !wildcard && names.len() <= 1,
        JsonPathNode::Index(_) => true,
        JsonPathNode::Slice { .. } => false,
        JsonPathNode::Child(l, r) => is_singular_query(l) && is_singular_query(r),
        JsonPathNode::Descendants(_, _) => false,
        JsonPathNode::Where(_, _) | JsonPathNode::WhereNot(_, _) => false,
        JsonPathNode::Union(_, _) => false,
        JsonPathNode::Intersect(l, r) => is_singular_query(l) && is_singular_query(r),
        JsonPathNode::Filter(_, _) => false,
        JsonPathNode::Parent(inner) => is_singular_query(inner),
    }
}

fn describe(node: &JsonPathNode) -> String {
    format!("{:?}", node)
}

/// Rejects a comparison operand that is a bare path which may match more
/// than one node. Literals and `@`/`$` alone are always fine.
pub fn check_comparison_operand(expr: &FilterExpr) -> Result<(), ParseError> {
    if let FilterExpr::Path(node) = expr {
        if !is_singular_query(node) {
            return Err(ParseError::NonSingularQuery(describe(node)));
        }
    }
    Ok(())
}

/// Rejects a bare literal used directly as a filter body or as an operand
/// of `&&`, `||`, or `!` — those positions require something that can be
/// evaluated for existence/truthiness, not a constant.
pub fn check_boolean_position(expr: &FilterExpr) -> Result<(), ParseError> {
    if matches!(expr, FilterExpr::Literal(_)) {
        return Err(ParseError::LiteralInBooleanPosition);
    }
    Ok(())
}

/// Checks a function call's arity and, for arguments required to be
/// singular, that it was not given a bare multi-valued path.
pub fn check_function_call(
    call: crate::ast::FunctionCall,
    args: &[FilterExpr],
) -> Result<(), ParseError> {
    if args.len() != call.arity() {
        return Err(ParseError::FunctionArity {
            name: call.name().to_string(),
            expected: match call.arity() {
                1 => "1",
                2 => "2",
                _ => "?",
            },
            got: args.len(),
        });
    }
    for (i, arg) in args.iter().enumerate() {
        if call.accepts_multivalued_argument(i) {
            continue;
        }
        if let FilterExpr::Path(node) = arg {
            if !is_singular_query(node) {
                return Err(ParseError::FunctionArgumentType {
                    name: call.name().to_string(),
                    index: i,
                });
            }
        }
    }
    Ok(())
}
