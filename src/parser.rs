//! Recursive-descent parser with explicit precedence levels, turning a
//! token stream from [`crate::lexer`] into a [`JsonPathNode`].
//!
//! Precedence, loosest to tightest binding: union (`|`), intersect (`&`),
//! `where`/`wherenot`, descendants (`..`), child (`.` and `[...]`).

use crate::ast::{ComparisonOp, FilterExpr, FilterLiteral, FunctionCall, JsonPathNode};
use crate::error::ParseError;
use crate::lexer::{Lexer, NumberValue, Token, TokenKind};
use crate::validator;

pub fn parse(input: &str) -> Result<JsonPathNode, ParseError> {
    if input != input.trim() {
        return Err(ParseError::SurroundingWhitespace);
    }
    let tokens = Lexer::tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let node = parser.parse_union()?;
    parser.expect_eof()?;
    Ok(node)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.peek().kind == kind {
            Ok(self.bump())
        } else {
            self.unexpected()
        }
    }

    fn expect_eof(&mut self) -> Result<(), ParseError> {
        if self.peek().kind == TokenKind::Eof {
            Ok(())
        } else {
            self.unexpected()
        }
    }

    fn unexpected<T>(&self) -> Result<T, ParseError> {
        let tok = self.peek();
        if tok.kind == TokenKind::Eof {
            Err(ParseError::UnexpectedEof)
        } else {
            Err(ParseError::UnexpectedToken {
                line: tok.line,
                col: tok.col,
                found: format!("{:?}", tok.kind),
            })
        }
    }

    // ---- path grammar -----------------------------------------------

    fn parse_union(&mut self) -> Result<JsonPathNode, ParseError> {
        let mut left = self.parse_intersect()?;
        while self.eat(&TokenKind::Pipe) {
            let right = self.parse_intersect()?;
            left = JsonPathNode::Union(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_intersect(&mut self) -> Result<JsonPathNode, ParseError> {
        let mut left = self.parse_where()?;
        while self.eat(&TokenKind::Amp) {
            let right = self.parse_where()?;
            left = JsonPathNode::Intersect(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_where(&mut self) -> Result<JsonPathNode, ParseError> {
        let mut left = self.parse_descendants()?;
        loop {
            if self.eat(&TokenKind::Where) {
                let right = self.parse_descendants()?;
                left = JsonPathNode::Where(Box::new(left), Box::new(right));
            } else if self.eat(&TokenKind::WhereNot) {
                let right = self.parse_descendants()?;
                left = JsonPathNode::WhereNot(Box::new(left), Box::new(right));
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_descendants(&mut self) -> Result<JsonPathNode, ParseError> {
        let mut left = self.parse_child()?;
        while self.eat(&TokenKind::DoubleDot) {
            let right = self.parse_child()?;
            left = JsonPathNode::Descendants(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_child(&mut self) -> Result<JsonPathNode, ParseError> {
        let left = self.parse_atom()?;
        self.parse_child_tail(left)
    }

    /// Applies trailing `.field`, `[...]`, and `` `parent` `` suffixes to an
    /// already-parsed node. Shared by top-level parsing and by filter path
    /// expressions seeded at `@` or `$`.
    fn parse_child_tail(&mut self, mut left: JsonPathNode) -> Result<JsonPathNode, ParseError> {
        loop {
            match &self.peek().kind {
                TokenKind::Dot => {
                    self.bump();
                    let right = self.parse_dot_rhs()?;
                    left = JsonPathNode::Child(Box::new(left), Box::new(right));
                }
                TokenKind::LBracket => {
                    left = self.parse_bracket(left)?;
                }
                TokenKind::NamedOperator(op) if op == "parent" => {
                    self.bump();
                    left = JsonPathNode::Parent(Box::new(left));
                }
                TokenKind::NamedOperator(op) => {
                    return Err(ParseError::UnknownNamedOperator(op.clone()));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_atom(&mut self) -> Result<JsonPathNode, ParseError> {
        match self.peek().kind.clone() {
            TokenKind::Dollar => {
                self.bump();
                Ok(JsonPathNode::Root)
            }
            TokenKind::Current => {
                self.bump();
                Ok(JsonPathNode::This)
            }
            TokenKind::NamedOperator(ref op) if op == "this" => {
                self.bump();
                Ok(JsonPathNode::This)
            }
            TokenKind::Id(name) => {
                self.bump();
                Ok(JsonPathNode::Fields { names: vec![name], wildcard: false })
            }
            TokenKind::Star => {
                self.bump();
                Ok(JsonPathNode::Fields { names: vec![], wildcard: true })
            }
            // A bracket with no preceding atom (e.g. the right-hand side of
            // `..` in `$..[?(@.price)]`) implicitly selects from the
            // current node; `parse_child_tail` consumes the bracket itself.
            TokenKind::LBracket => Ok(JsonPathNode::This),
            _ => self.unexpected(),
        }
    }

    fn parse_dot_rhs(&mut self) -> Result<JsonPathNode, ParseError> {
        match self.peek().kind.clone() {
            TokenKind::Id(name) => {
                self.bump();
                Ok(JsonPathNode::Fields { names: vec![name], wildcard: false })
            }
            TokenKind::Star => {
                self.bump();
                Ok(JsonPathNode::Fields { names: vec![], wildcard: true })
            }
            _ => self.unexpected(),
        }
    }

    fn parse_bracket(&mut self, left: JsonPathNode) -> Result<JsonPathNode, ParseError> {
        self.expect(TokenKind::LBracket)?;

        if self.eat(&TokenKind::Question) {
            let has_paren = self.eat(&TokenKind::LParen);
            let expr = self.parse_filter_or()?;
            validator::check_boolean_position(&expr)?;
            if has_paren {
                self.expect(TokenKind::RParen)?;
            }
            self.expect(TokenKind::RBracket)?;
            return Ok(JsonPathNode::Filter(Box::new(left), Box::new(expr)));
        }

        if self.eat(&TokenKind::Star) {
            self.expect(TokenKind::RBracket)?;
            let rhs = JsonPathNode::Fields { names: vec![], wildcard: true };
            return Ok(JsonPathNode::Child(Box::new(left), Box::new(rhs)));
        }

        let mut items = vec![self.parse_bracket_item()?];
        while self.eat(&TokenKind::Comma) {
            items.push(self.parse_bracket_item()?);
        }
        self.expect(TokenKind::RBracket)?;
        let rhs = combine_bracket_items(items);
        Ok(JsonPathNode::Child(Box::new(left), Box::new(rhs)))
    }

    fn parse_bracket_item(&mut self) -> Result<BracketItem, ParseError> {
        match self.peek().kind.clone() {
            TokenKind::String(s) => {
                self.bump();
                Ok(BracketItem::Name(s))
            }
            TokenKind::Id(s) => {
                self.bump();
                Ok(BracketItem::Name(s))
            }
            TokenKind::Number(_) | TokenKind::Colon => self.parse_index_or_slice(),
            _ => self.unexpected(),
        }
    }

    fn parse_index_or_slice(&mut self) -> Result<BracketItem, ParseError> {
        let start = self.parse_optional_signed_int()?;
        if self.eat(&TokenKind::Colon) {
            let end = self.parse_optional_signed_int()?;
            let step = if self.eat(&TokenKind::Colon) {
                self.parse_optional_signed_int()?
            } else {
                None
            };
            Ok(BracketItem::Slice {
                start: start.map(|(v, _)| v),
                end: end.map(|(v, _)| v),
                step: step.map(|(v, _)| v),
            })
        } else {
            let (value, text) = start.ok_or(ParseError::InvalidSlice)?;
            if text == "-0" {
                return Err(ParseError::NegativeZeroIndex);
            }
            if value.unsigned_abs() > (1u64 << 53) - 1 {
                return Err(ParseError::IndexOutOfRange(value));
            }
            Ok(BracketItem::Index(value))
        }
    }

    fn parse_optional_signed_int(&mut self) -> Result<Option<(i64, String)>, ParseError> {
        if let TokenKind::Number(n) = self.peek().kind.clone() {
            self.bump();
            match n.value {
                NumberValue::Int(v) => Ok(Some((v, n.text))),
                NumberValue::Float(_) => Err(ParseError::NonIntegerIndex(n.text)),
            }
        } else {
            Ok(None)
        }
    }

    // ---- filter sub-language ------------------------------------------

    fn parse_filter_or(&mut self) -> Result<FilterExpr, ParseError> {
        let mut left = self.parse_filter_and()?;
        while self.eat(&TokenKind::Or) {
            let right = self.parse_filter_and()?;
            validator::check_boolean_position(&left)?;
            validator::check_boolean_position(&right)?;
            left = FilterExpr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_filter_and(&mut self) -> Result<FilterExpr, ParseError> {
        let mut left = self.parse_filter_not()?;
        while self.eat(&TokenKind::And) {
            let right = self.parse_filter_not()?;
            validator::check_boolean_position(&left)?;
            validator::check_boolean_position(&right)?;
            left = FilterExpr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_filter_not(&mut self) -> Result<FilterExpr, ParseError> {
        if self.eat(&TokenKind::Bang) {
            let inner = self.parse_filter_not()?;
            validator::check_boolean_position(&inner)?;
            Ok(FilterExpr::Not(Box::new(inner)))
        } else {
            self.parse_filter_comparison()
        }
    }

    fn parse_filter_comparison(&mut self) -> Result<FilterExpr, ParseError> {
        let left = self.parse_filter_value()?;
        let op = match self.peek().kind {
            TokenKind::Eq => ComparisonOp::Eq,
            TokenKind::Ne => ComparisonOp::Ne,
            TokenKind::Lt => ComparisonOp::Lt,
            TokenKind::Le => ComparisonOp::Le,
            TokenKind::Gt => ComparisonOp::Gt,
            TokenKind::Ge => ComparisonOp::Ge,
            _ => return Ok(left),
        };
        self.bump();
        let right = self.parse_filter_value()?;
        validator::check_comparison_operand(&left)?;
        validator::check_comparison_operand(&right)?;
        Ok(FilterExpr::Comparison(Box::new(left), op, Box::new(right)))
    }

    fn parse_filter_value(&mut self) -> Result<FilterExpr, ParseError> {
        match self.peek().kind.clone() {
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_filter_or()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Null => {
                self.bump();
                Ok(FilterExpr::Literal(FilterLiteral::Null))
            }
            TokenKind::True => {
                self.bump();
                Ok(FilterExpr::Literal(FilterLiteral::Bool(true)))
            }
            TokenKind::False => {
                self.bump();
                Ok(FilterExpr::Literal(FilterLiteral::Bool(false)))
            }
            TokenKind::Number(n) => {
                self.bump();
                Ok(FilterExpr::Literal(match n.value {
                    NumberValue::Int(v) => FilterLiteral::Int(v),
                    NumberValue::Float(v) => FilterLiteral::Float(v),
                }))
            }
            TokenKind::String(s) => {
                self.bump();
                Ok(FilterExpr::Literal(FilterLiteral::Str(s)))
            }
            TokenKind::Current => {
                self.bump();
                self.parse_filter_path_tail(JsonPathNode::This)
            }
            TokenKind::Dollar => {
                self.bump();
                self.parse_filter_path_tail(JsonPathNode::Root)
            }
            TokenKind::Id(name) => {
                if let Some(call) = FunctionCall::from_name(&name) {
                    self.bump();
                    self.expect(TokenKind::LParen)?;
                    let mut args = Vec::new();
                    if self.peek().kind != TokenKind::RParen {
                        args.push(self.parse_filter_or()?);
                        while self.eat(&TokenKind::Comma) {
                            args.push(self.parse_filter_or()?);
                        }
                    }
                    self.expect(TokenKind::RParen)?;
                    validator::check_function_call(call, &args)?;
                    Ok(FilterExpr::Call(call, args))
                } else {
                    self.unexpected()
                }
            }
            _ => self.unexpected(),
        }
    }

    /// Parses what follows `@` or `$` inside a filter. A bare `@` (no
    /// continuation) denotes "does this node exist"; anything else is a
    /// path evaluated from that anchor.
    fn parse_filter_path_tail(&mut self, seed: JsonPathNode) -> Result<FilterExpr, ParseError> {
        let continues = matches!(
            self.peek().kind,
            TokenKind::Dot | TokenKind::LBracket | TokenKind::DoubleDot | TokenKind::NamedOperator(_)
        );
        if !continues {
            return Ok(match seed {
                JsonPathNode::This => FilterExpr::CurrentNode,
                other => FilterExpr::Path(Box::new(other)),
            });
        }
        let mut left = seed;
        loop {
            match &self.peek().kind {
                TokenKind::DoubleDot => {
                    self.bump();
                    let right = self.parse_child()?;
                    left = JsonPathNode::Descendants(Box::new(left), Box::new(right));
                }
                TokenKind::Dot | TokenKind::LBracket | TokenKind::NamedOperator(_) => {
                    left = self.parse_child_tail(left)?;
                }
                _ => break,
            }
        }
        Ok(FilterExpr::Path(Box::new(left)))
    }
}

enum BracketItem {
    Name(String),
    Index(i64),
    Slice { start: Option<i64>, end: Option<i64>, step: Option<i64> },
}

fn combine_bracket_items(items: Vec<BracketItem>) -> JsonPathNode {
    if items.len() == 1 {
        return bracket_item_to_node(items.into_iter().next().unwrap());
    }
    if items.iter().all(|i| matches!(i, BracketItem::Name(_))) {
        let names = items
            .into_iter()
            .map(|i| match i {
                BracketItem::Name(n) => n,
                _ => unreachable!(),
            })
            .collect();
        return JsonPathNode::Fields { names, wildcard: false };
    }
    let mut iter = items.into_iter();
    let mut node = bracket_item_to_node(iter.next().unwrap());
    for item in iter {
        node = JsonPathNode::Union(Box::new(node), Box::new(bracket_item_to_node(item)));
    }
    node
}

fn bracket_item_to_node(item: BracketItem) -> JsonPathNode {
    match item {
        BracketItem::Name(n) => JsonPathNode::Fields { names: vec![n], wildcard: false },
        BracketItem::Index(i) => JsonPathNode::Index(i),
        BracketItem::Slice { start, end, step } => JsonPathNode::Slice { start, end, step },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dotted_field_chain() {
        let node = parse("$.store.book").unwrap();
        assert_eq!(
            node,
            JsonPathNode::Child(
                Box::new(JsonPathNode::Child(
                    Box::new(JsonPathNode::Root),
                    Box::new(JsonPathNode::Fields { names: vec!["store".into()], wildcard: false }),
                )),
                Box::new(JsonPathNode::Fields { names: vec!["book".into()], wildcard: false }),
            )
        );
    }

    #[test]
    fn parses_wildcard() {
        let node = parse("$.store.*").unwrap();
        assert!(matches!(node, JsonPathNode::Child(_, rhs) if matches!(*rhs, JsonPathNode::Fields { wildcard: true, .. })));
    }

    #[test]
    fn parses_index() {
        let node = parse("$[0]").unwrap();
        assert_eq!(
            node,
            JsonPathNode::Child(Box::new(JsonPathNode::Root), Box::new(JsonPathNode::Index(0)))
        );
    }

    #[test]
    fn rejects_negative_zero_index() {
        let err = parse("$[-0]").unwrap_err();
        assert_eq!(err, ParseError::NegativeZeroIndex);
    }

    #[test]
    fn parses_slice() {
        let node = parse("$[1:5:2]").unwrap();
        assert_eq!(
            node,
            JsonPathNode::Child(
                Box::new(JsonPathNode::Root),
                Box::new(JsonPathNode::Slice { start: Some(1), end: Some(5), step: Some(2) }),
            )
        );
    }

    #[test]
    fn parses_descendants() {
        let node = parse("$..book").unwrap();
        assert!(matches!(node, JsonPathNode::Descendants(_, _)));
    }

    #[test]
    fn parses_union_of_fields() {
        let node = parse("$['a','b']").unwrap();
        assert_eq!(
            node,
            JsonPathNode::Child(
                Box::new(JsonPathNode::Root),
                Box::new(JsonPathNode::Fields { names: vec!["a".into(), "b".into()], wildcard: false }),
            )
        );
    }

    #[test]
    fn parses_filter_with_comparison() {
        let node = parse("$.items[?(@.price < 10)]").unwrap();
        assert!(matches!(node, JsonPathNode::Child(_, rhs) if matches!(*rhs, JsonPathNode::Filter(_, _))));
    }

    #[test]
    fn rejects_bare_literal_filter_body() {
        let err = parse("$.items[?(true)]").unwrap_err();
        assert_eq!(err, ParseError::LiteralInBooleanPosition);
    }

    #[test]
    fn rejects_leading_whitespace() {
        let err = parse(" $.a").unwrap_err();
        assert_eq!(err, ParseError::SurroundingWhitespace);
    }

    #[test]
    fn parses_named_parent_operator() {
        let node = parse("$.a.b`parent`").unwrap();
        assert!(matches!(node, JsonPathNode::Parent(_)));
    }

    #[test]
    fn rejects_non_singular_comparison_operand() {
        let err = parse("$.items[?(@.* == 1)]").unwrap_err();
        assert!(matches!(err, ParseError::NonSingularQuery(_)));
    }
}
