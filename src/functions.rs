//! Filter functions: `match()`, `search()`, `length()`, `count()`, `value()`.
//!
//! `match()` requires the whole candidate string to match the pattern;
//! `search()` accepts a match anywhere in the string. Regex `.` is made to
//! exclude not just `\n` but the full RFC 9535 line-terminator set
//! (CR, LF, U+2028, U+2029), since the `regex` crate's default dot only
//! excludes `\n`.

use crate::value::FilterValue;
use regex::Regex;
use serde_json::Value;

/// Rewrites every unescaped, unbracketed `.` in `pattern` to a character
/// class excluding the four line-terminator code points, leaving escape
/// sequences and bracket expressions untouched.
fn exclude_line_terminators(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '[' if !in_class => {
                in_class = true;
                out.push(c);
            }
            ']' if in_class => {
                in_class = false;
                out.push(c);
            }
            '.' if !in_class => {
                out.push_str("[^\\n\\r\\u{2028}\\u{2029}]");
            }
            other => out.push(other),
        }
    }
    out
}

fn compile(pattern: &str, anchor_full: bool) -> Result<Regex, regex::Error> {
    let body = exclude_line_terminators(pattern);
    let source = if anchor_full { format!("^(?:{})$", body) } else { body };
    Regex::new(&source)
}

/// `match(@.field, pattern)` — whole-string match. Non-string operands and
/// invalid patterns are not errors: they simply make the function false,
/// matching the sub-language's total, never-panicking evaluation.
pub fn call_match(haystack: &FilterValue, pattern: &FilterValue) -> FilterValue {
    run(haystack, pattern, true)
}

/// `search(@.field, pattern)` — substring match.
pub fn call_search(haystack: &FilterValue, pattern: &FilterValue) -> FilterValue {
    run(haystack, pattern, false)
}

fn run(haystack: &FilterValue, pattern: &FilterValue, anchor_full: bool) -> FilterValue {
    let (FilterValue::Value(Value::String(s)), FilterValue::Value(Value::String(p))) =
        (haystack, pattern)
    else {
        return FilterValue::Nothing;
    };
    match compile(p, anchor_full) {
        Ok(re) => FilterValue::Value(Value::Bool(re.is_match(s))),
        Err(_) => FilterValue::Nothing,
    }
}

/// `length(@.field)` — string character count, array/object element count;
/// `Nothing` for numbers, booleans, and `null`.
pub fn call_length(v: &FilterValue) -> FilterValue {
    match v {
        FilterValue::Nothing => FilterValue::Nothing,
        FilterValue::Value(Value::String(s)) => {
            FilterValue::Value(Value::from(s.chars().count() as u64))
        }
        FilterValue::Value(Value::Array(a)) => FilterValue::Value(Value::from(a.len() as u64)),
        FilterValue::Value(Value::Object(o)) => FilterValue::Value(Value::from(o.len() as u64)),
        FilterValue::Value(_) => FilterValue::Nothing,
    }
}

/// `count(@.items[*])` — number of nodes a bare path argument matched.
/// Unlike the other functions, this one is wired up by the evaluator with
/// the raw match count rather than through [`FilterValue`]; see
/// `crate::eval::evaluate_filter_value`.
pub fn call_count(matched_node_count: usize) -> FilterValue {
    FilterValue::Value(Value::from(matched_node_count as u64))
}

/// `value(@.field)` — the single node's contained value, or `Nothing` if
/// the argument does not match exactly one node.
pub fn call_value(single_match: Option<&Value>) -> FilterValue {
    match single_match {
        Some(v) => FilterValue::Value(v.clone()),
        None => FilterValue::Nothing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> FilterValue {
        FilterValue::Value(Value::String(v.to_string()))
    }

    #[test]
    fn match_requires_full_string() {
        assert_eq!(call_match(&s("hello"), &s("ell")), FilterValue::Value(Value::Bool(false)));
        assert_eq!(call_match(&s("hello"), &s("hello")), FilterValue::Value(Value::Bool(true)));
    }

    #[test]
    fn search_accepts_substring() {
        assert_eq!(call_search(&s("hello"), &s("ell")), FilterValue::Value(Value::Bool(true)));
    }

    #[test]
    fn dot_excludes_line_terminators() {
        let hay = s("a\nb");
        assert_eq!(call_search(&hay, &s("a.b")), FilterValue::Value(Value::Bool(false)));
    }

    #[test]
    fn length_of_non_sized_value_is_nothing() {
        assert_eq!(call_length(&FilterValue::Value(Value::from(5))), FilterValue::Nothing);
    }

    #[test]
    fn value_of_no_match_is_nothing() {
        assert_eq!(call_value(None), FilterValue::Nothing);
    }
}
