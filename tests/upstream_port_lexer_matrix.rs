//! Lexer edge cases ported from the escape-handling and reserved-word
//! behavior of the upstream lexer, extended with the surrogate-pair
//! support this implementation adds on top of it.

use jqpath::{JsonPath, LexError, ParseError};

fn lex_err(src: &str) -> LexError {
    match JsonPath::compile(src) {
        Err(ParseError::Lex(e)) => e,
        other => panic!("expected a lex error for {:?}, got {:?}", src, other),
    }
}

#[test]
fn rejects_unterminated_string() {
    assert!(matches!(lex_err("$['a"), LexError::UnterminatedString { .. }));
}

#[test]
fn rejects_control_character_in_string() {
    assert!(matches!(lex_err("$['a\u{1}b']"), LexError::ControlCharacterInString { .. }));
}

#[test]
fn rejects_bad_escape() {
    assert!(matches!(lex_err(r#"$['\q']"#), LexError::InvalidEscape { .. }));
}

#[test]
fn rejects_unpaired_high_surrogate() {
    assert!(matches!(lex_err(r#"$["\uD834"]"#), LexError::UnpairedSurrogate { .. }));
}

#[test]
fn accepts_surrogate_pair_string() {
    assert!(JsonPath::compile(r#"$["𝄞"]"#).is_ok());
}

#[test]
fn reserved_words_only_apply_at_word_boundaries() {
    // `wherever` should lex as an identifier, not as `where` + `ver`.
    assert!(JsonPath::compile("$.wherever").is_ok());
}
