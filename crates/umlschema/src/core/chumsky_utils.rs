//! Shared chumsky combinators for line-oriented diagram parsing
//!
//! Every parser here works on a single trimmed line; none of them consume
//! newlines.

use chumsky::prelude::*;

/// Is this an identifier character (`[A-Za-z0-9_]`)?
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A run of ASCII word characters.
pub fn word<'src>() -> impl Parser<'src, &'src str, String> + Clone {
    any()
        .filter(|c: &char| is_word_char(*c))
        .repeated()
        .at_least(1)
        .to_slice()
        .map(str::to_string)
}

/// Optional inline whitespace.
pub fn inline_whitespace<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    any()
        .filter(|c: &char| c.is_whitespace())
        .repeated()
        .ignored()
}

/// At least one inline whitespace character.
pub fn inline_whitespace_required<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    any()
        .filter(|c: &char| c.is_whitespace())
        .repeated()
        .at_least(1)
        .ignored()
}

/// A double-quoted, non-empty string; yields the text between the quotes.
pub fn quoted<'src>() -> impl Parser<'src, &'src str, String> + Clone {
    none_of('"')
        .repeated()
        .at_least(1)
        .to_slice()
        .map(str::to_string)
        .delimited_by(just('"'), just('"'))
}

/// A bracketed style/direction modifier such as `[thickness=2]` or `[#red,bold]`.
pub fn bracket_modifier<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    just('[')
        .ignore_then(none_of(']').repeated())
        .then_ignore(just(']'))
        .ignored()
}

/// Swallow whatever is left of the line.
pub fn rest_of_line<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    any().repeated().ignored()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word() {
        let parser = word().then_ignore(end());
        assert_eq!(parser.parse("Order_2").into_result().ok(), Some("Order_2".to_string()));
        assert!(parser.parse("Or-der").into_result().is_err());
        assert!(parser.parse("").into_result().is_err());
    }

    #[test]
    fn test_inline_whitespace_required() {
        let parser = just("a")
            .then(inline_whitespace_required())
            .then(just("b"))
            .then_ignore(end());
        assert!(parser.parse("a b").into_result().is_ok());
        assert!(parser.parse("a \t b").into_result().is_ok());
        assert!(parser.parse("ab").into_result().is_err());
    }

    #[test]
    fn test_quoted() {
        let parser = quoted().then_ignore(end());
        assert_eq!(
            parser.parse("\"Order Line\"").into_result().ok(),
            Some("Order Line".to_string())
        );
        assert!(parser.parse("\"\"").into_result().is_err());
    }

    #[test]
    fn test_bracket_modifier() {
        let parser = bracket_modifier().then_ignore(end());
        assert!(parser.parse("[thickness=2]").into_result().is_ok());
        assert!(parser.parse("[]").into_result().is_ok());
        assert!(parser.parse("[open").into_result().is_err());
    }
}
