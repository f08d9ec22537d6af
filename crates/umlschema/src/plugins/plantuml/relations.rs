//! Relation line recognition
//!
//! An ordered table of chumsky patterns, tightest first. The first pattern
//! that matches anywhere in the line decides the relation kind; the rest are
//! not tried. Composition and aggregation must stay ahead of the generic
//! association patterns or `*--` and `o--` lines would be read as `--`.

use chumsky::prelude::*;
use chumsky::Boxed;

use super::model::{Relation, RelationKind};
use crate::core::chumsky_utils::{
    bracket_modifier, inline_whitespace, inline_whitespace_required, rest_of_line, word,
};

type Endpoints = (String, String);

/// A boxed line pattern yielding `(from, to)`
pub type RelationPattern<'src> = Boxed<'src, 'src, &'src str, Endpoints, extra::Default>;

/// `(\w+)\s+`
fn subject<'src>() -> impl Parser<'src, &'src str, String> + Clone {
    word().then_ignore(inline_whitespace_required())
}

/// `(\w+)(::\w+)?\s+`
fn member_subject<'src>() -> impl Parser<'src, &'src str, String> + Clone {
    word()
        .then_ignore(just("::").then(word()).or_not())
        .then_ignore(inline_whitespace_required())
}

fn dashes<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    just('-').repeated().at_least(1).ignored()
}

fn dots<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    just('.').repeated().at_least(1).ignored()
}

fn direction<'src>() -> impl Parser<'src, &'src str, Option<char>> + Clone {
    one_of("udlr").or_not()
}

/// `[udlr]?-?\s*(\w+)`
fn decorated_target<'src>() -> impl Parser<'src, &'src str, String> + Clone {
    let plain = just('-')
        .or_not()
        .ignore_then(inline_whitespace())
        .ignore_then(word());
    one_of("udlr").ignore_then(plain.clone()).or(plain)
}

/// `\s*(\w+)`
fn near_target<'src>() -> impl Parser<'src, &'src str, String> + Clone {
    inline_whitespace().ignore_then(word())
}

/// `\s+(\w+)`
fn spaced_target<'src>() -> impl Parser<'src, &'src str, String> + Clone {
    inline_whitespace_required().ignore_then(word())
}

fn finish<'src>(
    pattern: impl Parser<'src, &'src str, Endpoints> + Clone + 'src,
) -> RelationPattern<'src> {
    pattern.then_ignore(rest_of_line()).boxed()
}

/// The matcher table in priority order
pub fn relation_patterns<'src>() -> Vec<(RelationKind, RelationPattern<'src>)> {
    use RelationKind::*;

    vec![
        // A <|-[mods]- B
        (
            Inheritance,
            finish(
                subject()
                    .then_ignore(just("<|").then(dashes()).then(bracket_modifier()))
                    .then(decorated_target()),
            ),
        ),
        // A <|--d B
        (
            Inheritance,
            finish(
                subject()
                    .then_ignore(just("<|").then(dashes()).then(direction()))
                    .then(spaced_target()),
            ),
        ),
        // A <|-- B
        (
            Inheritance,
            finish(
                subject()
                    .then_ignore(just("<|").then(dashes()))
                    .then(spaced_target()),
            ),
        ),
        // A <|.[mods]d. B
        (
            Implementation,
            finish(
                subject()
                    .then_ignore(
                        just("<|")
                            .then(dots())
                            .then(bracket_modifier())
                            .then(direction())
                            .then(dots()),
                    )
                    .then(near_target()),
            ),
        ),
        // A <|.d. B, A <|.. B
        (
            Implementation,
            finish(
                subject()
                    .then_ignore(just("<|").then(
                        dots()
                            .then(one_of("udlr"))
                            .then(dots())
                            .ignored()
                            .or(just('.').repeated().at_least(2).ignored()),
                    ))
                    .then(near_target()),
            ),
        ),
        // A <|.[mods] B
        (
            Implementation,
            finish(
                subject()
                    .then_ignore(just("<|").then(dots()).then(bracket_modifier()))
                    .then(near_target()),
            ),
        ),
        // A <|. B
        (
            Implementation,
            finish(
                subject()
                    .then_ignore(just("<|").then(dots()))
                    .then(spaced_target()),
            ),
        ),
        // A *-[mods]- B
        (
            Composition,
            finish(
                member_subject()
                    .then_ignore(just('*').then(dashes()).then(bracket_modifier()))
                    .then(decorated_target()),
            ),
        ),
        // A -[mods]* B
        (
            Composition,
            finish(
                member_subject()
                    .then_ignore(
                        dashes()
                            .then(bracket_modifier())
                            .then(direction())
                            .then(just('*')),
                    )
                    .then(near_target()),
            ),
        ),
        (
            Composition,
            finish(member_subject().then_ignore(just("*--")).then(spaced_target())),
        ),
        (
            Composition,
            finish(member_subject().then_ignore(just("--*")).then(spaced_target())),
        ),
        // A o-[mods]- B
        (
            Aggregation,
            finish(
                member_subject()
                    .then_ignore(just('o').then(dashes()).then(bracket_modifier()))
                    .then(decorated_target()),
            ),
        ),
        // A -[mods]o B
        (
            Aggregation,
            finish(
                member_subject()
                    .then_ignore(
                        dashes()
                            .then(bracket_modifier())
                            .then(direction())
                            .then(just('o')),
                    )
                    .then(near_target()),
            ),
        ),
        (
            Aggregation,
            finish(member_subject().then_ignore(just("o--")).then(spaced_target())),
        ),
        (
            Aggregation,
            finish(member_subject().then_ignore(just("--o")).then(spaced_target())),
        ),
        (
            Aggregation,
            finish(
                member_subject()
                    .then_ignore(just('o').then(dots()))
                    .then(spaced_target()),
            ),
        ),
        // A -[mods]> B
        (
            Association,
            finish(
                member_subject()
                    .then_ignore(
                        dashes()
                            .then(bracket_modifier())
                            .then(direction())
                            .then(just('>')),
                    )
                    .then(near_target()),
            ),
        ),
        // A <-[mods]- B
        (
            Association,
            finish(
                member_subject()
                    .then_ignore(just('<').then(dashes()).then(bracket_modifier()))
                    .then(decorated_target()),
            ),
        ),
        (
            Association,
            finish(member_subject().then_ignore(just("-->")).then(spaced_target())),
        ),
        (
            Association,
            finish(member_subject().then_ignore(just("<--")).then(spaced_target())),
        ),
        (
            Dependency,
            finish(
                member_subject()
                    .then_ignore(dots().then(just('>')))
                    .then(spaced_target()),
            ),
        ),
        // A -[mods]- B
        (
            Association,
            finish(
                member_subject()
                    .then_ignore(dashes().then(bracket_modifier()))
                    .then(decorated_target()),
            ),
        ),
        (
            Association,
            finish(member_subject().then_ignore(just("--")).then(spaced_target())),
        ),
        (
            Nested,
            finish(subject().then_ignore(just("+--")).then(spaced_target())),
        ),
    ]
}

/// Compiled relation table, built once per parse
pub struct RelationMatcher<'src> {
    patterns: Vec<(RelationKind, RelationPattern<'src>)>,
}

impl<'src> RelationMatcher<'src> {
    pub fn new() -> Self {
        Self {
            patterns: relation_patterns(),
        }
    }

    /// Recognise a relation anywhere in `line`
    ///
    /// Patterns are tried in table order; for each pattern the leftmost
    /// starting position wins.
    pub fn match_line(&self, line: &'src str) -> Option<Relation> {
        self.patterns.iter().find_map(|(kind, pattern)| {
            line.char_indices().find_map(|(offset, _)| {
                pattern
                    .parse(&line[offset..])
                    .into_result()
                    .ok()
                    .map(|(from, to)| Relation::new(from, to, *kind))
            })
        })
    }
}

impl Default for RelationMatcher<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(line: &str) -> Option<(String, String, RelationKind)> {
        RelationMatcher::new()
            .match_line(line)
            .map(|r| (r.from, r.to, r.kind))
    }

    fn expect(line: &str, from: &str, to: &str, kind: RelationKind) {
        assert_eq!(
            kind_of(line),
            Some((from.to_string(), to.to_string(), kind)),
            "line: {line}"
        );
    }

    #[test]
    fn test_inheritance_family() {
        expect("A <|-- B", "A", "B", RelationKind::Inheritance);
        expect("A <|--- B", "A", "B", RelationKind::Inheritance);
        expect("A <|--d B", "A", "B", RelationKind::Inheritance);
        expect("A <|-[thickness=2]- B", "A", "B", RelationKind::Inheritance);
        expect("A <|-[#red]d- B", "A", "B", RelationKind::Inheritance);
    }

    #[test]
    fn test_implementation_family() {
        expect("Stampabile <|.. Fattura", "Stampabile", "Fattura", RelationKind::Implementation);
        expect("I <|.d. C", "I", "C", RelationKind::Implementation);
        expect("I <|.[thickness=2]d. C", "I", "C", RelationKind::Implementation);
        expect("I <|.[dashed] C", "I", "C", RelationKind::Implementation);
        expect("I <|. C", "I", "C", RelationKind::Implementation);
    }

    #[test]
    fn test_composition_family() {
        expect("Ordine *-- Riga", "Ordine", "Riga", RelationKind::Composition);
        expect("Riga --* Ordine", "Riga", "Ordine", RelationKind::Composition);
        expect("Ordine *-[bold]- Riga", "Ordine", "Riga", RelationKind::Composition);
        expect("Riga -[bold]* Ordine", "Riga", "Ordine", RelationKind::Composition);
        expect("Ordine::righe *-- Riga", "Ordine", "Riga", RelationKind::Composition);
    }

    #[test]
    fn test_aggregation_family() {
        expect("Catalogo o-- Prodotto", "Catalogo", "Prodotto", RelationKind::Aggregation);
        expect("Prodotto --o Catalogo", "Prodotto", "Catalogo", RelationKind::Aggregation);
        expect("Catalogo o.. Prodotto", "Catalogo", "Prodotto", RelationKind::Aggregation);
        expect("Catalogo o-[dashed]- Prodotto", "Catalogo", "Prodotto", RelationKind::Aggregation);
        expect("Prodotto -[dashed]o Catalogo", "Prodotto", "Catalogo", RelationKind::Aggregation);
    }

    #[test]
    fn test_directed_association_and_dependency() {
        expect("Cliente --> Ordine", "Cliente", "Ordine", RelationKind::Association);
        expect("Cliente <-- Ordine", "Cliente", "Ordine", RelationKind::Association);
        expect("Cliente -[#blue]> Ordine", "Cliente", "Ordine", RelationKind::Association);
        expect("Cliente <-[#blue]- Ordine", "Cliente", "Ordine", RelationKind::Association);
        expect("Servizio ..> Repository", "Servizio", "Repository", RelationKind::Dependency);
        expect("Servizio .> Repository", "Servizio", "Repository", RelationKind::Dependency);
    }

    #[test]
    fn test_undirected_association_and_nested() {
        expect("A -- B", "A", "B", RelationKind::Association);
        expect("A -[hidden]- B", "A", "B", RelationKind::Association);
        expect("Esterna +-- Interna", "Esterna", "Interna", RelationKind::Nested);
    }

    #[test]
    fn test_trailing_labels_are_ignored() {
        expect("Cliente --> Ordine : effettua", "Cliente", "Ordine", RelationKind::Association);
        expect("  Ordine *-- Riga  ", "Ordine", "Riga", RelationKind::Composition);
    }

    #[test]
    fn test_non_relations() {
        assert_eq!(kind_of("class Foo"), None);
        assert_eq!(kind_of("nome : String"), None);
        assert_eq!(kind_of("A ---> B"), None);
        assert_eq!(kind_of("A..|>B"), None);
        assert_eq!(kind_of(""), None);
    }

    #[test]
    fn test_table_is_ordered_tightest_first() {
        let kinds: Vec<RelationKind> = relation_patterns().into_iter().map(|(k, _)| k).collect();
        let first = |k: RelationKind| kinds.iter().position(|x| *x == k).unwrap();
        assert!(first(RelationKind::Inheritance) < first(RelationKind::Implementation));
        assert!(first(RelationKind::Implementation) < first(RelationKind::Composition));
        assert!(first(RelationKind::Composition) < first(RelationKind::Aggregation));
        assert!(first(RelationKind::Aggregation) < first(RelationKind::Association));
        assert_eq!(*kinds.last().unwrap(), RelationKind::Nested);
    }
}
