//! Core parser trait for diagram markup
//!
//! A parser turns diagram text into a model. Parsing is best-effort: input
//! that does not match the grammar yields a partial model, never an error.

/// Core trait for diagram parsers
///
/// # Example
/// ```
/// use umlschema::core::Parser;
/// use umlschema::plugins::plantuml::PlantUmlParser;
///
/// let model = PlantUmlParser::new().parse("class Foo {\n nome : String\n}");
/// assert_eq!(model.classes.len(), 1);
/// ```
pub trait Parser: Send + Sync {
    /// The model produced by this parser
    type Output;

    /// Parse diagram markup into a fresh model
    fn parse(&self, input: &str) -> Self::Output;

    /// Get the name of this parser
    fn name(&self) -> &'static str;

    /// Get the version of this parser
    fn version(&self) -> &'static str;

    /// Check if the input looks like something this parser understands
    fn can_parse(&self, input: &str) -> bool;
}
