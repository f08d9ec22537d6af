//! umlschema - PlantUML class diagrams to entity schemas
//!
//! A library for parsing PlantUML class-diagram text into a structured model,
//! laying its entities out on a canvas, and generating declarative entity
//! schemas for CRUD/admin generators.
//!
//! # Quick Start
//!
//! ```rust
//! let model = umlschema::parse("class Ordine {\n  codice : String\n}\nOrdine *-- Riga");
//! assert_eq!(model.classes.len(), 1);
//! assert_eq!(model.relations.len(), 1);
//!
//! let schemas = umlschema::convert(&model).unwrap();
//! assert_eq!(schemas[0].title, "{codice}");
//! ```
//!
//! # Advanced Usage
//!
//! For more control, use the individual components:
//!
//! ```rust
//! use umlschema::prelude::*;
//!
//! let input = "class Cliente {\n  nome : String\n}\nclass Ordine\nCliente --> Ordine";
//!
//! let model = PlantUmlParser::new().parse(input);
//! assert_eq!(model.summary().classes, 2);
//!
//! let layout = ClusterLayout::with_config(LayoutConfig::default());
//! let positions = layout.compute(&model.diagram_nodes(), &model.relations);
//! assert_eq!(positions["Ordine"], Position::new(400.0, 50.0));
//!
//! let converter = SchemaConverter::with_heuristics(&model, SchemaHeuristics::default());
//! let cliente = converter.convert_one("Cliente").unwrap();
//! assert_eq!(cliente.attributes[0].field_type, "string");
//! ```

pub mod core;
pub mod plugins;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        CanvasSize, LayoutAlgorithm, Parser, Position, PositionMap, UmlError,
    };
    pub use crate::plugins::plantuml::{
        ClusterLayout, GridLayout, LayoutConfig, ParsedModel, PlantUmlParser, Relation,
        RelationKind,
    };
    pub use crate::plugins::schema::{
        generate_schemas, ClassSchema, SchemaConverter, SchemaHeuristics, SchemaOutput,
    };
}

/// Parse PlantUML class-diagram text
///
/// Parsing is best-effort and never fails; unrecognised lines are skipped.
///
/// # Example
/// ```rust
/// let model = umlschema::parse("A <|-- B");
/// assert_eq!(model.relations[0].from, "A");
/// assert_eq!(model.relations[0].to, "B");
/// ```
pub fn parse(input: &str) -> plugins::plantuml::ParsedModel {
    use crate::core::Parser as _;
    plugins::plantuml::PlantUmlParser::new().parse(input)
}

/// Lay out the classes and interfaces of `model` with the default cluster layout
///
/// # Example
/// ```rust
/// let model = umlschema::parse("class A\nclass B");
/// let positions = umlschema::layout(&model);
/// assert_eq!(positions["A"].y, 50.0);
/// assert_eq!(positions["B"].y, 450.0);
/// ```
pub fn layout(model: &plugins::plantuml::ParsedModel) -> PositionMap {
    plugins::plantuml::ClusterLayout::new().compute(&model.diagram_nodes(), &model.relations)
}

/// Generate schemas for every class of `model`
pub fn convert(
    model: &plugins::plantuml::ParsedModel,
) -> Result<Vec<plugins::schema::ClassSchema>, UmlError> {
    plugins::schema::SchemaConverter::new(model).convert()
}

/// Generate the schema of a single class
///
/// # Example
/// ```rust
/// let model = umlschema::parse("class A");
/// let err = umlschema::convert_one(&model, "Z").unwrap_err();
/// assert_eq!(err.to_string(), "Class not found: Z");
/// ```
pub fn convert_one(
    model: &plugins::plantuml::ParsedModel,
    class_name: &str,
) -> Result<plugins::schema::ClassSchema, UmlError> {
    plugins::schema::SchemaConverter::new(model).convert_one(class_name)
}
