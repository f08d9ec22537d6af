//! Entity schema generation plugin
//!
//! Turns a [`ParsedModel`](crate::plugins::plantuml::ParsedModel) into
//! declarative [`ClassSchema`] records for CRUD/admin generators.

mod converter;
mod heuristics;
mod types;

pub use converter::{to_camel, SchemaConverter, TypeSpec};
pub use heuristics::{GroupRule, SchemaHeuristics};
pub use types::{
    AttributeSchema, ClassSchema, DeletePolicy, DetailView, EditSchema, Permissions,
    RelationCardinality, RelationSchema, SchemaOutput, ViewSchema,
};

use crate::core::UmlError;
use crate::plugins::plantuml::ParsedModel;

/// Generate the schema of `class_name`, or of every class when `None`
pub fn generate_schemas(
    model: &ParsedModel,
    class_name: Option<&str>,
    heuristics: SchemaHeuristics,
) -> Result<SchemaOutput, UmlError> {
    let converter = SchemaConverter::with_heuristics(model, heuristics);
    match class_name {
        Some(name) => converter.convert_one(name).map(SchemaOutput::One),
        None => converter.convert().map(SchemaOutput::All),
    }
}
