//! PlantUML class-diagram plugin
//!
//! Text parsing into a [`ParsedModel`] and layout of its classes and
//! interfaces.

mod layout;
mod model;
mod parser;
mod relations;

pub use layout::{
    canvas_size, connected_components, snap_all, snap_to_grid, ClusterLayout, GridLayout,
    LayoutConfig,
};
pub use model::{
    Attribute, Class, Enum, Interface, Method, ModelFilter, ModelSummary, ParsedModel, Relation,
    RelationKind,
};
pub use parser::{EntityRef, ParserState, PlantUmlParser, DEFAULT_ATTRIBUTE_TYPE, VOID_TYPE};
pub use relations::{relation_patterns, RelationMatcher, RelationPattern};
