//! Plugin implementations
//!
//! `plantuml` turns diagram text into a model and positions its entities;
//! `schema` derives entity schemas from that model.

pub mod plantuml;
pub mod schema;

pub use plantuml::*;
pub use schema::*;
