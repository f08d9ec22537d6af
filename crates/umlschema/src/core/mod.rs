//! Core abstractions for diagram processing
//!
//! Traits at the seams between the pipeline stages, shared types, errors and
//! logging. Diagram-specific implementations live in [`crate::plugins`].

pub mod chumsky_utils;
mod error;
mod layout;
pub mod logging;
mod parser;
mod types;

pub use error::*;
pub use layout::*;
pub use logging::*;
pub use parser::*;
pub use types::*;
