//! Core error types for diagram processing
//!
//! Parsing and layout degrade gracefully and never fail. The errors below are
//! the few conditions that must reach a caller.

use thiserror::Error;

/// Errors surfaced by the schema pipeline and its I/O edges
#[derive(Error, Debug)]
pub enum UmlError {
    #[error("Class not found: {name}")]
    ClassNotFound { name: String },

    #[error("Cyclic inheritance at {class}: {}", chain.join(" -> "))]
    CyclicInheritance { class: String, chain: Vec<String> },

    #[error("Invalid schema heuristics: {message}")]
    InvalidHeuristics { message: String },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl UmlError {
    /// Create a new class-not-found error
    pub fn class_not_found(name: impl Into<String>) -> Self {
        Self::ClassNotFound { name: name.into() }
    }

    /// Create a new cyclic-inheritance error
    ///
    /// `chain` is the ancestor walk that led back to `class`.
    pub fn cyclic_inheritance(class: impl Into<String>, chain: Vec<String>) -> Self {
        Self::CyclicInheritance {
            class: class.into(),
            chain,
        }
    }

    /// Create a new invalid-heuristics error
    pub fn invalid_heuristics(message: impl Into<String>) -> Self {
        Self::InvalidHeuristics {
            message: message.into(),
        }
    }
}
