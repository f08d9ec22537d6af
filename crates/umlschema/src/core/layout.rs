//! Core layout trait for diagram positioning
//!
//! A layout algorithm assigns a canvas position to every named node. It is a
//! pure function of the node order and the relation list.

use anyhow::Result;

use super::PositionMap;
use crate::plugins::plantuml::Relation;

/// Core trait for layout algorithms
///
/// # Example
/// ```
/// use umlschema::core::LayoutAlgorithm;
/// use umlschema::plugins::plantuml::ClusterLayout;
///
/// let positions = ClusterLayout::new().layout(&["A", "B"], &[]).unwrap();
/// assert_eq!(positions.len(), 2);
/// ```
pub trait LayoutAlgorithm: Send + Sync {
    /// Position every node in `nodes`; relations naming unknown nodes are ignored
    fn layout(&self, nodes: &[&str], relations: &[Relation]) -> Result<PositionMap>;

    /// Get the name of this layout algorithm
    fn name(&self) -> &'static str;

    /// Get the version of this layout algorithm
    fn version(&self) -> &'static str;
}
