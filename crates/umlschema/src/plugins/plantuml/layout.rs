//! Diagram layout
//!
//! Places class and interface boxes on a 2-D canvas. The cluster layout
//! groups connected entities into near-square grids stacked top to bottom,
//! largest group first; the grid layout ignores relations entirely.

use std::collections::{HashMap, HashSet, VecDeque};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, span, trace, warn, Level};

use super::model::Relation;
use crate::core::{CanvasSize, LayoutAlgorithm, Position, PositionMap};

/// Box dimensions and spacing shared by all layouts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    pub node_width: f64,
    pub node_height: f64,
    pub horizontal_spacing: f64,
    pub vertical_spacing: f64,
    pub padding: f64,
    /// Columns used by [`GridLayout`]
    pub grid_columns: usize,
    /// Quantum for [`snap_to_grid`]
    pub snap_size: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 250.0,
            node_height: 100.0,
            horizontal_spacing: 100.0,
            vertical_spacing: 100.0,
            padding: 50.0,
            grid_columns: 5,
            snap_size: 25.0,
        }
    }
}

impl LayoutConfig {
    fn column_step(&self) -> f64 {
        self.node_width + self.horizontal_spacing
    }

    fn row_step(&self) -> f64 {
        self.node_height + self.vertical_spacing
    }
}

/// Smallest `c` with `c * c >= n`
fn square_columns(n: usize) -> usize {
    let mut columns = 1;
    while columns * columns < n {
        columns += 1;
    }
    columns
}

/// Connected components of the undirected graph over `nodes`
///
/// Components are listed in discovery order and hold names in BFS visitation
/// order. Relations with an endpoint outside `nodes` are ignored, and a name
/// repeated in `nodes` is only counted once.
pub fn connected_components(nodes: &[&str], relations: &[Relation]) -> Vec<Vec<String>> {
    let known: HashSet<&str> = nodes.iter().copied().collect();
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();

    for relation in relations {
        let (from, to) = (relation.from.as_str(), relation.to.as_str());
        if !known.contains(from) || !known.contains(to) {
            warn!(from, to, "Relation endpoint outside the node set ignored for layout");
            continue;
        }
        adjacency.entry(from).or_default().push(to);
        adjacency.entry(to).or_default().push(from);
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut components = Vec::new();

    for &start in nodes {
        if !visited.insert(start) {
            continue;
        }
        let mut component = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            component.push(current.to_string());
            for &next in adjacency.get(current).into_iter().flatten() {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        components.push(component);
    }

    components
}

/// Connectivity-aware layout: one near-square grid per connected component
#[derive(Debug, Clone, Default)]
pub struct ClusterLayout {
    config: LayoutConfig,
}

impl ClusterLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Compute positions for `nodes`; deterministic for a given input order
    pub fn compute(&self, nodes: &[&str], relations: &[Relation]) -> PositionMap {
        let layout_span = span!(Level::INFO, "cluster_layout", nodes = nodes.len());
        let _enter = layout_span.enter();

        let mut components = connected_components(nodes, relations);
        // Stable: equal sizes keep discovery order
        components.sort_by(|a, b| b.len().cmp(&a.len()));
        debug!(components = components.len(), "Components found");

        let config = &self.config;
        let mut positions = PositionMap::new();
        let mut origin_y = config.padding;

        for component in &components {
            let columns = square_columns(component.len());
            let rows = component.len().div_ceil(columns);
            trace!(size = component.len(), columns, rows, origin_y, "Placing component");

            for (i, name) in component.iter().enumerate() {
                let col = (i % columns) as f64;
                let row = (i / columns) as f64;
                positions.insert(
                    name.clone(),
                    Position::new(
                        config.padding + col * config.column_step(),
                        origin_y + row * config.row_step(),
                    ),
                );
            }

            origin_y += rows as f64 * config.row_step() + 2.0 * config.vertical_spacing;
        }

        positions
    }
}

impl LayoutAlgorithm for ClusterLayout {
    fn layout(&self, nodes: &[&str], relations: &[Relation]) -> Result<PositionMap> {
        Ok(self.compute(nodes, relations))
    }

    fn name(&self) -> &'static str {
        "cluster"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }
}

/// Row-major grid that ignores relations
#[derive(Debug, Clone, Default)]
pub struct GridLayout {
    config: LayoutConfig,
}

impl GridLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn compute(&self, nodes: &[&str]) -> PositionMap {
        let config = &self.config;
        let columns = config.grid_columns.max(1);
        let mut positions = PositionMap::new();

        for name in nodes {
            if positions.contains_key(*name) {
                continue;
            }
            let i = positions.len();
            let col = (i % columns) as f64;
            let row = (i / columns) as f64;
            positions.insert(
                name.to_string(),
                Position::new(
                    config.padding + col * config.column_step(),
                    config.padding + row * config.row_step(),
                ),
            );
        }

        debug!(nodes = positions.len(), columns, "Grid layout computed");
        positions
    }
}

impl LayoutAlgorithm for GridLayout {
    fn layout(&self, nodes: &[&str], _relations: &[Relation]) -> Result<PositionMap> {
        Ok(self.compute(nodes))
    }

    fn name(&self) -> &'static str {
        "grid"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }
}

/// Round both coordinates to the nearest multiple of `grid`, halves rounding up
///
/// A non-positive `grid` leaves the position untouched.
pub fn snap_to_grid(position: Position, grid: f64) -> Position {
    if grid <= 0.0 {
        return position;
    }
    let snap = |v: f64| (v / grid + 0.5).floor() * grid;
    Position::new(snap(position.x), snap(position.y))
}

/// Snap every position in place
pub fn snap_all(positions: &mut PositionMap, grid: f64) {
    for position in positions.values_mut() {
        *position = snap_to_grid(*position, grid);
    }
}

/// Bounding extent of all boxes plus padding on the far sides
///
/// An empty map yields a canvas of just the padding.
pub fn canvas_size(positions: &PositionMap, config: &LayoutConfig) -> CanvasSize {
    let (max_x, max_y) = positions.values().fold((0.0_f64, 0.0_f64), |(mx, my), p| {
        (mx.max(p.x + config.node_width), my.max(p.y + config.node_height))
    });
    CanvasSize {
        width: max_x + config.padding,
        height: max_y + config.padding,
    }
}
