//! Integration tests for the layout engine

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use umlschema::plugins::plantuml::{
    canvas_size, connected_components, snap_all, ClusterLayout, GridLayout, LayoutConfig,
    Relation, RelationKind,
};
use umlschema::{CanvasSize, Position};

const NAMES: [&str; 8] = ["A", "B", "C", "D", "E", "F", "G", "H"];

fn relations_from(edges: &[(usize, usize)]) -> Vec<Relation> {
    edges
        .iter()
        .map(|(a, b)| Relation::new(NAMES[*a], NAMES[*b], RelationKind::Association))
        .collect()
}

/// Union-find reference for connectivity
fn reference_components(n: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    fn find(parent: &mut [usize], x: usize) -> usize {
        if parent[x] != x {
            let root = find(parent, parent[x]);
            parent[x] = root;
        }
        parent[x]
    }
    let mut parent: Vec<usize> = (0..n).collect();
    for &(a, b) in edges {
        if a < n && b < n {
            let (ra, rb) = (find(&mut parent, a), find(&mut parent, b));
            parent[ra] = rb;
        }
    }
    (0..n).map(|x| find(&mut parent, x)).collect()
}

#[test]
fn test_default_spacing() {
    let positions = ClusterLayout::new().compute(
        &["A", "B", "C", "D", "E"],
        &relations_from(&[(0, 1), (1, 2), (2, 3), (3, 4)]),
    );
    // five nodes: three columns, two rows
    assert_eq!(positions["A"], Position::new(50.0, 50.0));
    assert_eq!(positions["C"], Position::new(750.0, 50.0));
    assert_eq!(positions["D"], Position::new(50.0, 250.0));
    assert_eq!(positions["E"], Position::new(400.0, 250.0));
}

#[test]
fn test_custom_config() {
    let config = LayoutConfig {
        node_width: 100.0,
        node_height: 40.0,
        horizontal_spacing: 20.0,
        vertical_spacing: 10.0,
        padding: 0.0,
        ..LayoutConfig::default()
    };
    let positions = ClusterLayout::with_config(config).compute(&["A", "B"], &[]);
    assert_eq!(positions["A"], Position::new(0.0, 0.0));
    assert_eq!(positions["B"], Position::new(0.0, 70.0));
    assert_eq!(
        canvas_size(&positions, &config),
        CanvasSize {
            width: 100.0,
            height: 110.0
        }
    );
}

#[test]
fn test_ties_keep_discovery_order() {
    let positions = ClusterLayout::new().compute(
        &["X", "A", "B", "C", "D"],
        &relations_from(&[(2, 3)]),
    );
    // NAMES[2] = C, NAMES[3] = D; X, A, B are singletons
    assert_eq!(positions["C"].y, 50.0);
    assert_eq!(positions["D"].y, 50.0);
    assert_eq!(positions["X"].y, 450.0);
    assert_eq!(positions["A"].y, 850.0);
    assert_eq!(positions["B"].y, 1250.0);
}

#[test]
fn test_dangling_relation_is_ignored() {
    let relations = vec![Relation::new("A", "Ghost", RelationKind::Composition)];
    let positions = ClusterLayout::new().compute(&["A"], &relations);
    assert_eq!(positions.len(), 1);
    assert!(!positions.contains_key("Ghost"));
}

#[test]
fn test_grid_snap() {
    let config = LayoutConfig {
        padding: 12.0,
        ..LayoutConfig::default()
    };
    let mut positions = GridLayout::with_config(config).compute(&["A", "B"]);
    snap_all(&mut positions, config.snap_size);
    assert_eq!(positions["A"], Position::new(0.0, 0.0));
    assert_eq!(positions["B"], Position::new(350.0, 0.0));
}

proptest! {
    #[test]
    fn components_match_connectivity(
        n in 1usize..=8,
        edges in prop::collection::vec((0usize..8, 0usize..8), 0..16),
    ) {
        let nodes = &NAMES[..n];
        let relations = relations_from(&edges);
        let reference = reference_components(n, &edges);

        let components = connected_components(nodes, &relations);
        let mut component_of = HashMap::new();
        for (id, component) in components.iter().enumerate() {
            for name in component {
                prop_assert!(component_of.insert(name.clone(), id).is_none());
            }
        }
        prop_assert_eq!(component_of.len(), n);

        for a in 0..n {
            for b in 0..n {
                let same = component_of[NAMES[a]] == component_of[NAMES[b]];
                prop_assert_eq!(same, reference[a] == reference[b]);
            }
        }
    }

    #[test]
    fn cluster_layout_never_overlaps(
        n in 0usize..=8,
        edges in prop::collection::vec((0usize..8, 0usize..8), 0..16),
    ) {
        let nodes = &NAMES[..n];
        let positions = ClusterLayout::new().compute(nodes, &relations_from(&edges));
        prop_assert_eq!(positions.len(), n);

        let distinct: HashSet<(i64, i64)> = positions
            .values()
            .map(|p| (p.x as i64, p.y as i64))
            .collect();
        prop_assert_eq!(distinct.len(), n);
    }

    #[test]
    fn layout_is_deterministic(
        n in 0usize..=8,
        edges in prop::collection::vec((0usize..8, 0usize..8), 0..16),
    ) {
        let nodes = &NAMES[..n];
        let relations = relations_from(&edges);
        let layout = ClusterLayout::new();
        prop_assert_eq!(layout.compute(nodes, &relations), layout.compute(nodes, &relations));
    }
}
