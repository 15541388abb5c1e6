use crate::cycle_finder::CycleFinder;
use crate::graph_builder::build_adjacency;
use crate::nesting::{resolve_nesting, LoopInfo};
use crate::{Edge, Region, RegionConfig, Ring, Vertex};
use std::collections::HashMap;
use tracing::debug;

// Below this there cannot be a closed loop worth looking at
const MIN_GRAPH_SIZE: usize = 3;

/// Find the closed regions of a topology graph using the default tolerances
pub fn find_closed_regions(vertices: &[Vertex], edges: &[Edge]) -> Vec<Region> {
    find_closed_regions_with_config(vertices, edges, &RegionConfig::default())
}

/// Find the closed regions of a topology graph.
///
/// Loops at even nesting depth are region boundaries; loops directly inside them (odd
/// depth) are their holes. A loop two levels down is solid again and yields a region of
/// its own. Regions come back in the order their boundary loop was discovered.
pub fn find_closed_regions_with_config(
    vertices: &[Vertex],
    edges: &[Edge],
    config: &RegionConfig,
) -> Vec<Region> {
    if vertices.len() < MIN_GRAPH_SIZE || edges.len() < MIN_GRAPH_SIZE {
        return Vec::new();
    }

    let loops = collect_loops(vertices, edges);
    let forest = resolve_nesting(&loops, config.edge_tolerance);
    let mut regions = Vec::new();

    for (i, boundary) in loops.iter().enumerate() {
        if !boundary.is_valid() || forest.depth[i] % 2 != 0 {
            continue;
        }

        let holes: Vec<&LoopInfo> = loops
            .iter()
            .enumerate()
            .filter(|&(j, hole)| {
                forest.parent[j] == Some(i) && forest.depth[j] % 2 == 1 && hole.is_valid()
            })
            .map(|(_, hole)| hole)
            .collect();

        let hole_area: f64 = holes.iter().map(|h| h.area).sum();
        let net_area = (boundary.area - hole_area).max(0.0);

        if net_area < config.min_region_area {
            debug!(
                "Dropping region {:?}: net area {} below {}",
                boundary.vertex_ids, net_area, config.min_region_area
            );
            continue;
        }

        regions.push(Region {
            boundary: to_ring(boundary),
            holes: holes.into_iter().map(to_ring).collect(),
            net_area,
        });
    }

    debug!("Found {} regions from {} loops", regions.len(), loops.len());
    regions
}

/// Find the unique cycles of a topology graph as vertex id sequences
pub fn find_cycles(vertices: &[Vertex], edges: &[Edge]) -> Vec<Vec<String>> {
    let adjacency = build_adjacency(vertices, edges);
    CycleFinder::new(&adjacency)
        .find()
        .into_iter()
        .map(|cycle| {
            cycle
                .into_iter()
                .map(|node| adjacency.vertex(node).id.clone())
                .collect()
        })
        .collect()
}

/// Discover cycles and resolve each one against the vertex positions
fn collect_loops(vertices: &[Vertex], edges: &[Edge]) -> Vec<LoopInfo> {
    let mut positions = HashMap::with_capacity(vertices.len());
    for vertex in vertices {
        positions.entry(vertex.id.as_str()).or_insert(vertex.position);
    }

    find_cycles(vertices, edges)
        .into_iter()
        .map(|ids| {
            let points = ids
                .iter()
                .filter_map(|id| positions.get(id.as_str()).copied())
                .collect();
            LoopInfo::new(ids, points)
        })
        .filter(|info| info.points.len() == info.vertex_ids.len() && info.points.len() >= 3)
        .collect()
}

fn to_ring(info: &LoopInfo) -> Ring {
    Ring {
        vertex_ids: info.vertex_ids.clone(),
        points: info.points.clone(),
        area: info.area,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(prefix: &str, min: f64, max: f64) -> (Vec<Vertex>, Vec<Edge>) {
        let ids: Vec<String> = (0..4).map(|i| format!("{prefix}{i}")).collect();
        let vertices = vec![
            Vertex::new(&ids[0], min, min),
            Vertex::new(&ids[1], max, min),
            Vertex::new(&ids[2], max, max),
            Vertex::new(&ids[3], min, max),
        ];
        let edges = (0..4)
            .map(|i| Edge::new(format!("{prefix}e{i}"), &ids[i], &ids[(i + 1) % 4]))
            .collect();
        (vertices, edges)
    }

    fn merge(parts: Vec<(Vec<Vertex>, Vec<Edge>)>) -> (Vec<Vertex>, Vec<Edge>) {
        let mut vertices = Vec::new();
        let mut edges = Vec::new();
        for (v, e) in parts {
            vertices.extend(v);
            edges.extend(e);
        }
        (vertices, edges)
    }

    #[test]
    fn test_room_detection_simple_square() {
        let (vertices, edges) = square("s", 0.0, 100.0);
        let regions = find_closed_regions(&vertices, &edges);

        assert_eq!(regions.len(), 1);
        assert!((regions[0].net_area - 10000.0).abs() < 1e-6);
        assert!(regions[0].holes.is_empty());
        assert_eq!(regions[0].boundary.vertex_ids.len(), 4);
    }

    #[test]
    fn test_square_with_hole() {
        let (vertices, mut edges) = merge(vec![square("o", 0.0, 100.0), square("i", 25.0, 75.0)]);
        edges.push(Edge::new("bridge", "o0", "i0"));
        let regions = find_closed_regions(&vertices, &edges);

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].holes.len(), 1);
        assert!((regions[0].boundary.area - 10000.0).abs() < 1e-6);
        assert!((regions[0].holes[0].area - 2500.0).abs() < 1e-6);
        assert!((regions[0].net_area - 7500.0).abs() < 1e-6);
    }

    #[test]
    fn test_island_inside_hole_is_own_region() {
        let (vertices, edges) = merge(vec![
            square("a", 0.0, 300.0),
            square("b", 50.0, 250.0),
            square("c", 100.0, 200.0),
        ]);
        let regions = find_closed_regions(&vertices, &edges);

        assert_eq!(regions.len(), 2);
        assert!((regions[0].net_area - (90000.0 - 40000.0)).abs() < 1e-6);
        assert_eq!(regions[0].holes.len(), 1);
        assert!((regions[1].net_area - 10000.0).abs() < 1e-6);
        assert!(regions[1].holes.is_empty());
    }

    #[test]
    fn test_grandchild_is_not_a_hole() {
        let (vertices, edges) = merge(vec![
            square("a", 0.0, 300.0),
            square("b", 50.0, 250.0),
            square("c", 100.0, 200.0),
        ]);
        let regions = find_closed_regions(&vertices, &edges);
        let outer_hole_ids: Vec<&String> = regions[0]
            .holes
            .iter()
            .flat_map(|h| h.vertex_ids.iter())
            .collect();

        assert!(outer_hole_ids.iter().all(|id| id.starts_with('b')));
    }

    #[test]
    fn test_hole_filling_boundary_drops_region() {
        // Inner loop hugs the outer one within tolerance, leaving a negligible sliver
        let (vertices, edges) = merge(vec![square("o", 0.0, 100.0), square("i", 0.1, 99.9)]);
        let regions = find_closed_regions(&vertices, &edges);

        assert!(regions.is_empty());
    }

    #[test]
    fn test_small_input_short_circuits() {
        let vertices = vec![Vertex::new("a", 0.0, 0.0), Vertex::new("b", 10.0, 0.0)];
        let edges = vec![Edge::new("ab", "a", "b")];

        assert!(find_closed_regions(&vertices, &edges).is_empty());
    }

    #[test]
    fn test_sliver_below_threshold_dropped() {
        let vertices = vec![
            Vertex::new("a", 0.0, 0.0),
            Vertex::new("b", 10.0, 0.0),
            Vertex::new("c", 5.0, 2.0),
        ];
        let edges = vec![
            Edge::new("ab", "a", "b"),
            Edge::new("bc", "b", "c"),
            Edge::new("ca", "c", "a"),
        ];

        assert_eq!(find_cycles(&vertices, &edges).len(), 1);
        assert!(find_closed_regions(&vertices, &edges).is_empty());

        let config = RegionConfig {
            min_region_area: 5.0,
            ..RegionConfig::default()
        };
        assert_eq!(find_closed_regions_with_config(&vertices, &edges, &config).len(), 1);
    }

    #[test]
    fn test_collinear_cycle_never_emitted() {
        let vertices = vec![
            Vertex::new("a", 0.0, 0.0),
            Vertex::new("b", 10.0, 0.0),
            Vertex::new("c", 20.0, 0.0),
        ];
        let edges = vec![
            Edge::new("ab", "a", "b"),
            Edge::new("bc", "b", "c"),
            Edge::new("ca", "c", "a"),
        ];
        let config = RegionConfig {
            min_region_area: 0.0,
            ..RegionConfig::default()
        };

        assert!(find_closed_regions_with_config(&vertices, &edges, &config).is_empty());
    }

    #[test]
    fn test_find_cycles_returns_ids() {
        let (vertices, edges) = square("s", 0.0, 100.0);
        let cycles = find_cycles(&vertices, &edges);

        assert_eq!(cycles.len(), 1);
        let mut ids = cycles[0].clone();
        ids.sort();
        assert_eq!(ids, vec!["s0", "s1", "s2", "s3"]);
    }
}
