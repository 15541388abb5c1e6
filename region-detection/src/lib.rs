//! Closed-region extraction for floor-plan topology graphs.
//!
//! Given vertices and undirected edges embedded in 2D, [`find_closed_regions`] finds the
//! enclosed loops of the graph, resolves which loops are holes nested inside others and
//! reports every solid region with its net area. The computation is pure: nothing is
//! cached between calls and malformed input is filtered instead of rejected.

use serde::{Deserialize, Serialize};

pub mod canonical;
pub mod cycle_finder;
pub mod geometry;
pub mod graph_builder;
pub mod nesting;
pub mod region_detector;

pub use canonical::canonical_key;
pub use geometry::BoundingBox;
pub use region_detector::{find_closed_regions, find_closed_regions_with_config, find_cycles};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A node of the topology graph. Ids are expected to be unique within one graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: String,
    pub position: Point,
}

impl Vertex {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            position: Point::new(x, y),
        }
    }
}

/// Undirected connection between two vertices; `source`/`target` carry no direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Tunables for region extraction.
///
/// Both values are in the same units as vertex positions (source image pixels), so they
/// need adjusting when the base image resolution changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Distance from a polygon edge within which a point still counts as inside.
    #[serde(default = "default_edge_tolerance")]
    pub edge_tolerance: f64,
    /// Regions whose net area falls below this are dropped.
    #[serde(default = "default_min_region_area")]
    pub min_region_area: f64,
}

pub fn default_edge_tolerance() -> f64 {
    8.0
}

pub fn default_min_region_area() -> f64 {
    50.0
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            edge_tolerance: default_edge_tolerance(),
            min_region_area: default_min_region_area(),
        }
    }
}

/// A closed loop of the graph with its resolved geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub vertex_ids: Vec<String>,
    pub points: Vec<Point>,
    pub area: f64,
}

impl Ring {
    /// SVG path data for this ring: `M x y L x y ... Z`.
    pub fn to_svg_path(&self) -> String {
        let mut path = String::new();
        for (i, p) in self.points.iter().enumerate() {
            if i > 0 {
                path.push(' ');
            }
            let cmd = if i == 0 { 'M' } else { 'L' };
            path.push_str(&format!("{} {} {}", cmd, p.x, p.y));
        }
        if !self.points.is_empty() {
            path.push_str(" Z");
        }
        path
    }
}

/// A solid enclosed area: a boundary ring minus the hole rings directly nested in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub boundary: Ring,
    pub holes: Vec<Ring>,
    pub net_area: f64,
}

impl Region {
    /// Boundary followed by every hole as one path, meant to be filled with
    /// `fill-rule="evenodd"`.
    pub fn to_svg_path(&self) -> String {
        std::iter::once(&self.boundary)
            .chain(self.holes.iter())
            .map(Ring::to_svg_path)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.boundary.points)
    }
}
