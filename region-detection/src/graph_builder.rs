use crate::{Edge, Vertex};
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashMap;
use tracing::debug;

// Walls are drawn between vertices without direction, so the graph is undirected
pub type TopologyGraph<'a> = UnGraph<&'a Vertex, ()>;

/// Undirected adjacency built from a vertex/edge list, plus the id lookup used to build it
pub struct Adjacency<'a> {
    pub graph: TopologyGraph<'a>,
    pub index_of: HashMap<&'a str, NodeIndex>,
}

impl<'a> Adjacency<'a> {
    pub fn vertex(&self, node: NodeIndex) -> &'a Vertex {
        self.graph[node]
    }

    pub fn degree(&self, node: NodeIndex) -> usize {
        self.graph.neighbors(node).count()
    }
}

/// Build the adjacency graph for a topology.
///
/// Nodes are added in vertex order so node indices follow the caller's ordering.
/// Self-loops and edges naming an unknown vertex are dropped, and repeated edges between
/// the same pair collapse into one. Nothing here fails: a user-drawn graph can be
/// inconsistent for a moment while it is being edited.
pub fn build_adjacency<'a>(vertices: &'a [Vertex], edges: &[Edge]) -> Adjacency<'a> {
    let mut graph = UnGraph::with_capacity(vertices.len(), edges.len());
    let mut index_of: HashMap<&'a str, NodeIndex> = HashMap::with_capacity(vertices.len());

    for vertex in vertices {
        if index_of.contains_key(vertex.id.as_str()) {
            debug!("Ignoring duplicate vertex id {}", vertex.id);
            continue;
        }
        let node = graph.add_node(vertex);
        index_of.insert(vertex.id.as_str(), node);
    }

    for edge in edges {
        if edge.source == edge.target {
            debug!("Ignoring self-loop edge {}", edge.id);
            continue;
        }

        let (Some(&a), Some(&b)) = (
            index_of.get(edge.source.as_str()),
            index_of.get(edge.target.as_str()),
        ) else {
            debug!(
                "Ignoring edge {} with unknown endpoint ({} -> {})",
                edge.id, edge.source, edge.target
            );
            continue;
        };

        graph.update_edge(a, b, ());
    }

    Adjacency { graph, index_of }
}
