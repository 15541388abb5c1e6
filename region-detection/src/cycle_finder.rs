use crate::canonical::canonical_key;
use crate::graph_builder::Adjacency;
use petgraph::graph::NodeIndex;
use std::collections::HashSet;
use tracing::{debug, trace};

/// One level of the DFS: the vertex, the vertex it was reached from and the position of
/// the next neighbor to look at.
struct Frame {
    node: NodeIndex,
    parent: Option<NodeIndex>,
    next: usize,
}

/// Back-edge cycle detection over one DFS spanning tree per connected component.
///
/// Every cycle closed by a back edge is recorded once, deduplicated by its canonical key
/// as soon as it is found. Graphs with several alternate cycles sharing chords can hide
/// some elementary cycles from a single spanning tree; those are not reported.
///
/// All traversal state lives in this struct and is dropped with it, so separate calls
/// never share anything.
pub struct CycleFinder<'g, 'a> {
    adjacency: &'g Adjacency<'a>,
    neighbors: Vec<Vec<NodeIndex>>,
    visited: Vec<bool>,
    on_stack: Vec<bool>,
    stack_index: Vec<usize>,
    path: Vec<NodeIndex>,
    seen_keys: HashSet<String>,
    cycles: Vec<Vec<NodeIndex>>,
}

impl<'g, 'a> CycleFinder<'g, 'a> {
    pub fn new(adjacency: &'g Adjacency<'a>) -> Self {
        let graph = &adjacency.graph;
        let n = graph.node_count();

        // Snapshot neighbor lists once so iteration order is fixed for the whole run
        let neighbors: Vec<Vec<NodeIndex>> = graph
            .node_indices()
            .map(|node| graph.neighbors(node).collect())
            .collect();

        Self {
            adjacency,
            neighbors,
            visited: vec![false; n],
            on_stack: vec![false; n],
            stack_index: vec![0; n],
            path: Vec::new(),
            seen_keys: HashSet::new(),
            cycles: Vec::new(),
        }
    }

    /// Run the traversal from every vertex in input order and return the unique cycles
    pub fn find(mut self) -> Vec<Vec<NodeIndex>> {
        for root in self.adjacency.graph.node_indices() {
            if self.visited[root.index()] || self.neighbors[root.index()].is_empty() {
                continue;
            }
            trace!("Starting DFS from {}", self.adjacency.vertex(root).id);
            self.traverse(root);
        }

        debug!("Found {} unique cycles", self.cycles.len());
        self.cycles
    }

    fn traverse(&mut self, root: NodeIndex) {
        let mut frames = vec![self.enter(root, None)];

        while let Some(frame) = frames.last_mut() {
            let node = frame.node;
            let Some(&neighbor) = self.neighbors[node.index()].get(frame.next) else {
                // All neighbors explored: backtrack, but the vertex stays visited
                frames.pop();
                self.path.pop();
                self.on_stack[node.index()] = false;
                continue;
            };
            frame.next += 1;

            if Some(neighbor) == frame.parent {
                continue;
            }

            if !self.visited[neighbor.index()] {
                let child = self.enter(neighbor, Some(node));
                frames.push(child);
            } else if self.on_stack[neighbor.index()] {
                self.record_cycle(self.stack_index[neighbor.index()]);
            }
        }
    }

    fn enter(&mut self, node: NodeIndex, parent: Option<NodeIndex>) -> Frame {
        self.visited[node.index()] = true;
        self.on_stack[node.index()] = true;
        self.stack_index[node.index()] = self.path.len();
        self.path.push(node);

        Frame {
            node,
            parent,
            next: 0,
        }
    }

    /// Register the cycle formed by the path from `start` to the top of the stack
    fn record_cycle(&mut self, start: usize) {
        let mut seen = HashSet::new();
        let cycle: Vec<NodeIndex> = self.path[start..]
            .iter()
            .copied()
            .filter(|node| seen.insert(*node))
            .collect();

        if cycle.len() < 3 {
            return;
        }

        let ids: Vec<&str> = cycle
            .iter()
            .map(|&node| self.adjacency.vertex(node).id.as_str())
            .collect();
        let key = canonical_key(&ids);

        if self.seen_keys.insert(key) {
            trace!("Found cycle {:?}", ids);
            self.cycles.push(cycle);
        }
    }
}

/// Find the unique cycles of an adjacency graph
pub fn find_cycles(adjacency: &Adjacency<'_>) -> Vec<Vec<NodeIndex>> {
    CycleFinder::new(adjacency).find()
}
