//! Eulerian circuit construction over the augmented graph (§4.G step 4-5):
//! iterative Hierholzer, with deterministic tie-breaks (lower target vertex
//! id, then lower edge index) so the same input always plans the same
//! circuit.

use crate::shortest_path::ShortestPaths;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use stl_graph::Graph;

#[derive(Debug, Clone, Copy)]
pub enum CircuitEdge {
    Real(EdgeIndex),
    Virtual { from: NodeIndex, to: NodeIndex },
}

pub struct VirtualEdge {
    pub from: NodeIndex,
    pub to: NodeIndex,
}

/// Walks an Eulerian circuit of `graph` plus `virtual_edges`, starting at
/// `start`. The graph (real + virtual) must already be balanced — every
/// vertex's in-degree equals its out-degree — and weakly connected over the
/// edges actually present.
pub fn eulerian_circuit(graph: &Graph, virtual_edges: &[VirtualEdge], start: NodeIndex) -> Vec<(NodeIndex, CircuitEdge)> {
    let mut adjacency: FxHashMap<NodeIndex, VecDeque<(NodeIndex, CircuitEdge)>> = FxHashMap::default();

    for node in graph.node_indices() {
        let mut outgoing: Vec<(NodeIndex, CircuitEdge)> = graph
            .edges(node)
            .map(|e| (e.target(), CircuitEdge::Real(e.id())))
            .collect();
        for v in virtual_edges {
            if v.from == node {
                outgoing.push((v.to, CircuitEdge::Virtual { from: v.from, to: v.to }));
            }
        }
        outgoing.sort_by_key(|(target, edge)| (target.index(), edge_sort_key(edge)));
        adjacency.insert(node, outgoing.into());
    }

    let mut stack = vec![(start, None)];
    let mut circuit: Vec<(NodeIndex, CircuitEdge)> = Vec::new();

    while let Some(&(vertex, incoming)) = stack.last() {
        let has_next = adjacency.get(&vertex).map(|q| !q.is_empty()).unwrap_or(false);
        if has_next {
            let (target, edge) = adjacency.get_mut(&vertex).unwrap().pop_front().unwrap();
            stack.push((target, Some((vertex, edge))));
        } else {
            stack.pop();
            if let Some((from, edge)) = incoming {
                circuit.push((from, edge));
            }
        }
    }

    circuit.reverse();
    circuit
}

fn edge_sort_key(edge: &CircuitEdge) -> (u8, usize) {
    match edge {
        CircuitEdge::Real(idx) => (0, idx.index()),
        CircuitEdge::Virtual { .. } => (1, 0),
    }
}

/// Expands the circuit's virtual edges into the concrete real-edge sequence
/// of their shortest path, choosing the minimum-weight (then lowest-index)
/// parallel edge at every hop.
pub fn expand(graph: &Graph, circuit: &[(NodeIndex, CircuitEdge)], shortest_paths: &ShortestPaths) -> Vec<EdgeIndex> {
    let mut expanded = Vec::new();
    for (_, edge) in circuit {
        match edge {
            CircuitEdge::Real(idx) => expanded.push(*idx),
            CircuitEdge::Virtual { from, to } => {
                let vertices = shortest_paths
                    .path_vertices(*from, *to)
                    .expect("virtual edges are only created between vertices known to be connected");
                for pair in vertices.windows(2) {
                    expanded.push(crate::shortest_path::best_parallel_edge(graph, pair[0], pair[1]));
                }
            }
        }
    }
    expanded
}
