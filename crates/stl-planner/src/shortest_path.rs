//! All-pairs shortest paths with path reconstruction (§4.G step 2 and the
//! virtual-edge expansion of step 5): Floyd–Warshall over unit-weight edges,
//! carrying a next-hop matrix so a concrete vertex sequence — and from it a
//! concrete edge sequence, picking the lowest-weight, lowest-index parallel
//! edge at each hop — can be recovered for any matched pair.

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use stl_graph::Graph;

pub struct ShortestPaths {
    dist: Vec<Vec<f64>>,
    next: Vec<Vec<Option<usize>>>,
}

impl ShortestPaths {
    pub fn distance(&self, from: NodeIndex, to: NodeIndex) -> f64 {
        self.dist[from.index()][to.index()]
    }

    /// The vertex sequence of a shortest path from `from` to `to`, inclusive
    /// of both endpoints. Empty if `from == to`; `None` if unreachable.
    pub fn path_vertices(&self, from: NodeIndex, to: NodeIndex) -> Option<Vec<NodeIndex>> {
        if from == to {
            return Some(vec![from]);
        }
        if self.dist[from.index()][to.index()].is_infinite() {
            return None;
        }
        let mut path = vec![from];
        let mut current = from.index();
        while current != to.index() {
            current = self.next[current][to.index()]?;
            path.push(NodeIndex::new(current));
        }
        Some(path)
    }
}

pub fn compute(graph: &Graph) -> ShortestPaths {
    let n = graph.node_count();
    let mut dist = vec![vec![f64::INFINITY; n]; n];
    let mut next: Vec<Vec<Option<usize>>> = vec![vec![None; n]; n];
    for i in 0..n {
        dist[i][i] = 0.0;
    }
    for edge in graph.edge_indices() {
        let (a, b) = graph.edge_endpoints(edge).expect("edge index came from this graph");
        let (a, b) = (a.index(), b.index());
        let weight = graph[edge].weight;
        if weight < dist[a][b] {
            dist[a][b] = weight;
            next[a][b] = Some(b);
        }
    }
    for k in 0..n {
        for i in 0..n {
            if dist[i][k].is_infinite() {
                continue;
            }
            for j in 0..n {
                let through = dist[i][k] + dist[k][j];
                if through < dist[i][j] {
                    dist[i][j] = through;
                    next[i][j] = next[i][k];
                }
            }
        }
    }
    ShortestPaths { dist, next }
}

/// Among parallel edges `u -> v`, the one with lowest weight, ties broken by
/// lowest edge index (§4.G tie-break rule).
pub fn best_parallel_edge(graph: &Graph, u: NodeIndex, v: NodeIndex) -> EdgeIndex {
    graph
        .edges_connecting(u, v)
        .min_by(|a, b| {
            a.weight().weight.partial_cmp(&b.weight().weight).unwrap_or(std::cmp::Ordering::Equal).then(a.id().index().cmp(&b.id().index()))
        })
        .expect("caller only asks for an edge known to exist on the shortest path")
        .id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stl_graph::{EdgeData, Vertex};
    use stl_model::{StateResolved, StateValue};

    fn vertex(symbol: &str) -> Vertex {
        Vertex::new(vec![StateValue::new(StateResolved::new("s".into(), vec![]), symbol.into())])
    }

    #[test]
    fn reconstructs_two_hop_path() {
        let mut graph = Graph::new();
        let a = graph.add_node(vertex("kA"));
        let b = graph.add_node(vertex("kB"));
        let c = graph.add_node(vertex("kC"));
        graph.add_edge(a, b, EdgeData { transition: 0, error_vertex: a, weight: 1.0 });
        graph.add_edge(b, c, EdgeData { transition: 1, error_vertex: b, weight: 1.0 });
        let sp = compute(&graph);
        assert_eq!(sp.distance(a, c), 2.0);
        assert_eq!(sp.path_vertices(a, c), Some(vec![a, b, c]));
    }

    #[test]
    fn picks_lowest_index_among_equal_weight_parallels() {
        let mut graph = Graph::new();
        let a = graph.add_node(vertex("kA"));
        let b = graph.add_node(vertex("kB"));
        let e1 = graph.add_edge(a, b, EdgeData { transition: 0, error_vertex: a, weight: 1.0 });
        let _e2 = graph.add_edge(a, b, EdgeData { transition: 1, error_vertex: a, weight: 1.0 });
        assert_eq!(best_parallel_edge(&graph, a, b), e1);
    }
}
