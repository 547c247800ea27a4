//! Strong-connectivity check required before traversal planning begins
//! (§3 key invariant, §8 model errors): every vertex must be reachable from
//! the initial vertex and able to reach it.

use crate::builder::{Graph, StlGraph};
use crate::error::GraphError;
use petgraph::algo::kosaraju_scc;
use petgraph::graph::NodeIndex;

pub fn assert_strongly_connected(graph: &StlGraph) -> Result<(), GraphError> {
    let components = kosaraju_scc(&graph.graph);
    let initial_component = components.iter().find(|c| c.contains(&graph.initial)).expect("initial vertex is always in some component");

    if initial_component.len() == graph.graph.node_count() {
        return Ok(());
    }

    let unreached = graph.graph.node_count() - initial_component.len();
    Err(GraphError::NotStronglyConnected(unreached))
}

/// All-pairs shortest-path distances via Floyd–Warshall over unit-weight
/// edges (§4.G step 2), indexed by `NodeIndex::index()`.
pub fn floyd_warshall(graph: &Graph) -> Vec<Vec<f64>> {
    let n = graph.node_count();
    let mut dist = vec![vec![f64::INFINITY; n]; n];
    for i in 0..n {
        dist[i][i] = 0.0;
    }
    for edge in graph.edge_indices() {
        let (a, b) = graph.edge_endpoints(edge).expect("edge index came from this graph");
        let weight = graph[edge].weight;
        let (a, b) = (a.index(), b.index());
        if weight < dist[a][b] {
            dist[a][b] = weight;
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
                }
            }
        }
    }
    dist
}

pub fn node_index(i: usize) -> NodeIndex {
    NodeIndex::new(i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::Vertex;
    use stl_model::{StateResolved, StateValue};

    fn vertex(symbol: &str) -> Vertex {
        Vertex::new(vec![StateValue::new(StateResolved::new("s".into(), vec![]), symbol.into())])
    }

    #[test]
    fn disconnected_graph_is_rejected() {
        let mut graph = Graph::new();
        let a = graph.add_node(vertex("kA"));
        let _b = graph.add_node(vertex("kB"));
        let stl_graph = StlGraph { graph, initial: a, index: Default::default() };
        assert!(assert_strongly_connected(&stl_graph).is_err());
    }

    #[test]
    fn floyd_warshall_finds_two_hop_path() {
        let mut graph = Graph::new();
        let a = graph.add_node(vertex("kA"));
        let b = graph.add_node(vertex("kB"));
        let c = graph.add_node(vertex("kC"));
        graph.add_edge(a, b, crate::builder::EdgeData { transition: 0, error_vertex: a, weight: 1.0 });
        graph.add_edge(b, c, crate::builder::EdgeData { transition: 0, error_vertex: b, weight: 1.0 });
        let dist = floyd_warshall(&graph);
        assert_eq!(dist[a.index()][c.index()], 2.0);
    }
}
