//! Degree-imbalance node lists (§4.G step 1): `L` holds one copy of a node
//! for each unit by which its in-degree exceeds its out-degree (it needs an
//! extra outgoing path to balance); `R` symmetrically holds excess-outgoing
//! copies, each needing an extra incoming path.

use petgraph::graph::NodeIndex;
use petgraph::Direction;
use stl_graph::Graph;

pub fn imbalanced_nodes(graph: &Graph) -> (Vec<NodeIndex>, Vec<NodeIndex>) {
    let mut l = Vec::new();
    let mut r = Vec::new();
    for node in graph.node_indices() {
        let in_degree = graph.edges_directed(node, Direction::Incoming).count() as i64;
        let out_degree = graph.edges_directed(node, Direction::Outgoing).count() as i64;
        let imbalance = in_degree - out_degree;
        if imbalance > 0 {
            l.extend(std::iter::repeat(node).take(imbalance as usize));
        } else if imbalance < 0 {
            r.extend(std::iter::repeat(node).take((-imbalance) as usize));
        }
    }
    (l, r)
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
    fn k2_with_extra_edge_has_one_imbalanced_pair() {
        let mut graph = Graph::new();
        let a = graph.add_node(vertex("kA"));
        let b = graph.add_node(vertex("kB"));
        graph.add_edge(a, b, EdgeData { transition: 0, error_vertex: a, weight: 1.0 });
        graph.add_edge(a, b, EdgeData { transition: 1, error_vertex: a, weight: 1.0 });
        graph.add_edge(b, a, EdgeData { transition: 2, error_vertex: b, weight: 1.0 });
        let (l, r) = imbalanced_nodes(&graph);
        assert_eq!(l, vec![b]);
        assert_eq!(r, vec![a]);
    }
}
