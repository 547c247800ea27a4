//! Directed Chinese-Postman traversal planning (§4.G): find the
//! minimum-length closed walk from the initial vertex that covers every
//! edge of a strongly-connected combined-state graph at least once.

mod error;
mod euler;
mod hungarian;
mod imbalance;
mod shortest_path;

pub use error::PlannerError;

use euler::VirtualEdge;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use stl_graph::{assert_strongly_connected, StlGraph};

/// One step of the planned circuit: the transition to fire and the vertex
/// to reroute to if it fails (§4.H).
#[derive(Debug, Clone, Copy)]
pub struct PlannedEdge {
    pub index: EdgeIndex,
    pub from: NodeIndex,
    pub to: NodeIndex,
    pub transition: usize,
    pub error_vertex: NodeIndex,
}

pub fn plan_traversal(graph: &StlGraph) -> Result<Vec<PlannedEdge>, PlannerError> {
    assert_strongly_connected(graph).map_err(|_| PlannerError::NotStronglyConnected(unreached_count(graph)))?;

    let (l, r) = imbalance::imbalanced_nodes(&graph.graph);
    let shortest_paths = shortest_path::compute(&graph.graph);

    let virtual_edges = if l.is_empty() {
        Vec::new()
    } else {
        let cost: Vec<Vec<f64>> = l.iter().map(|&li| r.iter().map(|&ri| shortest_paths.distance(li, ri)).collect()).collect();
        let assignment = hungarian::min_cost_assignment(&cost);
        l.iter().zip(assignment).map(|(&from, col)| VirtualEdge { from, to: r[col] }).collect()
    };

    let circuit = euler::eulerian_circuit(&graph.graph, &virtual_edges, graph.initial);
    let expanded = euler::expand(&graph.graph, &circuit, &shortest_paths);

    if expanded.len() < graph.graph.edge_count() {
        return Err(PlannerError::NotEulerian);
    }

    Ok(to_planned_edges(graph, &expanded))
}

fn to_planned_edges(graph: &StlGraph, edges: &[EdgeIndex]) -> Vec<PlannedEdge> {
    edges
        .iter()
        .map(|&idx| {
            let (from, to) = graph.graph.edge_endpoints(idx).expect("edge index came from this graph");
            let data = &graph.graph[idx];
            PlannedEdge { index: idx, from, to, transition: data.transition, error_vertex: data.error_vertex }
        })
        .collect()
}

/// Shortest edge sequence from `from` to `to` over `graph` as it stands right
/// now (§4.H recovery: edges already marked `+∞` are skipped). `None` if no
/// finite path exists — the caller treats that as exhausted recovery.
pub fn reroute(graph: &stl_graph::Graph, from: NodeIndex, to: NodeIndex) -> Option<Vec<EdgeIndex>> {
    let shortest_paths = shortest_path::compute(graph);
    let vertices = shortest_paths.path_vertices(from, to)?;
    Some(vertices.windows(2).map(|pair| shortest_path::best_parallel_edge(graph, pair[0], pair[1])).collect())
}

fn unreached_count(graph: &StlGraph) -> usize {
    let reachable = petgraph::algo::dijkstra(&graph.graph, graph.initial, None, |e| e.weight().weight);
    graph.graph.node_count() - reachable.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stl_graph::{build_graph, EdgeData};
    use stl_model::{EventCallResolved, StateResolved, StateValue, TransitionResolved};

    fn sv(name: &str, symbol: &str) -> StateValue {
        StateValue::new(StateResolved::new(name.into(), vec![]), symbol.into())
    }

    #[test]
    fn k2_plans_four_step_circuit() {
        let mut module = stl_model::ResolvedModule::default();
        module.states.push(stl_ast::StateDef { name: "sConn".into(), params: vec![], values: vec!["kA".into(), "kB".into()] });
        module.transitions.push(TransitionResolved {
            name: "tAB1".into(),
            locals: vec![],
            pre_states: vec![vec![sv("sConn", "kA")]],
            events: Vec::<EventCallResolved>::new(),
            post_states: vec![sv("sConn", "kB")],
            error_states: vec![],
        });
        module.transitions.push(TransitionResolved {
            name: "tAB2".into(),
            locals: vec![],
            pre_states: vec![vec![sv("sConn", "kA")]],
            events: vec![],
            post_states: vec![sv("sConn", "kB")],
            error_states: vec![],
        });
        module.transitions.push(TransitionResolved {
            name: "tBA".into(),
            locals: vec![],
            pre_states: vec![vec![sv("sConn", "kB")]],
            events: vec![],
            post_states: vec![sv("sConn", "kA")],
            error_states: vec![],
        });

        let graph = build_graph(&module).unwrap();
        let plan = plan_traversal(&graph).unwrap();
        assert_eq!(plan.len(), 4);

        let mut covered = std::collections::HashSet::new();
        for step in &plan {
            covered.insert(step.transition);
        }
        assert_eq!(covered.len(), 3);
    }

    #[test]
    fn disconnected_graph_is_rejected() {
        let mut graph = stl_graph::Graph::new();
        let a = graph.add_node(stl_graph::Vertex::new(vec![sv("s", "kA")]));
        let _b = graph.add_node(stl_graph::Vertex::new(vec![sv("s", "kB")]));
        let _ = EdgeData { transition: 0, error_vertex: a, weight: 1.0 };
        let stl_graph = StlGraph { graph, initial: a, index: Default::default() };
        let err = plan_traversal(&stl_graph).unwrap_err();
        assert!(matches!(err, PlannerError::NotStronglyConnected(_)));
    }

    #[test]
    fn reroute_skips_infinite_weight_edges() {
        let mut graph = stl_graph::Graph::new();
        let a = graph.add_node(stl_graph::Vertex::new(vec![sv("s", "kA")]));
        let b = graph.add_node(stl_graph::Vertex::new(vec![sv("s", "kB")]));
        let c = graph.add_node(stl_graph::Vertex::new(vec![sv("s", "kC")]));
        let direct = graph.add_edge(a, b, EdgeData { transition: 0, error_vertex: a, weight: 1.0 });
        graph.add_edge(a, c, EdgeData { transition: 1, error_vertex: a, weight: 1.0 });
        graph.add_edge(c, b, EdgeData { transition: 2, error_vertex: a, weight: 1.0 });

        let direct_path = reroute(&graph, a, b).unwrap();
        assert_eq!(direct_path, vec![direct]);

        graph[direct].weight = f64::INFINITY;
        let detour = reroute(&graph, a, b).unwrap();
        assert_eq!(detour.len(), 2);
    }
}
