//! Builds the combined-state transition multidigraph from a resolved
//! module (§4.F): BFS from the initial vertex, adding one edge per matching
//! transition at each newly discovered vertex.

use crate::error::GraphError;
use crate::vertex::{extend, Vertex};
use petgraph::graph::NodeIndex;
use petgraph::Directed;
use rustc_hash::FxHashMap;
use stl_ast::Name;
use stl_model::{ResolvedModule, StateResolved, StateValue};

#[derive(Debug, Clone)]
pub struct EdgeData {
    pub transition: usize,
    pub error_vertex: NodeIndex,
    pub weight: f64,
}

pub type Graph = petgraph::Graph<Vertex, EdgeData, Directed>;

pub struct StlGraph {
    pub graph: Graph,
    pub initial: NodeIndex,
    pub(crate) index: FxHashMap<String, NodeIndex>,
}

impl StlGraph {
    pub fn vertex_index(&self, key: &str) -> Option<NodeIndex> {
        self.index.get(key).copied()
    }
}

pub fn build_graph(module: &ResolvedModule) -> Result<StlGraph, GraphError> {
    let initial_values = initial_vertex_values(module)?;
    let mut graph = Graph::new();
    let mut index: FxHashMap<String, NodeIndex> = FxHashMap::default();

    let initial_vertex = Vertex::new(initial_values);
    let initial = intern(&mut graph, &mut index, initial_vertex);

    let mut worklist = vec![initial];
    while let Some(v_idx) = worklist.pop() {
        let vertex_values = graph[v_idx].values.clone();
        for (t_idx, t) in module.transitions.iter().enumerate() {
            if !t.matches(&vertex_values) {
                continue;
            }
            let target_vertex = extend(&t.post_states, &vertex_values);
            let target = intern_tracked(&mut graph, &mut index, target_vertex, &mut worklist);

            let error_vertex = if t.error_states.is_empty() {
                v_idx
            } else {
                let error = extend(&t.error_states, &vertex_values);
                intern_tracked(&mut graph, &mut index, error, &mut worklist)
            };

            graph.add_edge(v_idx, target, EdgeData { transition: t_idx, error_vertex, weight: 1.0 });
        }
    }

    Ok(StlGraph { graph, initial, index })
}

fn intern(graph: &mut Graph, index: &mut FxHashMap<String, NodeIndex>, vertex: Vertex) -> NodeIndex {
    let key = vertex.canonical_key();
    *index.entry(key).or_insert_with(|| graph.add_node(vertex))
}

fn intern_tracked(graph: &mut Graph, index: &mut FxHashMap<String, NodeIndex>, vertex: Vertex, worklist: &mut Vec<NodeIndex>) -> NodeIndex {
    let key = vertex.canonical_key();
    if let Some(&existing) = index.get(&key) {
        return existing;
    }
    let idx = graph.add_node(vertex);
    index.insert(key, idx);
    worklist.push(idx);
    idx
}

/// One `StateValue` per state referenced anywhere in the module's resolved
/// transitions, at its declared initial symbol; parameters are taken from
/// the first occurrence referencing that state, since the initial vertex
/// does not otherwise have a basis for choosing them.
fn initial_vertex_values(module: &ResolvedModule) -> Result<Vec<StateValue>, GraphError> {
    let mut representative: FxHashMap<Name, StateResolved> = FxHashMap::default();

    let mut note = |sv: &StateValue| {
        representative.entry(sv.state.name.clone()).or_insert_with(|| sv.state.clone());
    };

    for t in &module.transitions {
        for group in &t.pre_states {
            for sv in group {
                note(sv);
            }
        }
        for sv in &t.post_states {
            note(sv);
        }
        for sv in &t.error_states {
            note(sv);
        }
    }

    representative
        .into_iter()
        .map(|(name, state)| {
            let def = module.state_def(&name).ok_or_else(|| GraphError::UndeclaredState(name.clone()))?;
            Ok(StateValue::new(state, def.initial_value().clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stl_ast::StateDef;
    use stl_model::{EventCallResolved, StateValue, TransitionResolved};

    fn sv(name: &str, symbol: &str) -> StateValue {
        StateValue::new(StateResolved::new(name.into(), vec![]), symbol.into())
    }

    fn sample_module() -> ResolvedModule {
        let mut module = ResolvedModule::default();
        module.states.push(StateDef { name: "sConn".into(), params: vec![], values: vec!["kDisconnected".into(), "kConnected".into()] });
        module.transitions.push(TransitionResolved {
            name: "tConnect".into(),
            locals: vec![],
            pre_states: vec![vec![sv("sConn", "kDisconnected")]],
            events: Vec::<EventCallResolved>::new(),
            post_states: vec![sv("sConn", "kConnected")],
            error_states: vec![],
        });
        module.transitions.push(TransitionResolved {
            name: "tDisconnect".into(),
            locals: vec![],
            pre_states: vec![vec![sv("sConn", "kConnected")]],
            events: vec![],
            post_states: vec![sv("sConn", "kDisconnected")],
            error_states: vec![],
        });
        module
    }

    #[test]
    fn builds_two_vertex_cycle() {
        let module = sample_module();
        let graph = build_graph(&module).unwrap();
        assert_eq!(graph.graph.node_count(), 2);
        assert_eq!(graph.graph.edge_count(), 2);
    }

    #[test]
    fn initial_vertex_uses_declared_initial_symbol() {
        let module = sample_module();
        let graph = build_graph(&module).unwrap();
        let initial = &graph.graph[graph.initial];
        assert_eq!(initial.get("sConn").unwrap().symbol.as_ref(), "kDisconnected");
    }
}
