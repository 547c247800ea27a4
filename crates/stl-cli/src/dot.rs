//! Renders the combined-state graph and a live progress overlay to a
//! Graphviz `.dot` file (§6 `-g`), rewritten after every transition so a
//! `watch dot -Tpng` loop shows the run advancing.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use stl_ast::Name;
use stl_executor::Visualizer;
use stl_graph::StlGraph;
use stl_model::ResolvedModule;

pub struct DotWriter<'a> {
    module: &'a ResolvedModule,
    graph: &'a StlGraph,
    path: PathBuf,
    passed: HashSet<Name>,
    failed: HashSet<Name>,
}

impl<'a> DotWriter<'a> {
    pub fn new(module: &'a ResolvedModule, graph: &'a StlGraph, path: PathBuf) -> Self {
        DotWriter { module, graph, path, passed: HashSet::new(), failed: HashSet::new() }
    }

    fn write(&self) {
        let mut out = String::from("digraph stl {\n");
        for idx in self.graph.graph.node_indices() {
            let vertex = &self.graph.graph[idx];
            let shape = if idx == self.graph.initial { "doublecircle" } else { "circle" };
            out.push_str(&format!("  n{} [label=\"{}\", shape={shape}];\n", idx.index(), vertex.canonical_key()));
        }
        for edge in self.graph.graph.edge_indices() {
            let (from, to) = self.graph.graph.edge_endpoints(edge).expect("edge index from this graph");
            let data = &self.graph.graph[edge];
            let name = &self.module.transitions[data.transition].name;
            let color = if self.failed.contains(name) {
                "red"
            } else if self.passed.contains(name) {
                "green"
            } else {
                "black"
            };
            out.push_str(&format!("  n{} -> n{} [label=\"{name}\", color={color}];\n", from.index(), to.index()));
        }
        out.push_str("}\n");
        if let Err(err) = fs::write(&self.path, out) {
            tracing::warn!(path = %self.path.display(), %err, "failed to write graph visualization");
        }
    }
}

impl<'a> Visualizer for DotWriter<'a> {
    fn on_start(&mut self, _transition: &Name) {
        self.write();
    }

    fn on_pass(&mut self, transition: &Name) {
        self.passed.insert(transition.clone());
        self.write();
    }

    fn on_fail(&mut self, transition: &Name) {
        self.failed.insert(transition.clone());
        self.write();
    }
}
