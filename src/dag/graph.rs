//! petgraph-based directed graph view over one dag level.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::DiGraph;

use super::Dag;

pub struct DagGraph {
    graph: DiGraph<String, ()>,
}

impl DagGraph {
    /// Only the dag's own nodes are added; nested dags are separate graphs.
    pub fn build(dag: &Dag) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for id in dag.nodes().keys() {
            let idx = graph.add_node(id.clone());
            node_indices.insert(id.clone(), idx);
        }

        for node in dag.nodes().values() {
            let source = node_indices[node.id()];
            for child in node.children() {
                if let Some(&target) = node_indices.get(child) {
                    graph.add_edge(source, target, ());
                }
            }
        }

        DagGraph { graph }
    }

    /// A node on a cycle, if the graph has one.
    pub fn cycle_node(&self) -> Option<&str> {
        toposort(&self.graph, None)
            .err()
            .map(|cycle| self.graph[cycle.node_id()].as_str())
    }
}
