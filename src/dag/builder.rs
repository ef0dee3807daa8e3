//! Assembles a `Dag` from nodes and edges and derives its read-only data.

use std::collections::{BTreeMap, HashSet};

use super::{Dag, Forwarder, Node};
use crate::error::ExportError;

/// What an edge carries besides execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeKind {
    Data(Forwarder),
    ExecutionOnly,
}

#[derive(Debug, Clone)]
struct PendingEdge {
    from: String,
    to: String,
    kind: EdgeKind,
}

#[derive(Debug, Clone)]
pub struct DagBuilder {
    id: String,
    nodes: Vec<Node>,
    edges: Vec<PendingEdge>,
}

impl DagBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        DagBuilder {
            id: id.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Add a node. Its index is its position in insertion order, from 1.
    pub fn node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add an edge that forwards the parent's result unchanged.
    pub fn edge(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.edge_with(from, to, EdgeKind::Data(Forwarder::Default))
    }

    /// Add an edge that only orders execution.
    pub fn exec_edge(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.edge_with(from, to, EdgeKind::ExecutionOnly)
    }

    pub fn edge_with(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        kind: EdgeKind,
    ) -> Self {
        self.edges.push(PendingEdge {
            from: from.into(),
            to: to.into(),
            kind,
        });
        self
    }

    /// Build the dag. Returns every construction error found (B004, B005,
    /// B007) rather than stopping at the first.
    pub fn build(self) -> Result<Dag, Vec<ExportError>> {
        let mut errors = Vec::new();
        let mut nodes: BTreeMap<String, Node> = BTreeMap::new();
        let mut has_branch = false;

        for (position, mut node) in self.nodes.into_iter().enumerate() {
            if nodes.contains_key(&node.id) {
                errors.push(ExportError::build(
                    "B004",
                    format!("Duplicate node id '{}' in dag '{}'", node.id, self.id),
                    Some(node.id.clone()),
                ));
                continue;
            }
            node.index = position + 1;
            has_branch |= node.is_branching();
            nodes.insert(node.id.clone(), node);
        }

        let mut seen = HashSet::new();
        let mut has_edge = false;
        let mut execution_only = false;

        for edge in self.edges {
            if !nodes.contains_key(&edge.from) || !nodes.contains_key(&edge.to) {
                let missing = if nodes.contains_key(&edge.from) {
                    &edge.to
                } else {
                    &edge.from
                };
                errors.push(ExportError::build(
                    "B005",
                    format!(
                        "Edge '{}' -> '{}' in dag '{}' references unknown node '{}'",
                        edge.from, edge.to, self.id, missing
                    ),
                    Some(edge.from.clone()),
                ));
                continue;
            }
            if !seen.insert((edge.from.clone(), edge.to.clone())) {
                errors.push(ExportError::build(
                    "B007",
                    format!(
                        "Duplicate edge from '{}' to '{}' in dag '{}'",
                        edge.from, edge.to, self.id
                    ),
                    Some(edge.from.clone()),
                ));
                continue;
            }

            has_edge = true;
            if let Some(source) = nodes.get_mut(&edge.from) {
                source.children.push(edge.to.clone());
                source.out_degree += 1;
                match edge.kind {
                    EdgeKind::Data(forwarder) => {
                        source.forwarder.insert(edge.to.clone(), forwarder);
                    }
                    EdgeKind::ExecutionOnly => execution_only = true,
                }
            }
            if let Some(target) = nodes.get_mut(&edge.to) {
                target.in_degree += 1;
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let mut dag = Dag {
            id: self.id,
            nodes,
            has_branch,
            has_edge,
            execution_only,
        };
        dag.assign_unique_ids("");
        Ok(dag)
    }
}
