use std::collections::BTreeMap;

use dag_exporter::dag::*;
use dag_exporter::error::ExportError;

// =============================================================================
// Dag builders
// =============================================================================

/// A dag with a single node and no edges.
pub fn single_node_dag(dag_id: &str, node_id: &str) -> Dag {
    Dag::builder(dag_id)
        .node(Node::new(node_id).with_operation(Operation::function(node_id)))
        .build()
        .expect("single node dag should build")
}

/// A chain `ids[0] -> ids[1] -> ...` of data edges.
pub fn linear_dag(dag_id: &str, ids: &[&str]) -> Dag {
    let mut builder = Dag::builder(dag_id);
    for id in ids {
        builder = builder.node(Node::new(*id));
    }
    for pair in ids.windows(2) {
        builder = builder.edge(pair[0], pair[1]);
    }
    builder.build().expect("linear dag should build")
}

/// A conditional node with one single-node branch dag per label.
pub fn conditional_node(id: &str, labels: &[&str]) -> Node {
    let branches: BTreeMap<String, Dag> = labels
        .iter()
        .map(|label| {
            (
                label.to_string(),
                single_node_dag(&format!("{}-{}", id, label), &format!("{}-step", label)),
            )
        })
        .collect();
    Node::new(id).with_condition(Hook::new("select"), branches)
}

/// Wrap one node in a dag of its own.
pub fn dag_of(node: Node) -> Dag {
    Dag::builder("main")
        .node(node)
        .build()
        .expect("dag should build")
}

// =============================================================================
// Validators
// =============================================================================

pub fn failing_validator(message: &'static str) -> impl Fn(&Dag) -> Vec<ExportError> {
    move |_dag: &Dag| vec![ExportError::validate("V999", message, None)]
}

pub fn accepting_validator() -> impl Fn(&Dag) -> Vec<ExportError> {
    |_dag: &Dag| Vec::new()
}
