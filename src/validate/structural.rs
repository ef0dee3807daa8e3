//! Dag-level structural rules (V001–V005), applied recursively to nested dags.

use crate::dag::{Dag, DagGraph, Nesting};
use crate::error::ExportError;

/// Run all structural rules on `dag` and every dag nested in it.
pub fn validate_structural(dag: &Dag) -> Vec<ExportError> {
    let mut errors = Vec::new();

    if v005_not_empty(dag, &mut errors) {
        let graph = DagGraph::build(dag);
        v001_single_start_node(dag, &mut errors);
        v002_single_end_node(dag, &mut errors);
        v003_no_cycles(dag, &graph, &mut errors);
        v004_conditions_have_branches(dag, &mut errors);
        validate_nested(dag, &mut errors);
    }

    errors
}

fn v005_not_empty(dag: &Dag, errors: &mut Vec<ExportError>) -> bool {
    if dag.is_empty() {
        errors.push(ExportError::validate(
            "V005",
            format!("Dag '{}' has no nodes", dag.id()),
            None,
        ));
        return false;
    }
    true
}

fn v001_single_start_node(dag: &Dag, errors: &mut Vec<ExportError>) {
    let starts: Vec<&str> = dag
        .nodes()
        .values()
        .filter(|n| n.in_degree() == 0)
        .map(|n| n.id())
        .collect();
    match starts.len() {
        1 => {}
        0 => errors.push(ExportError::validate(
            "V001",
            format!("Dag '{}' has no start node", dag.id()),
            None,
        )),
        _ => errors.push(ExportError::validate(
            "V001",
            format!(
                "Dag '{}' has multiple start nodes: {}",
                dag.id(),
                starts.join(", ")
            ),
            None,
        )),
    }
}

fn v002_single_end_node(dag: &Dag, errors: &mut Vec<ExportError>) {
    let ends: Vec<&str> = dag
        .nodes()
        .values()
        .filter(|n| n.out_degree() == 0)
        .map(|n| n.id())
        .collect();
    if ends.len() > 1 {
        errors.push(ExportError::validate(
            "V002",
            format!("Dag '{}' has multiple end nodes: {}", dag.id(), ends.join(", ")),
            None,
        ));
    }
}

fn v003_no_cycles(dag: &Dag, graph: &DagGraph, errors: &mut Vec<ExportError>) {
    if let Some(node_id) = graph.cycle_node() {
        errors.push(ExportError::validate(
            "V003",
            format!("Dag '{}' contains a cycle at node '{}'", dag.id(), node_id),
            Some(node_id.to_string()),
        ));
    }
}

fn v004_conditions_have_branches(dag: &Dag, errors: &mut Vec<ExportError>) {
    for node in dag.nodes().values() {
        if let Nesting::Conditional(condition) = node.nesting() {
            if condition.branches.is_empty() {
                errors.push(ExportError::validate(
                    "V004",
                    format!("Conditional node '{}' has no branches", node.id()),
                    Some(node.id().to_string()),
                ));
            }
        }
    }
}

/// Nested errors keep their own message; the node that nests the dag is
/// recorded when the error has no node of its own.
fn validate_nested(dag: &Dag, errors: &mut Vec<ExportError>) {
    for node in dag.nodes().values() {
        for (_, nested) in node.nested_dags() {
            for mut error in validate_structural(nested) {
                if error.node_id.is_none() {
                    error.node_id = Some(node.id().to_string());
                }
                errors.push(error);
            }
        }
    }
}
