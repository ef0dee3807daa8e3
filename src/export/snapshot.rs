//! Recursive dag → snapshot conversion.

use crate::dag::{DYNAMIC_FORWARD_KEY, Dag, Nesting, Node, Operation};

use super::types::{DagSnapshot, NodeSnapshot, OperationSnapshot};

/// Callback operations are displayed by the tail of their URL.
const CALLBACK_NAME_LEN: usize = 8;

/// Snapshot a dag and everything nested in it. Never fails.
pub fn snapshot_dag(dag: &Dag) -> DagSnapshot {
    tracing::debug!(dag = dag.id(), nodes = dag.len(), "snapshotting dag");

    DagSnapshot {
        id: dag.id().to_string(),
        start_node: dag.start_node().map(str::to_string),
        end_node: dag.end_node().map(str::to_string),
        has_branch: dag.has_branch(),
        has_edge: dag.has_edge(),
        execution_only_dag: dag.is_execution_only(),
        nodes: dag
            .nodes()
            .iter()
            .map(|(id, node)| (id.clone(), snapshot_node(node)))
            .collect(),
        validity: None,
    }
}

pub fn snapshot_node(node: &Node) -> NodeSnapshot {
    let mut snapshot = NodeSnapshot {
        id: node.id().to_string(),
        index: node.index(),
        unique_id: node.unique_id().to_string(),
        is_dynamic: node.is_dynamic(),
        has_aggregator: node.aggregator().is_some(),
        has_sub_aggregator: node.sub_aggregator().is_some(),
        in_degree: node.in_degree(),
        out_degree: node.out_degree(),
        ..Default::default()
    };

    match node.nesting() {
        Nesting::None => {}
        Nesting::Conditional(condition) => {
            snapshot.is_condition = true;
            snapshot.dynamic_exec_only = node.is_execution_only(DYNAMIC_FORWARD_KEY);
            snapshot.conditional_dags = condition
                .branches
                .iter()
                .map(|(label, dag)| (label.clone(), snapshot_dag(dag)))
                .collect();
        }
        Nesting::ForEach(foreach) => {
            snapshot.is_foreach = true;
            snapshot.foreach_dag = Some(Box::new(snapshot_dag(&foreach.body)));
            snapshot.dynamic_exec_only = node.is_execution_only(DYNAMIC_FORWARD_KEY);
        }
        // The shape behind a dynamic node is only known at run time.
        Nesting::SubDag(dag) if !node.is_dynamic() => {
            snapshot.has_sub_dag = true;
            snapshot.sub_dag = Some(Box::new(snapshot_dag(dag)));
        }
        Nesting::SubDag(_) => {}
    }

    snapshot.operations = node.operations().iter().map(snapshot_operation).collect();

    for child in node.children() {
        snapshot.children.push(child.clone());
        snapshot
            .child_exec_only
            .insert(child.clone(), node.is_execution_only(child));
    }

    snapshot
}

/// Kind priority is modifier, then function, then callback; at most one
/// kind flag is set.
pub fn snapshot_operation(operation: &Operation) -> OperationSnapshot {
    let mut snapshot = OperationSnapshot {
        has_response_handler: operation.response_handler.is_some(),
        has_failure_handler: operation.failure_handler.is_some(),
        ..Default::default()
    };

    if operation.modifier.is_some() {
        snapshot.is_modifier = true;
    } else if let Some(function) = non_empty(&operation.function) {
        snapshot.is_function = true;
        snapshot.name = Some(function.to_string());
    } else if let Some(url) = non_empty(&operation.callback_url) {
        snapshot.is_callback = true;
        snapshot.name = Some(callback_name(url).to_string());
    }

    snapshot
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// The last `CALLBACK_NAME_LEN` characters of `url`, or all of it when
/// shorter.
fn callback_name(url: &str) -> &str {
    match url.char_indices().rev().nth(CALLBACK_NAME_LEN - 1) {
        Some((start, _)) => &url[start..],
        None => url,
    }
}
