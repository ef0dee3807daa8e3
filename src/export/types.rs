//! Snapshot records produced by the exporter.
//!
//! These own all their data and never point back into the source dag. Field
//! names are encoded as stable kebab-case keys; empty optional fields are
//! left out of the encoded form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DagSnapshot {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_node: Option<String>,
    pub has_branch: bool,
    pub has_edge: bool,
    #[serde(rename = "exec-only-dag")]
    pub execution_only_dag: bool,
    pub nodes: BTreeMap<String, NodeSnapshot>,
    /// Only set on the root of an export.
    #[serde(flatten)]
    pub validity: Option<Validity>,
}

/// Outcome of validating the exported pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Validity {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub validation_error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NodeSnapshot {
    pub id: String,
    #[serde(rename = "node-index")]
    pub index: usize,
    /// Correlates the node with execution-time state.
    pub unique_id: String,

    pub is_dynamic: bool,
    pub is_condition: bool,
    pub is_foreach: bool,
    pub has_aggregator: bool,
    pub has_sub_aggregator: bool,
    #[serde(rename = "has-subdag")]
    pub has_sub_dag: bool,
    pub in_degree: usize,
    pub out_degree: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_dag: Option<Box<DagSnapshot>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreach_dag: Option<Box<DagSnapshot>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub conditional_dags: BTreeMap<String, DagSnapshot>,
    pub dynamic_exec_only: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<OperationSnapshot>,

    #[serde(rename = "childrens", default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    #[serde(rename = "child-exec-only")]
    pub child_exec_only: BTreeMap<String, bool>,
}

impl NodeSnapshot {
    /// How many of the sub-dag, loop body and conditional slots are filled.
    pub fn nested_slot_count(&self) -> usize {
        [
            self.sub_dag.is_some(),
            self.foreach_dag.is_some(),
            !self.conditional_dags.is_empty(),
        ]
        .into_iter()
        .filter(|filled| *filled)
        .count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OperationSnapshot {
    #[serde(rename = "is-mod")]
    pub is_modifier: bool,
    pub is_function: bool,
    pub is_callback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub has_response_handler: bool,
    pub has_failure_handler: bool,
}
