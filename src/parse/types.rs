//! Serde types for the JSON pipeline definition.
//!
//! Dags are declared once in a named table and nodes refer to nested dags
//! by name, so one definition can reuse a body in several places. References
//! are resolved into an owned tree by [`crate::dag::build_dag`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PipelineDefinition {
    /// Name of the top-level dag in `dags`.
    pub root: String,
    pub dags: BTreeMap<String, DagDefinition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DagDefinition {
    #[serde(default)]
    pub nodes: Vec<NodeDefinition>,
    #[serde(default)]
    pub edges: Vec<EdgeDefinition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NodeDefinition {
    pub id: String,
    /// Overrides the default (dynamic for condition and foreach nodes).
    pub dynamic: Option<bool>,
    #[serde(default)]
    pub operations: Vec<OperationDefinition>,
    pub aggregator: Option<String>,
    pub sub_aggregator: Option<String>,
    pub condition: Option<ConditionDefinition>,
    pub foreach: Option<ForEachDefinition>,
    pub sub_dag: Option<String>,
    /// Dynamic branches wait on the node without receiving its data.
    #[serde(default)]
    pub exec_only_dynamic: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConditionDefinition {
    pub selector: String,
    /// Branch label -> dag name.
    pub branches: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ForEachDefinition {
    pub iterator: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EdgeDefinition {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub exec_only: bool,
    /// Transform applied to forwarded data. Ignored on exec-only edges.
    pub forwarder: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OperationDefinition {
    pub modifier: Option<String>,
    pub function: Option<String>,
    pub callback_url: Option<String>,
    pub on_response: Option<String>,
    pub on_failure: Option<String>,
}
