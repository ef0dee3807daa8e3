//! Resolves a named-reference pipeline definition into an owned `Dag` tree.
//!
//! Every nested reference is expanded into its own copy, so the result has no
//! sharing. A reference back to a dag that is still being expanded higher up
//! the same path is rejected (B003) instead of recursing forever, and the total
//! number of expanded nodes is capped (B008) so that dags referenced from many
//! places cannot blow up the tree.

use std::collections::BTreeMap;

use super::{Dag, DagBuilder, EdgeKind, Forwarder, Hook, Node, Operation};
use crate::error::ExportError;
use crate::parse::types::*;

/// Upper bound on expanded nodes used by [`build_dag`].
pub const DEFAULT_NODE_LIMIT: usize = 10_000;

/// Limits applied while resolving a definition.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Maximum number of nodes in the fully expanded tree, nested dags included.
    pub node_limit: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            node_limit: DEFAULT_NODE_LIMIT,
        }
    }
}

/// Build the root dag of `definition`.
pub fn build_dag(definition: &PipelineDefinition) -> Result<Dag, Vec<ExportError>> {
    build_dag_with(definition, &BuildOptions::default())
}

/// Build the root dag of `definition` under the given limits.
pub fn build_dag_with(
    definition: &PipelineDefinition,
    options: &BuildOptions,
) -> Result<Dag, Vec<ExportError>> {
    if !definition.dags.contains_key(&definition.root) {
        return Err(vec![ExportError::build(
            "B001",
            format!("Root dag '{}' is not defined", definition.root),
            None,
        )]);
    }
    let mut resolver = Resolver {
        definition,
        ancestors: Vec::new(),
        expanded: 0,
        limit: options.node_limit,
        exhausted: false,
    };
    resolver.resolve_dag(&definition.root, None)
}

struct Resolver<'a> {
    definition: &'a PipelineDefinition,
    /// Dag names currently being expanded, outermost first.
    ancestors: Vec<String>,
    expanded: usize,
    limit: usize,
    /// Set once the node limit is hit; callers stop resolving siblings.
    exhausted: bool,
}

impl Resolver<'_> {
    fn resolve_dag(&mut self, name: &str, referrer: Option<&str>) -> Result<Dag, Vec<ExportError>> {
        if self.ancestors.iter().any(|a| a == name) {
            return Err(vec![ExportError::build(
                "B003",
                format!(
                    "Cyclic dag reference: {} -> {}",
                    self.ancestors.join(" -> "),
                    name
                ),
                referrer.map(str::to_string),
            )]);
        }

        let definition = self.definition;
        let Some(dag_def) = definition.dags.get(name) else {
            return Err(vec![ExportError::build(
                "B002",
                format!("Reference to undefined dag '{}'", name),
                referrer.map(str::to_string),
            )]);
        };

        if self.expanded + dag_def.nodes.len() > self.limit {
            self.exhausted = true;
            return Err(vec![ExportError::build(
                "B008",
                format!("Definition expands beyond {} nodes", self.limit),
                referrer.map(str::to_string),
            )]);
        }
        self.expanded += dag_def.nodes.len();

        self.ancestors.push(name.to_string());
        let result = self.build_level(name, dag_def);
        self.ancestors.pop();
        result
    }

    fn build_level(
        &mut self,
        name: &str,
        dag_def: &DagDefinition,
    ) -> Result<Dag, Vec<ExportError>> {
        let mut errors = Vec::new();
        let mut builder = DagBuilder::new(name);

        for node_def in &dag_def.nodes {
            match self.build_node(node_def) {
                Ok(node) => builder = builder.node(node),
                Err(node_errors) => errors.extend(node_errors),
            }
            if self.exhausted {
                return Err(errors);
            }
        }

        for edge in &dag_def.edges {
            let kind = if edge.exec_only {
                EdgeKind::ExecutionOnly
            } else {
                match &edge.forwarder {
                    Some(transform) => EdgeKind::Data(Forwarder::Transform(Hook::new(transform))),
                    None => EdgeKind::Data(Forwarder::Default),
                }
            };
            builder = builder.edge_with(&edge.from, &edge.to, kind);
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        builder.build()
    }

    fn build_node(&mut self, def: &NodeDefinition) -> Result<Node, Vec<ExportError>> {
        let declared = [
            def.condition.is_some(),
            def.foreach.is_some(),
            def.sub_dag.is_some(),
        ]
        .into_iter()
        .filter(|d| *d)
        .count();
        if declared > 1 {
            return Err(vec![ExportError::build(
                "B006",
                format!(
                    "Node '{}' declares more than one of condition, foreach and sub-dag",
                    def.id
                ),
                Some(def.id.clone()),
            )]);
        }

        let mut node = Node::new(&def.id);
        for op in &def.operations {
            node = node.with_operation(build_operation(op));
        }
        if let Some(aggregator) = &def.aggregator {
            node = node.with_aggregator(Hook::new(aggregator));
        }
        if let Some(sub_aggregator) = &def.sub_aggregator {
            node = node.with_sub_aggregator(Hook::new(sub_aggregator));
        }

        if let Some(condition) = &def.condition {
            let mut branches = BTreeMap::new();
            let mut errors = Vec::new();
            for (label, dag_name) in &condition.branches {
                match self.resolve_dag(dag_name, Some(&def.id)) {
                    Ok(dag) => {
                        branches.insert(label.clone(), dag);
                    }
                    Err(branch_errors) => errors.extend(branch_errors),
                }
                if self.exhausted {
                    break;
                }
            }
            if !errors.is_empty() {
                return Err(errors);
            }
            node = node.with_condition(Hook::new(&condition.selector), branches);
        }

        if let Some(foreach) = &def.foreach {
            let body = self.resolve_dag(&foreach.body, Some(&def.id))?;
            node = node.with_foreach(Hook::new(&foreach.iterator), body);
        }

        if let Some(sub_dag) = &def.sub_dag {
            let dag = self.resolve_dag(sub_dag, Some(&def.id))?;
            node = node.with_sub_dag(dag);
        }

        if def.exec_only_dynamic {
            node = node.exec_only_dynamic();
        }
        if let Some(dynamic) = def.dynamic {
            node = node.dynamic(dynamic);
        }

        Ok(node)
    }
}

fn build_operation(def: &OperationDefinition) -> Operation {
    Operation {
        modifier: def.modifier.as_ref().map(Hook::new),
        function: def.function.clone(),
        callback_url: def.callback_url.clone(),
        response_handler: def.on_response.as_ref().map(Hook::new),
        failure_handler: def.on_failure.as_ref().map(Hook::new),
    }
}
