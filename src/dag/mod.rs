//! In-memory workflow model: dags of nodes that may nest further dags.
//!
//! A `Dag` owns its nodes, and a node owns any dag nested inside it (branch
//! bodies, loop body, plain sub-dag), so a built model is always a tree of
//! dags. Derived data (indices, unique ids, children, degrees, forwarding
//! tables) is filled in by [`DagBuilder::build`] and is read-only afterwards.

pub mod build;
pub mod builder;
pub mod graph;

pub use build::{BuildOptions, DEFAULT_NODE_LIMIT, build_dag, build_dag_with};
pub use builder::{DagBuilder, EdgeKind};
pub use graph::DagGraph;

use std::collections::{BTreeMap, HashMap};

/// Forwarding-table key under which a conditional or foreach node registers
/// how data reaches its dynamically resolved branches.
pub const DYNAMIC_FORWARD_KEY: &str = "dynamic";

/// A named reference to a function registered by the host runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hook(String);

impl Hook {
    pub fn new(name: impl Into<String>) -> Self {
        Hook(name.into())
    }
}

/// How a parent's result is passed along an edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Forwarder {
    /// Forward the result unchanged.
    Default,
    /// Forward the result through a host transform.
    Transform(Hook),
}

/// One step inside a node.
///
/// The execution kinds are independent fields; a well-formed operation sets
/// exactly one of `modifier`, `function` or `callback_url`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operation {
    pub modifier: Option<Hook>,
    pub function: Option<String>,
    pub callback_url: Option<String>,
    pub response_handler: Option<Hook>,
    pub failure_handler: Option<Hook>,
}

impl Operation {
    pub fn modifier(hook: Hook) -> Self {
        Operation {
            modifier: Some(hook),
            ..Default::default()
        }
    }

    pub fn function(name: impl Into<String>) -> Self {
        Operation {
            function: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn callback(url: impl Into<String>) -> Self {
        Operation {
            callback_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_response_handler(mut self, hook: Hook) -> Self {
        self.response_handler = Some(hook);
        self
    }

    pub fn with_failure_handler(mut self, hook: Hook) -> Self {
        self.failure_handler = Some(hook);
        self
    }
}

/// Loop construct: the body dag runs once per item produced by `iterator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForEach {
    pub iterator: Hook,
    pub body: Box<Dag>,
}

/// Branch construct: `selector` picks which labelled dags run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub selector: Hook,
    pub branches: BTreeMap<String, Dag>,
}

/// The nested structure a node may carry. At most one applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Nesting {
    #[default]
    None,
    SubDag(Box<Dag>),
    ForEach(ForEach),
    Conditional(Condition),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: String,
    index: usize,
    unique_id: String,
    dynamic: bool,
    nesting: Nesting,
    aggregator: Option<Hook>,
    sub_aggregator: Option<Hook>,
    operations: Vec<Operation>,
    children: Vec<String>,
    forwarder: HashMap<String, Forwarder>,
    in_degree: usize,
    out_degree: usize,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Node {
            id: id.into(),
            index: 0,
            unique_id: String::new(),
            dynamic: false,
            nesting: Nesting::None,
            aggregator: None,
            sub_aggregator: None,
            operations: Vec::new(),
            children: Vec::new(),
            forwarder: HashMap::new(),
            in_degree: 0,
            out_degree: 0,
        }
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn dynamic(mut self, dynamic: bool) -> Self {
        self.dynamic = dynamic;
        self
    }

    pub fn with_aggregator(mut self, hook: Hook) -> Self {
        self.aggregator = Some(hook);
        self
    }

    pub fn with_sub_aggregator(mut self, hook: Hook) -> Self {
        self.sub_aggregator = Some(hook);
        self
    }

    pub fn with_sub_dag(mut self, dag: Dag) -> Self {
        self.nesting = Nesting::SubDag(Box::new(dag));
        self
    }

    /// Turn the node into a loop over `body`. Loop nodes are resolved at run
    /// time and forward data to their iterations by default.
    pub fn with_foreach(mut self, iterator: Hook, body: Dag) -> Self {
        self.nesting = Nesting::ForEach(ForEach {
            iterator,
            body: Box::new(body),
        });
        self.dynamic = true;
        self.forwarder
            .insert(DYNAMIC_FORWARD_KEY.to_string(), Forwarder::Default);
        self
    }

    /// Turn the node into a conditional over labelled branch dags. Same
    /// runtime defaults as [`Node::with_foreach`].
    pub fn with_condition(mut self, selector: Hook, branches: BTreeMap<String, Dag>) -> Self {
        self.nesting = Nesting::Conditional(Condition { selector, branches });
        self.dynamic = true;
        self.forwarder
            .insert(DYNAMIC_FORWARD_KEY.to_string(), Forwarder::Default);
        self
    }

    /// Register (or replace) the forwarder used for dynamic branches.
    pub fn with_dynamic_forwarder(mut self, forwarder: Forwarder) -> Self {
        self.forwarder
            .insert(DYNAMIC_FORWARD_KEY.to_string(), forwarder);
        self
    }

    /// Dynamic branches only wait on this node; no data is passed to them.
    pub fn exec_only_dynamic(mut self) -> Self {
        self.forwarder.remove(DYNAMIC_FORWARD_KEY);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn nesting(&self) -> &Nesting {
        &self.nesting
    }

    pub fn is_branching(&self) -> bool {
        matches!(self.nesting, Nesting::ForEach(_) | Nesting::Conditional(_))
    }

    pub fn aggregator(&self) -> Option<&Hook> {
        self.aggregator.as_ref()
    }

    pub fn sub_aggregator(&self) -> Option<&Hook> {
        self.sub_aggregator.as_ref()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn children(&self) -> &[String] {
        &self.children
    }

    pub fn forwarder(&self, key: &str) -> Option<&Forwarder> {
        self.forwarder.get(key)
    }

    /// True when nothing is forwarded under `key`, i.e. the edge only orders
    /// execution. Total over any key.
    pub fn is_execution_only(&self, key: &str) -> bool {
        !self.forwarder.contains_key(key)
    }

    pub fn in_degree(&self) -> usize {
        self.in_degree
    }

    pub fn out_degree(&self) -> usize {
        self.out_degree
    }

    /// Every dag nested directly inside this node, with the label it is
    /// reached through (`None` for loop bodies and plain sub-dags).
    pub fn nested_dags(&self) -> Vec<(Option<&str>, &Dag)> {
        match &self.nesting {
            Nesting::None => vec![],
            Nesting::SubDag(dag) => vec![(None, dag.as_ref())],
            Nesting::ForEach(foreach) => vec![(None, foreach.body.as_ref())],
            Nesting::Conditional(condition) => condition
                .branches
                .iter()
                .map(|(label, dag)| (Some(label.as_str()), dag))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dag {
    id: String,
    nodes: BTreeMap<String, Node>,
    has_branch: bool,
    has_edge: bool,
    execution_only: bool,
}

impl Dag {
    pub fn builder(id: impl Into<String>) -> DagBuilder {
        DagBuilder::new(id)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn nodes(&self) -> &BTreeMap<String, Node> {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node with no incoming edges, when there is exactly one.
    pub fn start_node(&self) -> Option<&str> {
        single_id(self.nodes.values().filter(|n| n.in_degree == 0))
    }

    /// The node with no outgoing edges, when there is exactly one.
    pub fn end_node(&self) -> Option<&str> {
        single_id(self.nodes.values().filter(|n| n.out_degree == 0))
    }

    pub fn has_branch(&self) -> bool {
        self.has_branch
    }

    pub fn has_edge(&self) -> bool {
        self.has_edge
    }

    /// Whether any edge in this dag is execution-only.
    pub fn is_execution_only(&self) -> bool {
        self.execution_only
    }

    /// Assign runtime ids to every node of this dag and of the dags nested
    /// below it. Root nodes get `{index}_{id}`; nested nodes are prefixed
    /// with their parent's unique id (and branch label, for conditionals).
    fn assign_unique_ids(&mut self, prefix: &str) {
        for node in self.nodes.values_mut() {
            let unique_id = format!("{}{}_{}", prefix, node.index, node.id);
            match &mut node.nesting {
                Nesting::None => {}
                Nesting::SubDag(dag) => dag.assign_unique_ids(&format!("{}.", unique_id)),
                Nesting::ForEach(foreach) => {
                    foreach.body.assign_unique_ids(&format!("{}.", unique_id))
                }
                Nesting::Conditional(condition) => {
                    for (label, dag) in condition.branches.iter_mut() {
                        dag.assign_unique_ids(&format!("{}.{}.", unique_id, label));
                    }
                }
            }
            node.unique_id = unique_id;
        }
    }
}

fn single_id<'a>(mut nodes: impl Iterator<Item = &'a Node>) -> Option<&'a str> {
    let first = nodes.next()?;
    match nodes.next() {
        Some(_) => None,
        None => Some(first.id()),
    }
}
