//! Computation graph with a forward pass and a reverse (gradient) pass.
//!
//! Nodes reference their inputs ("parents") and consumers ("children") by
//! arena handle. A node can only take inputs that already exist, so the graph
//! is acyclic by construction.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use generational_arena::Arena;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::arena::NodeId;
use crate::domain::error::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Input,
    Add,
    Multiply,
    Square,
    Negate,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Input => "input",
            Operation::Add => "add",
            Operation::Multiply => "multiply",
            Operation::Square => "square",
            Operation::Negate => "negate",
        };
        f.write_str(name)
    }
}

impl FromStr for Operation {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(Operation::Input),
            "add" => Ok(Operation::Add),
            "multiply" => Ok(Operation::Multiply),
            "square" => Ok(Operation::Square),
            "negate" => Ok(Operation::Negate),
            other => Err(DomainError::InvalidOperation(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GraphNode {
    pub name: String,
    pub operation: Operation,
    /// Result of the last forward pass
    pub value: Option<f64>,
    /// Result of the last reverse pass
    pub gradient: f64,
    /// Input nodes this node depends on
    pub parents: Vec<NodeId>,
    /// Nodes consuming this node's value
    pub children: Vec<NodeId>,
}

#[derive(Debug)]
pub struct ComputationGraph {
    arena: Arena<GraphNode>,
    names: HashMap<String, NodeId>,
    /// Creation order, for deterministic listings
    order: Vec<NodeId>,
    output: Option<NodeId>,
}

impl Default for ComputationGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputationGraph {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            names: HashMap::new(),
            order: Vec::new(),
            output: None,
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn add_node(&mut self, name: &str, operation: Operation) -> DomainResult<NodeId> {
        if self.names.contains_key(name) {
            return Err(DomainError::NodeExists(name.to_string()));
        }
        let idx = self.arena.insert(GraphNode {
            name: name.to_string(),
            operation,
            value: None,
            gradient: 0.0,
            parents: Vec::new(),
            children: Vec::new(),
        });
        self.names.insert(name.to_string(), idx);
        self.order.push(idx);
        Ok(idx)
    }

    /// Adds `name` computed by `operation` over the named inputs.
    ///
    /// Repeated input names are linked once.
    #[instrument(level = "debug", skip(self))]
    pub fn add_operation(
        &mut self,
        name: &str,
        operation: Operation,
        inputs: &[&str],
    ) -> DomainResult<NodeId> {
        let parents = inputs
            .iter()
            .map(|input| self.lookup(input))
            .collect::<DomainResult<Vec<_>>>()?;

        let idx = self.add_node(name, operation)?;
        for parent in parents {
            self.link(parent, idx);
        }
        Ok(idx)
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.arena.get_mut(child) {
            if !node.parents.contains(&parent) {
                node.parents.push(parent);
            }
        }
        if let Some(node) = self.arena.get_mut(parent) {
            if !node.children.contains(&child) {
                node.children.push(child);
            }
        }
    }

    pub fn lookup(&self, name: &str) -> DomainResult<NodeId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| DomainError::UnknownNode(name.to_string()))
    }

    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.names.get(name).and_then(|&idx| self.arena.get(idx))
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.node(name).and_then(|node| node.value)
    }

    pub fn gradient(&self, name: &str) -> Option<f64> {
        self.node(name).map(|node| node.gradient)
    }

    /// Node names in creation order.
    pub fn names(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter_map(|&idx| self.arena.get(idx))
            .map(|node| node.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    fn get(&self, idx: NodeId) -> DomainResult<&GraphNode> {
        self.arena.get(idx).ok_or(DomainError::NodeNotFound(idx))
    }

    /// Nodes reachable from `output` through inputs, every input before its consumers.
    #[instrument(level = "debug", skip(self))]
    pub fn topological_order(&self, output: &str) -> DomainResult<Vec<NodeId>> {
        let start = self.lookup(output)?;
        let mut order = Vec::new();
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut stack = vec![(start, false)];

        while let Some((idx, expanded)) = stack.pop() {
            if expanded {
                order.push(idx);
                continue;
            }
            if !seen.insert(idx) {
                continue;
            }
            stack.push((idx, true));
            let node = self.get(idx)?;
            stack.extend(
                node.parents
                    .iter()
                    .rev()
                    .filter(|parent| !seen.contains(*parent))
                    .map(|&parent| (parent, false)),
            );
        }

        Ok(order)
    }

    /// Consumers before their inputs, starting at `output`.
    pub fn reverse_topological_order(&self, output: &str) -> DomainResult<Vec<NodeId>> {
        let mut order = self.topological_order(output)?;
        order.reverse();
        Ok(order)
    }

    fn checked_value(&self, idx: NodeId) -> DomainResult<f64> {
        let node = self.get(idx)?;
        node.value
            .ok_or_else(|| DomainError::MissingInput(node.name.clone()))
    }

    fn require_arity(node: &GraphNode, expected: usize) -> DomainResult<()> {
        if node.parents.len() == expected {
            Ok(())
        } else {
            Err(DomainError::ArityMismatch {
                name: node.name.clone(),
                operation: node.operation.to_string(),
                expected,
                actual: node.parents.len(),
            })
        }
    }

    /// Assigns `inputs`, evaluates every node `output` depends on and returns its value.
    ///
    /// A failed pass leaves no output behind, so `reverse_pass` needs a new
    /// successful forward pass first.
    #[instrument(level = "debug", skip(self))]
    pub fn forward_pass(&mut self, inputs: &BTreeMap<String, f64>, output: &str) -> DomainResult<f64> {
        self.output = None;
        let output_idx = self.lookup(output)?;
        let order = self.topological_order(output)?;

        for (name, &value) in inputs {
            let idx = self.lookup(name)?;
            if let Some(node) = self.arena.get_mut(idx) {
                node.value = Some(value);
            }
        }

        for idx in order {
            let node = self.get(idx)?;
            let value = match node.operation {
                Operation::Input => self.checked_value(idx)?,
                Operation::Add => node
                    .parents
                    .iter()
                    .map(|&parent| self.checked_value(parent))
                    .sum::<DomainResult<f64>>()?,
                Operation::Multiply => node
                    .parents
                    .iter()
                    .map(|&parent| self.checked_value(parent))
                    .product::<DomainResult<f64>>()?,
                Operation::Square => {
                    Self::require_arity(node, 1)?;
                    self.checked_value(node.parents[0])?.powi(2)
                }
                Operation::Negate => {
                    Self::require_arity(node, 1)?;
                    -self.checked_value(node.parents[0])?
                }
            };
            debug!("forward: {} = {}", node.name, value);
            if let Some(node) = self.arena.get_mut(idx) {
                node.value = Some(value);
            }
        }

        self.output = Some(output_idx);
        self.checked_value(output_idx)
    }

    /// Propagates gradients from the last forward pass's output back to every input.
    ///
    /// Returns the gradient of every node in the graph, keyed by name.
    #[instrument(level = "debug", skip(self))]
    pub fn reverse_pass(&mut self) -> DomainResult<BTreeMap<String, f64>> {
        let output_idx = self.output.ok_or(DomainError::ForwardPassRequired)?;
        let output_name = self.get(output_idx)?.name.clone();

        for (_, node) in self.arena.iter_mut() {
            node.gradient = 0.0;
        }
        if let Some(node) = self.arena.get_mut(output_idx) {
            node.gradient = 1.0;
        }

        for idx in self.reverse_topological_order(&output_name)? {
            let node = self.get(idx)?;
            let gradient = node.gradient;
            let mut contributions: Vec<(NodeId, f64)> = Vec::with_capacity(node.parents.len());

            match node.operation {
                Operation::Input => {}
                Operation::Add => {
                    contributions.extend(node.parents.iter().map(|&parent| (parent, gradient)));
                }
                Operation::Multiply => {
                    for (i, &parent) in node.parents.iter().enumerate() {
                        let mut others = 1.0;
                        for (j, &other) in node.parents.iter().enumerate() {
                            if i != j {
                                others *= self.checked_value(other)?;
                            }
                        }
                        contributions.push((parent, gradient * others));
                    }
                }
                Operation::Square => {
                    Self::require_arity(node, 1)?;
                    let parent = node.parents[0];
                    contributions.push((parent, gradient * 2.0 * self.checked_value(parent)?));
                }
                Operation::Negate => {
                    Self::require_arity(node, 1)?;
                    contributions.push((node.parents[0], -gradient));
                }
            }

            for (parent, delta) in contributions {
                if let Some(parent) = self.arena.get_mut(parent) {
                    parent.gradient += delta;
                }
            }
        }

        Ok(self
            .arena
            .iter()
            .map(|(_, node)| (node.name.clone(), node.gradient))
            .collect())
    }
}
