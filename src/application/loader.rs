//! Tree and graph description files (TOML).
//!
//! Binary tree:
//! ```toml
//! value = 1
//! [left]
//! value = 2
//! [right]
//! value = 3
//! ```
//!
//! N-ary tree:
//! ```toml
//! value = 1
//! [[children]]
//! value = 2
//! [[children.children]]
//! value = 4
//! ```
//!
//! Computation graph:
//! ```toml
//! output = "z"
//! [inputs]
//! x = 2.0
//! [[nodes]]
//! name = "x"
//! op = "input"
//! [[nodes]]
//! name = "z"
//! op = "square"
//! inputs = ["x"]
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{BinaryTree, BinaryTreeNode, ComputationGraph, NodeArena, Operation};

/// Node payload read from a description file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Integer(v) => write!(f, "{}", v),
            Label::Float(v) => write!(f, "{}", v),
            Label::Bool(v) => write!(f, "{}", v),
            Label::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Label {
    fn from(v: i64) -> Self {
        Label::Integer(v)
    }
}

impl From<&str> for Label {
    fn from(v: &str) -> Self {
        Label::Text(v.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BinaryNodeEntry {
    pub value: Label,
    #[serde(default)]
    pub left: Option<Box<BinaryNodeEntry>>,
    #[serde(default)]
    pub right: Option<Box<BinaryNodeEntry>>,
}

impl From<BinaryNodeEntry> for BinaryTreeNode<Label> {
    fn from(entry: BinaryNodeEntry) -> Self {
        BinaryTreeNode {
            value: entry.value,
            left: entry.left.map(|left| Box::new((*left).into())),
            right: entry.right.map(|right| Box::new((*right).into())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NaryNodeEntry {
    pub value: Label,
    #[serde(default)]
    pub children: Vec<NaryNodeEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphNodeEntry {
    pub name: String,
    pub op: Operation,
    #[serde(default)]
    pub inputs: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphFile {
    pub output: String,
    #[serde(default)]
    pub inputs: BTreeMap<String, f64>,
    pub nodes: Vec<GraphNodeEntry>,
}

/// A graph ready for a forward pass, with the inputs and output named in its file.
#[derive(Debug)]
pub struct LoadedGraph {
    pub graph: ComputationGraph,
    pub inputs: BTreeMap<String, f64>,
    pub output: String,
}

fn parse<T: DeserializeOwned>(content: &str, path: &Path) -> ApplicationResult<T> {
    toml::from_str(content).map_err(|e| ApplicationError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn read(path: &Path) -> ApplicationResult<String> {
    std::fs::read_to_string(path).with_path_context("read tree file", path)
}

pub fn parse_binary_tree(content: &str, path: &Path) -> ApplicationResult<BinaryTree<Label>> {
    let entry: BinaryNodeEntry = parse(content, path)?;
    Ok(BinaryTree::from(BinaryTreeNode::from(entry)))
}

#[instrument(level = "debug")]
pub fn load_binary_tree(path: &Path) -> ApplicationResult<BinaryTree<Label>> {
    let tree = parse_binary_tree(&read(path)?, path)?;
    debug!("loaded binary tree with {} nodes", tree.len());
    Ok(tree)
}

/// Builds the arena with an explicit stack; sibling order is preserved.
pub fn parse_nary_tree(content: &str, path: &Path) -> ApplicationResult<NodeArena<Label>> {
    let entry: NaryNodeEntry = parse(content, path)?;
    let mut arena = NodeArena::new();
    let mut stack = vec![(entry, None)];

    while let Some((node, parent)) = stack.pop() {
        let idx = arena.insert_node(node.value, parent);
        // reversed so the first child is inserted first
        for child in node.children.into_iter().rev() {
            stack.push((child, Some(idx)));
        }
    }

    Ok(arena)
}

#[instrument(level = "debug")]
pub fn load_nary_tree(path: &Path) -> ApplicationResult<NodeArena<Label>> {
    let arena = parse_nary_tree(&read(path)?, path)?;
    debug!("loaded n-ary tree with {} nodes", arena.len());
    Ok(arena)
}

pub fn parse_graph(content: &str, path: &Path) -> ApplicationResult<LoadedGraph> {
    let file: GraphFile = parse(content, path)?;
    let mut graph = ComputationGraph::new();

    for node in &file.nodes {
        if node.op == Operation::Input {
            if !node.inputs.is_empty() {
                return Err(ApplicationError::Parse {
                    path: path.to_path_buf(),
                    message: format!("input node '{}' cannot list inputs", node.name),
                });
            }
            graph.add_node(&node.name, node.op)?;
        } else {
            let inputs: Vec<&str> = node.inputs.iter().map(String::as_str).collect();
            graph.add_operation(&node.name, node.op, &inputs)?;
        }
    }

    Ok(LoadedGraph {
        graph,
        inputs: file.inputs,
        output: file.output,
    })
}

#[instrument(level = "debug")]
pub fn load_graph(path: &Path) -> ApplicationResult<LoadedGraph> {
    let loaded = parse_graph(&read(path)?, path)?;
    debug!("loaded graph with {} nodes", loaded.graph.len());
    Ok(loaded)
}
