//! Syntax tree nodes as seen by the interpretation context
//!
//! The context never interprets nodes. It needs a stable identity for
//! caching and the one-shot statement frame, and a way to enumerate direct
//! children. Any tree type can plug in through [`TreeNode`]; [`Node`] is the
//! concrete tree used by the walker and the CLI, loadable from JSON.

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique node identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Allocate a fresh identity
    pub fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Accessor contract the context needs from a tree node
pub trait TreeNode: Sized {
    /// Identity used as the cache key and for statement-frame matching
    fn node_id(&self) -> NodeId;

    /// Authoritative, freshly materialized list of direct children
    fn children(&self) -> Vec<Rc<Self>>;

    /// Whether this node brackets its own scope
    fn is_block(&self) -> bool {
        false
    }

    /// Human-readable description for trace output
    fn describe(&self) -> String {
        self.node_id().to_string()
    }
}

/// Source location of a node (1-based line and column)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub line: usize,
    pub column: usize,
}

/// Syntactic role of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Groups statements and opens a scope
    Block,
    /// Anything evaluated as a single statement
    Statement,
}

/// A rule/workflow syntax tree node
#[derive(Debug, Serialize, Deserialize)]
pub struct Node {
    #[serde(skip, default = "NodeId::next")]
    id: NodeId,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<SourceSpan>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Rc<Node>>,
}

impl Node {
    pub fn new(kind: NodeKind, label: Option<String>, children: Vec<Rc<Node>>) -> Rc<Self> {
        Rc::new(Self {
            id: NodeId::next(),
            kind,
            label,
            span: None,
            children,
        })
    }

    /// A block node wrapping `children`
    pub fn block(children: Vec<Rc<Node>>) -> Rc<Self> {
        Self::new(NodeKind::Block, None, children)
    }

    /// A leaf statement
    pub fn statement(label: impl Into<String>) -> Rc<Self> {
        Self::new(NodeKind::Statement, Some(label.into()), Vec::new())
    }

    /// A statement with nested children (e.g. an assignment and its expression)
    pub fn statement_with(label: impl Into<String>, children: Vec<Rc<Node>>) -> Rc<Self> {
        Self::new(NodeKind::Statement, Some(label.into()), children)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Total node count of this subtree, including `self`
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(|c| c.count()).sum::<usize>()
    }

    /// Parse a tree from JSON
    pub fn from_json(input: &str) -> Result<Rc<Self>> {
        let node: Node = serde_json::from_str(input).context("Invalid syntax tree document")?;
        Ok(Rc::new(node))
    }

    /// Load a tree from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Rc<Self>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("In file: {}", path.display()))
    }
}

impl TreeNode for Node {
    fn node_id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<Rc<Self>> {
        self.children.clone()
    }

    fn is_block(&self) -> bool {
        self.kind == NodeKind::Block
    }

    fn describe(&self) -> String {
        let kind = match self.kind {
            NodeKind::Block => "block",
            NodeKind::Statement => "statement",
        };
        let mut out = match &self.label {
            Some(label) => format!("{} {} '{}'", kind, self.id, label),
            None => format!("{} {}", kind, self.id),
        };
        if let Some(span) = &self.span {
            out.push_str(&format!(" at {}:{}", span.line, span.column));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ids_are_unique() {
        let a = Node::statement("a");
        let b = Node::statement("a");
        assert_ne!(a.node_id(), b.node_id());
    }

    #[test]
    fn test_from_json() {
        let tree = Node::from_json(
            r#"{
                "kind": "block",
                "children": [
                    {"kind": "statement", "label": "x = 1", "span": {"line": 2, "column": 5}},
                    {"kind": "statement", "label": "y = x"}
                ]
            }"#,
        )
        .unwrap();

        assert!(tree.is_block());
        assert_eq!(tree.count(), 3);
        let children = tree.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].label.as_deref(), Some("x = 1"));
        assert!(children[0].describe().ends_with("'x = 1' at 2:5"));
        assert_ne!(children[0].node_id(), children[1].node_id());
    }

    #[test]
    fn test_children_share_nodes() {
        let leaf = Node::statement("leaf");
        let parent = Node::statement_with("parent", vec![leaf.clone()]);
        assert!(Rc::ptr_eq(&parent.children()[0], &leaf));
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(Node::from_json(r#"{"kind": "loop"}"#).is_err());
    }
}
