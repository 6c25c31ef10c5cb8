//! Memoized children lookups keyed by node identity
//!
//! Once a node's children have been materialized through the cache, the same
//! shared sequence is handed back for the lifetime of the cache. There is no
//! eviction: a stable answer per node is part of the contract.

use crate::node::{NodeId, TreeNode};
use std::collections::HashMap;
use std::rc::Rc;

/// Shared, immutable children sequence
pub type Children<N> = Rc<[Rc<N>]>;

/// Cache hit/miss counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheMetrics {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that had to ask the node
    pub misses: u64,
    /// Distinct nodes currently memoized
    pub entries: usize,
}

impl CacheMetrics {
    /// Hit rate between 0.0 and 1.0; 0.0 before any request
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn total_requests(&self) -> u64 {
        self.hits + self.misses
    }
}

/// Per-context memoization of `node -> children`
pub struct NodeCache<N> {
    entries: HashMap<NodeId, Children<N>>,
    hits: u64,
    misses: u64,
}

impl<N: TreeNode> NodeCache<N> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Cached children of `node`, asking the node on first access
    pub fn get(&mut self, node: &N) -> Children<N> {
        let id = node.node_id();
        if let Some(children) = self.entries.get(&id) {
            self.hits += 1;
            tracing::trace!(node = %id, "children cache hit");
            return Rc::clone(children);
        }

        self.misses += 1;
        tracing::trace!(node = %id, "children cache miss");
        let children: Children<N> = node.children().into();
        self.entries.insert(id, Rc::clone(&children));
        children
    }

    /// Whether `node` has been memoized
    pub fn contains(&self, node: &N) -> bool {
        self.entries.contains_key(&node.node_id())
    }

    pub fn metrics(&self) -> CacheMetrics {
        CacheMetrics {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: TreeNode> Default for NodeCache<N> {
    fn default() -> Self {
        Self::new()
    }
}
