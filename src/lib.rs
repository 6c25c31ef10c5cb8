//! Ruleflow - interpretation context for business-rule syntax trees
//!
//! An external evaluator walks a rule/workflow tree and reports lifecycle
//! boundaries to a [`Context`]. The context owns the frame stack, the
//! variable store, the children cache and the observer registry; it never
//! decides what a node means.

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod frame;
pub mod logger;
pub mod node;
pub mod result;
pub mod value;
pub mod variable;
pub mod walker;

// Re-export commonly used types
pub use cache::{CacheMetrics, Children, NodeCache};
pub use config::ContextConfig;
pub use context::Context;
pub use error::ContextError;
pub use events::{observer_fn, ContextId, EventKind, LifecycleEvent, Observer, SubscriptionId};
pub use frame::{Frame, FrameKind};
pub use logger::TraceLogger;
pub use node::{Node, NodeId, NodeKind, TreeNode};
pub use result::{ExecutionArgument, ExecutionRecord, JsonFileStore, MemoryStore, ResultStore};
pub use value::Variable;
pub use variable::{VariableDefinition, VariableStore};
pub use walker::{run_program, walk};

/// Ruleflow version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
