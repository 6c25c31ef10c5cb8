//! Error types for the interpretation context
//!
//! Resolution misses are not errors (they yield [`Variable::Undefined`]).
//! Everything here is either a caller contract violation or a failure of an
//! external collaborator.
//!
//! [`Variable::Undefined`]: crate::value::Variable::Undefined

use crate::events::ContextId;
use crate::node::NodeId;
use thiserror::Error;

/// Errors raised by the context and its boundary types
#[derive(Debug, Error)]
pub enum ContextError {
    /// A variable definition name that can never be resolved
    #[error("malformed variable definition {name:?}: {reason}")]
    MalformedDefinition { name: String, reason: &'static str },

    /// `block_leave` fired while no frame was open
    #[error("block leave for node {node} without a matching block enter")]
    UnbalancedBlockLeave { node: NodeId },

    /// The pending single-statement node left while no frame was open
    #[error("statement leave for node {node} found no open frame to close")]
    UnbalancedStatementLeave { node: NodeId },

    /// An earlier scope violation broke this run
    #[error("context {context} is broken by an earlier scope violation")]
    Broken { context: ContextId },

    /// The result store rejected a start or finish notification
    #[error("result store failure: {0}")]
    Persistence(#[source] anyhow::Error),
}

impl ContextError {
    /// Whether this error is a scope-discipline violation (mis-paired events)
    pub fn is_scope_violation(&self) -> bool {
        matches!(
            self,
            ContextError::UnbalancedBlockLeave { .. }
                | ContextError::UnbalancedStatementLeave { .. }
                | ContextError::Broken { .. }
        )
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = ContextError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_violation_classification() {
        let err = ContextError::UnbalancedBlockLeave { node: NodeId(3) };
        assert!(err.is_scope_violation());
        assert_eq!(
            err.to_string(),
            "block leave for node #3 without a matching block enter"
        );

        let err = ContextError::MalformedDefinition {
            name: "a..b".to_string(),
            reason: "empty path segment",
        };
        assert!(!err.is_scope_violation());
        assert!(err.to_string().contains("\"a..b\""));
    }

    #[test]
    fn test_broken_names_context() {
        let err = ContextError::Broken {
            context: ContextId(9),
        };
        assert!(err.is_scope_violation());
        assert_eq!(
            err.to_string(),
            "context ctx-9 is broken by an earlier scope violation"
        );
    }

    #[test]
    fn test_persistence_wraps_source() {
        let err = ContextError::Persistence(anyhow::anyhow!("disk full"));
        assert_eq!(err.to_string(), "result store failure: disk full");
        assert!(std::error::Error::source(&err).is_some());
    }
}
