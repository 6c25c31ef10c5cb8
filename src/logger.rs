//! Trace logging observer
//!
//! Reports statement enter/leave events as `tracing` lines, indented by frame
//! depth. It only ever sees the event payload, never the context itself.

use crate::events::{EventKind, LifecycleEvent, Observer};
use crate::node::TreeNode;
use std::cell::Cell;
use std::rc::Rc;

/// Observer that emits one trace line per statement event
///
/// Clones share the same counter, so a handle kept by the caller can read
/// how many events the subscribed copy has reported.
#[derive(Debug, Clone, Default)]
pub struct TraceLogger {
    reported: Rc<Cell<u64>>,
}

impl TraceLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events reported so far
    pub fn reported(&self) -> u64 {
        self.reported.get()
    }
}

impl<N: TreeNode> Observer<N> for TraceLogger {
    fn notify(&mut self, event: &LifecycleEvent<'_, N>) {
        let indent = "  ".repeat(event.depth.saturating_sub(1));
        match event.kind {
            EventKind::InterpretEnter => tracing::info!(
                context = %event.context,
                depth = event.depth,
                "{}-> {}",
                indent,
                event.node.describe()
            ),
            EventKind::InterpretLeave => tracing::info!(
                context = %event.context,
                depth = event.depth,
                "{}<- {}",
                indent,
                event.node.describe()
            ),
            // Only subscribed to statement events; anything else is noise
            EventKind::BlockEnter | EventKind::BlockLeave => return,
        }
        self.reported.set(self.reported.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ContextId;
    use crate::node::Node;

    #[test]
    fn test_counts_statement_events_only() {
        let handle = TraceLogger::new();
        let mut logger = handle.clone();
        let node = Node::statement("x = 1");
        let context = ContextId::next();

        for kind in EventKind::ALL {
            logger.notify(&LifecycleEvent {
                kind,
                node: &*node,
                context,
                depth: 1,
            });
        }

        assert_eq!(handle.reported(), 2);
    }
}
