//! Lexical scope frames

use crate::node::NodeId;

/// How a frame came to be on the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Opened by a block enter event
    Block,
    /// Opened lazily for a bare statement outside any block
    Implicit,
}

/// One open lexical scope
///
/// A frame carries no bindings of its own; being on the stack is the
/// scoping state. Evaluators needing per-scope locals can key them by depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    kind: FrameKind,
    opened_by: NodeId,
}

impl Frame {
    pub fn block(node: NodeId) -> Self {
        Self {
            kind: FrameKind::Block,
            opened_by: node,
        }
    }

    pub fn implicit(node: NodeId) -> Self {
        Self {
            kind: FrameKind::Implicit,
            opened_by: node,
        }
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    /// The node whose enter event pushed this frame
    pub fn opened_by(&self) -> NodeId {
        self.opened_by
    }

    pub fn is_implicit(&self) -> bool {
        self.kind == FrameKind::Implicit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_kinds() {
        let node = NodeId(7);
        let block = Frame::block(node);
        let implicit = Frame::implicit(node);

        assert_eq!(block.kind(), FrameKind::Block);
        assert!(!block.is_implicit());
        assert!(implicit.is_implicit());
        assert_eq!(implicit.opened_by(), node);
        assert_ne!(block, implicit);
    }
}
