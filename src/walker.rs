//! Reference tree walker
//!
//! Drives a [`Context`] over a tree the way an evaluator is expected to:
//! every node is bracketed by interpret enter/leave, and a block additionally
//! opens its own scope with block enter/leave inside that bracket. What a
//! node means is left to the `visit` callback.

use crate::context::Context;
use crate::node::TreeNode;
use crate::result::ExecutionRecord;
use crate::value::Variable;
use anyhow::Result;

/// Walk `node` and its subtree, calling `visit` once per non-block node
///
/// The first error (from `visit` or from the context) aborts the walk;
/// leave events for the nodes still open are not emitted.
pub fn walk<N, F>(ctx: &mut Context<N>, node: &N, visit: &mut F) -> Result<()>
where
    N: TreeNode,
    F: FnMut(&mut Context<N>, &N) -> Result<()>,
{
    ctx.interpret_enter(node)?;
    if node.is_block() {
        ctx.block_enter(node)?;
        walk_children(ctx, node, visit)?;
        ctx.block_leave(node)?;
    } else {
        visit(ctx, node)?;
        walk_children(ctx, node, visit)?;
    }
    ctx.interpret_leave(node)?;
    Ok(())
}

fn walk_children<N, F>(ctx: &mut Context<N>, node: &N, visit: &mut F) -> Result<()>
where
    N: TreeNode,
    F: FnMut(&mut Context<N>, &N) -> Result<()>,
{
    let children = ctx.get_children(node);
    for child in children.iter() {
        walk(ctx, child, visit)?;
    }
    Ok(())
}

/// Run a whole program: bind arguments, walk `root`, finish the context
pub fn run_program<N, F, I>(
    mut ctx: Context<N>,
    root: &N,
    arguments: I,
    mut visit: F,
) -> Result<ExecutionRecord>
where
    N: TreeNode,
    F: FnMut(&mut Context<N>, &N) -> Result<()>,
    I: IntoIterator<Item = (String, Variable)>,
{
    ctx.bind_arguments(arguments)?;
    walk(&mut ctx, root, &mut visit)?;
    Ok(ctx.finish()?)
}
