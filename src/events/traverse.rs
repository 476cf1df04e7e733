use tracing::trace;

use super::dispatcher::DispatcherId;
use super::handler::EventHandler;
use crate::host::{NodeId, NodeTree};

/// Handler found on the path from the origin node to the root.
#[derive(Debug, Clone)]
pub struct DispatchTarget {
    pub node: NodeId,
    pub handler: EventHandler,
}

/// Collect handlers registered for `dispatcher` from `origin` up to the root
/// (inclusive), closest node first. Handlers on one node keep attachment order.
pub fn accumulate_dispatch_targets(
    tree: &dyn NodeTree,
    origin: NodeId,
    dispatcher: DispatcherId,
) -> Vec<DispatchTarget> {
    let root = tree.root();
    let mut targets = Vec::new();
    let mut node = origin;
    let mut depth = 0usize;

    loop {
        targets.extend(
            tree.handlers(node)
                .into_iter()
                .filter(|handler| handler.matches(dispatcher))
                .map(|handler| DispatchTarget { node, handler }),
        );
        depth += 1;

        if node == root {
            break;
        }
        match tree.parent(node) {
            Some(parent) => node = parent,
            None => break,
        }
    }

    trace!(target: "events", %dispatcher, origin, depth, found = targets.len(), "accumulated dispatch targets");
    targets
}
