use tracing::trace;

use super::error::DispatchError;
use super::synthetic_event::SyntheticEvent;
use super::traverse::DispatchTarget;

/// Deliver `event` to `targets` (closest node first).
///
/// Capture handlers run first, root to origin. Then bubbling kinds walk the
/// remaining handlers outwards, while target-only kinds only reach handlers on
/// the origin node. Stop-propagation is checked before every handler and a failing
/// handler ends the cycle.
pub fn dispatch_event(
    targets: &[DispatchTarget],
    event: &SyntheticEvent,
    bubbles: bool,
) -> Result<(), DispatchError> {
    let result = deliver(targets, event, bubbles);
    event.set_current_target(None);
    result
}

fn deliver(
    targets: &[DispatchTarget],
    event: &SyntheticEvent,
    bubbles: bool,
) -> Result<(), DispatchError> {
    // Nodes root first, handlers of one node in attachment order.
    let capturing = targets
        .chunk_by(|a, b| a.node == b.node)
        .rev()
        .flatten()
        .filter(|t| t.handler.is_capture());
    for target in capturing {
        if event.is_propagation_stopped() {
            return Ok(());
        }
        invoke(target, event)?;
    }

    for target in targets.iter().filter(|t| !t.handler.is_capture()) {
        if !bubbles && target.node != event.target() {
            break;
        }
        if event.is_propagation_stopped() {
            trace!(target: "events", node = target.node, "propagation stopped");
            return Ok(());
        }
        invoke(target, event)?;
    }
    Ok(())
}

fn invoke(target: &DispatchTarget, event: &SyntheticEvent) -> Result<(), DispatchError> {
    event.set_current_target(Some(target.node));
    target
        .handler
        .invoke(event)
        .map_err(|source| DispatchError::Handler {
            event: event.native_event().name().to_string(),
            node: target.node,
            source,
        })
}
