//! Interfaces the delegation core consumes from the host DOM layer.

use std::fmt;
use std::rc::Rc;

use crate::events::{DispatchError, EventHandler, NativeEvent, NativeEventDispatcherFlags};
use crate::features::Features;
use crate::scheduler::MacrotaskScheduler;

/// Node identity, as handed out by the host document.
pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ListenerOptions {
    pub capture: bool,
    pub passive: bool,
}

impl ListenerOptions {
    /// Options for a dispatcher's delegated listener. The passive hint is
    /// dropped when the host does not support it.
    pub fn for_dispatcher(flags: NativeEventDispatcherFlags, features: &Features) -> Self {
        Self {
            capture: flags.contains(NativeEventDispatcherFlags::CAPTURE),
            passive: features.supports_passive_events()
                && flags.contains(NativeEventDispatcherFlags::PASSIVE),
        }
    }
}

/// Callback installed at the delegation root. Compared by identity.
#[derive(Clone)]
pub struct NativeListener(Rc<dyn Fn(&Rc<NativeEvent>) -> Result<(), DispatchError>>);

impl NativeListener {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Rc<NativeEvent>) -> Result<(), DispatchError> + 'static,
    {
        Self(Rc::new(callback))
    }

    pub fn call(&self, event: &Rc<NativeEvent>) -> Result<(), DispatchError> {
        (self.0)(event)
    }

    pub fn same(&self, other: &NativeListener) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl fmt::Debug for NativeListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeListener({:p})", Rc::as_ptr(&self.0))
    }
}

/// Listener registration at the delegation root.
pub trait ListenerHost {
    fn add_event_listener(&self, name: &str, listener: &NativeListener, options: ListenerOptions);

    fn remove_event_listener(&self, name: &str, listener: &NativeListener, options: ListenerOptions);
}

/// Ancestor relation and handler annotations of the rendered tree.
pub trait NodeTree {
    /// Delegation root; traversal never goes past it.
    fn root(&self) -> NodeId;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Handlers attached to `node`, in attachment order.
    fn handlers(&self, node: NodeId) -> Vec<EventHandler>;
}

/// Collaborators injected into every dispatcher at construction.
#[derive(Clone)]
pub struct HostEnvironment {
    pub listeners: Rc<dyn ListenerHost>,
    pub tree: Rc<dyn NodeTree>,
    pub scheduler: Rc<dyn MacrotaskScheduler>,
    pub features: Features,
}

impl HostEnvironment {
    pub fn new(
        listeners: Rc<dyn ListenerHost>,
        tree: Rc<dyn NodeTree>,
        scheduler: Rc<dyn MacrotaskScheduler>,
        features: Features,
    ) -> Self {
        Self {
            listeners,
            tree,
            scheduler,
            features,
        }
    }
}
