//! In-memory document used as the host when no real DOM is attached: it keeps
//! the node tree, the handlers attached to each node and the listeners
//! installed at the root.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use thiserror::Error;
use tracing::trace;

use crate::events::{DispatchError, DispatcherId, EventDispatcher, EventHandler, NativeEvent};
use crate::features::CapabilityProbe;
use crate::host::{ListenerHost, ListenerOptions, NativeListener, NodeId, NodeTree};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
}

#[derive(Debug)]
struct Node {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    handlers: Vec<EventHandler>,
}

#[derive(Debug, Clone)]
struct RegisteredListener {
    name: String,
    listener: NativeListener,
    options: ListenerOptions,
}

pub struct Document {
    nodes: RefCell<Vec<Node>>,
    listeners: RefCell<Vec<RegisteredListener>>,
    add_listener_calls: Cell<usize>,
    remove_listener_calls: Cell<usize>,
    passive_supported: bool,
}

impl Document {
    pub const ROOT: NodeId = 0;

    pub fn new(root_tag: &str) -> Rc<Self> {
        Self::with_passive_support(root_tag, true)
    }

    pub fn with_passive_support(root_tag: &str, passive_supported: bool) -> Rc<Self> {
        Rc::new(Self {
            nodes: RefCell::new(vec![Node {
                tag: root_tag.to_string(),
                parent: None,
                children: Vec::new(),
                handlers: Vec::new(),
            }]),
            listeners: RefCell::new(Vec::new()),
            add_listener_calls: Cell::new(0),
            remove_listener_calls: Cell::new(0),
            passive_supported,
        })
    }

    pub fn append_child(&self, parent: NodeId, tag: &str) -> Result<NodeId, DocumentError> {
        let mut nodes = self.nodes.borrow_mut();
        if parent >= nodes.len() {
            return Err(DocumentError::UnknownNode(parent));
        }
        let id = nodes.len();
        nodes.push(Node {
            tag: tag.to_string(),
            parent: Some(parent),
            children: Vec::new(),
            handlers: Vec::new(),
        });
        nodes[parent].children.push(id);
        Ok(id)
    }

    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.nodes.borrow().get(node).map(|n| n.tag.clone())
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .borrow()
            .get(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Ancestor chain from `node` to the root, inclusive.
    pub fn node_chain(&self, node: NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut chain = Vec::new();
        let mut current = nodes.get(node).map(|_| node);
        while let Some(id) = current {
            chain.push(id);
            current = nodes[id].parent;
        }
        chain
    }

    /// Attach `handler` to `node` and activate its dispatcher.
    pub fn attach_handler(&self, node: NodeId, handler: EventHandler) -> Result<(), DocumentError> {
        let dispatcher = Rc::clone(handler.dispatcher());
        {
            let mut nodes = self.nodes.borrow_mut();
            let entry = nodes
                .get_mut(node)
                .ok_or(DocumentError::UnknownNode(node))?;
            entry.handlers.push(handler);
        }
        dispatcher.activate();
        Ok(())
    }

    /// Detach the handlers of `dispatcher` from `node`, deactivating once per
    /// removed handler. Returns how many were removed.
    pub fn detach_handlers(
        &self,
        node: NodeId,
        dispatcher: DispatcherId,
    ) -> Result<usize, DocumentError> {
        let removed = self.take_handlers(node, |handler| handler.matches(dispatcher))?;
        let count = removed.len();
        for handler in removed {
            handler.dispatcher().deactivate();
        }
        Ok(count)
    }

    /// Detach every handler from `node`, as an unmount would.
    pub fn detach_all_handlers(&self, node: NodeId) -> Result<usize, DocumentError> {
        let removed = self.take_handlers(node, |_| true)?;
        let count = removed.len();
        for handler in removed {
            handler.dispatcher().deactivate();
        }
        Ok(count)
    }

    fn take_handlers<P>(&self, node: NodeId, predicate: P) -> Result<Vec<EventHandler>, DocumentError>
    where
        P: Fn(&EventHandler) -> bool,
    {
        let mut nodes = self.nodes.borrow_mut();
        let entry = nodes
            .get_mut(node)
            .ok_or(DocumentError::UnknownNode(node))?;
        let (removed, kept): (Vec<EventHandler>, Vec<EventHandler>) =
            entry.handlers.drain(..).partition(|h| predicate(h));
        entry.handlers = kept;
        Ok(removed)
    }

    /// Deliver a native event to the listeners installed for its name, capture
    /// listeners first. The first failure is returned.
    pub fn fire(&self, event: NativeEvent) -> Result<(), DispatchError> {
        let event = Rc::new(event);
        let mut snapshot: Vec<RegisteredListener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|entry| entry.name == event.name())
            .cloned()
            .collect();
        snapshot.sort_by_key(|entry| !entry.options.capture);

        trace!(target: "events", event = event.name(), target_node = event.target(), listeners = snapshot.len(), "firing native event");
        for entry in snapshot {
            entry.listener.call(&event)?;
        }
        Ok(())
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|entry| entry.name == name)
            .count()
    }

    pub fn listener_options(&self, name: &str) -> Option<ListenerOptions> {
        self.listeners
            .borrow()
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.options)
    }

    /// Number of `add_event_listener` calls received so far.
    pub fn add_listener_calls(&self) -> usize {
        self.add_listener_calls.get()
    }

    pub fn remove_listener_calls(&self) -> usize {
        self.remove_listener_calls.get()
    }
}

impl ListenerHost for Document {
    fn add_event_listener(&self, name: &str, listener: &NativeListener, options: ListenerOptions) {
        self.add_listener_calls.set(self.add_listener_calls.get() + 1);
        let mut listeners = self.listeners.borrow_mut();
        let duplicate = listeners.iter().any(|entry| {
            entry.name == name
                && entry.options.capture == options.capture
                && entry.listener.same(listener)
        });
        if !duplicate {
            listeners.push(RegisteredListener {
                name: name.to_string(),
                listener: listener.clone(),
                options,
            });
        }
    }

    fn remove_event_listener(&self, name: &str, listener: &NativeListener, options: ListenerOptions) {
        self.remove_listener_calls
            .set(self.remove_listener_calls.get() + 1);
        self.listeners.borrow_mut().retain(|entry| {
            !(entry.name == name
                && entry.options.capture == options.capture
                && entry.listener.same(listener))
        });
    }
}

impl NodeTree for Document {
    fn root(&self) -> NodeId {
        Self::ROOT
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.borrow().get(node)?.parent
    }

    fn handlers(&self, node: NodeId) -> Vec<EventHandler> {
        self.nodes
            .borrow()
            .get(node)
            .map(|n| n.handlers.clone())
            .unwrap_or_default()
    }
}

impl CapabilityProbe for Document {
    fn supports_passive_listeners(&self) -> bool {
        self.passive_supported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_ancestor_chain() {
        let document = Document::new("html");
        let body = document.append_child(Document::ROOT, "body").unwrap();
        let form = document.append_child(body, "form").unwrap();
        let button = document.append_child(form, "button").unwrap();

        assert_eq!(document.node_chain(button), vec![button, form, body, Document::ROOT]);
        assert_eq!(document.parent(button), Some(form));
        assert_eq!(document.parent(Document::ROOT), None);
        assert_eq!(document.children(body), vec![form]);
        assert_eq!(document.tag(form).as_deref(), Some("form"));
    }

    #[test]
    fn rejects_unknown_parent() {
        let document = Document::new("html");
        assert_eq!(
            document.append_child(42, "div"),
            Err(DocumentError::UnknownNode(42))
        );
    }

    #[test]
    fn duplicate_listeners_are_ignored() {
        let document = Document::new("html");
        let listener = NativeListener::new(|_| Ok(()));
        let options = ListenerOptions::default();

        document.add_event_listener("click", &listener, options);
        document.add_event_listener("click", &listener, options);
        assert_eq!(document.listener_count("click"), 1);
        assert_eq!(document.add_listener_calls(), 2);

        document.remove_event_listener("click", &listener, options);
        assert_eq!(document.listener_count("click"), 0);
        assert_eq!(document.remove_listener_calls(), 1);
    }

    #[test]
    fn fires_capture_listeners_first() {
        let document = Document::new("html");
        let order = Rc::new(RefCell::new(Vec::new()));

        let bubble_order = Rc::clone(&order);
        let bubble = NativeListener::new(move |_| {
            bubble_order.borrow_mut().push("bubble");
            Ok(())
        });
        let capture_order = Rc::clone(&order);
        let capture = NativeListener::new(move |_| {
            capture_order.borrow_mut().push("capture");
            Ok(())
        });

        document.add_event_listener("focus", &bubble, ListenerOptions::default());
        document.add_event_listener(
            "focus",
            &capture,
            ListenerOptions {
                capture: true,
                passive: false,
            },
        );

        document.fire(NativeEvent::new("focus", Document::ROOT)).unwrap();
        document.fire(NativeEvent::new("blur", Document::ROOT)).unwrap();
        assert_eq!(*order.borrow(), vec!["capture", "bubble"]);
    }
}
