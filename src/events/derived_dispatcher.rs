use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use super::dispatch::dispatch_event;
use super::dispatcher::{
    ActivationCount, Dependents, DependentDispatcher, DispatcherId, EventDispatcher,
};
use super::error::DispatchError;
use super::synthetic_event::SyntheticEvent;
use super::traverse::accumulate_dispatch_targets;
use crate::host::NodeTree;

pub type DeriveFn = Rc<dyn Fn(&SyntheticEvent) -> Option<SyntheticEvent>>;

/// Higher level event kind synthesized from another dispatcher's events. It
/// installs nothing itself: while active it is a dependent of its source and
/// keeps the source active.
pub struct DerivedEventDispatcher {
    this: Weak<Self>,
    id: DispatcherId,
    name: String,
    bubbles: bool,
    source: Rc<dyn EventDispatcher>,
    derive: DeriveFn,
    tree: Rc<dyn NodeTree>,
    activations: ActivationCount,
    dependents: Dependents,
}

impl DerivedEventDispatcher {
    pub fn new<F>(
        name: impl Into<String>,
        bubbles: bool,
        source: Rc<dyn EventDispatcher>,
        tree: Rc<dyn NodeTree>,
        derive: F,
    ) -> Rc<Self>
    where
        F: Fn(&SyntheticEvent) -> Option<SyntheticEvent> + 'static,
    {
        let name = name.into();
        Rc::new_cyclic(|weak: &Weak<Self>| Self {
            this: weak.clone(),
            id: DispatcherId::next(),
            name,
            bubbles,
            source,
            derive: Rc::new(derive),
            tree,
            activations: ActivationCount::new(),
            dependents: Dependents::new(),
        })
    }

    pub fn source(&self) -> &Rc<dyn EventDispatcher> {
        &self.source
    }

    pub fn activation_count(&self) -> usize {
        self.activations.get()
    }
}

impl EventDispatcher for DerivedEventDispatcher {
    fn id(&self) -> DispatcherId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn activate(&self) {
        if !self.activations.increment() {
            return;
        }
        if let Some(this) = self.this.upgrade() {
            debug!(target: "events", event = %self.name, source = self.source.name(), "attaching to source");
            self.source.add_dependent(this);
            self.source.activate();
        }
    }

    fn deactivate(&self) {
        if !self.activations.decrement() {
            return;
        }
        debug!(target: "events", event = %self.name, source = self.source.name(), "detaching from source");
        self.source.remove_dependent(self.id);
        self.source.deactivate();
    }

    fn is_active(&self) -> bool {
        self.activations.get() > 0
    }

    fn dependents(&self) -> &Dependents {
        &self.dependents
    }
}

impl DependentDispatcher for DerivedEventDispatcher {
    fn receive(&self, event: &SyntheticEvent) -> Result<(), DispatchError> {
        let Some(derived) = (self.derive)(event) else {
            return Ok(());
        };

        let targets = accumulate_dispatch_targets(self.tree.as_ref(), derived.target(), self.id);
        trace!(target: "events", event = %self.name, targets = targets.len(), "derived event");
        if !targets.is_empty() {
            dispatch_event(&targets, &derived, self.bubbles)?;
        }

        self.dispatch_events_to_dependents(&derived)
    }
}

/// Derive function forwarding the source event with fresh propagation state.
pub fn passthrough() -> impl Fn(&SyntheticEvent) -> Option<SyntheticEvent> {
    |event: &SyntheticEvent| Some(SyntheticEvent::new(Rc::clone(event.native_rc()), event.target()))
}
