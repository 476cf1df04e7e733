use std::cell::Cell;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use super::dispatch::dispatch_event;
use super::dispatcher::{ActivationCount, Dependents, DispatcherId, EventDispatcher};
use super::error::DispatchError;
use super::flags::NativeEventDispatcherFlags;
use super::native_event::NativeEvent;
use super::synthetic_event::{SyntheticEvent, SyntheticEventFactory};
use super::traverse::accumulate_dispatch_targets;
use crate::host::{HostEnvironment, ListenerOptions, NativeListener};

/// Dispatcher bound to one native event name. Owns at most one listener at the
/// delegation root; teardown is deferred by a macrotask so that deactivating
/// and reactivating within one pass never touches the host.
pub struct NativeEventDispatcher {
    this: Weak<Self>,
    id: DispatcherId,
    name: String,
    flags: NativeEventDispatcherFlags,
    event_factory: SyntheticEventFactory,
    environment: HostEnvironment,
    listener: NativeListener,
    activations: ActivationCount,
    dependents: Dependents,
    listening: Cell<bool>,
    deactivating: Cell<bool>,
}

impl NativeEventDispatcher {
    pub fn new(
        name: impl Into<String>,
        flags: NativeEventDispatcherFlags,
        environment: HostEnvironment,
    ) -> Rc<Self> {
        Self::with_factory(name, flags, SyntheticEvent::factory(), environment)
    }

    pub fn with_factory(
        name: impl Into<String>,
        flags: NativeEventDispatcherFlags,
        event_factory: SyntheticEventFactory,
        environment: HostEnvironment,
    ) -> Rc<Self> {
        let name = name.into();
        Rc::new_cyclic(|weak: &Weak<Self>| {
            let dispatcher = weak.clone();
            let listener = NativeListener::new(move |event| match dispatcher.upgrade() {
                Some(dispatcher) => dispatcher.dispatch(event),
                None => Ok(()),
            });
            Self {
                this: weak.clone(),
                id: DispatcherId::next(),
                name,
                flags,
                event_factory,
                environment,
                listener,
                activations: ActivationCount::new(),
                dependents: Dependents::new(),
                listening: Cell::new(false),
                deactivating: Cell::new(false),
            }
        })
    }

    pub fn flags(&self) -> NativeEventDispatcherFlags {
        self.flags
    }

    pub fn bubbles(&self) -> bool {
        self.flags.contains(NativeEventDispatcherFlags::BUBBLES)
    }

    pub fn activation_count(&self) -> usize {
        self.activations.get()
    }

    /// Whether the native listener is installed right now.
    pub fn is_listening(&self) -> bool {
        self.listening.get()
    }

    /// Whether a deferred teardown is pending.
    pub fn is_deactivating(&self) -> bool {
        self.deactivating.get()
    }

    /// The callback installed at the delegation root.
    pub fn listener(&self) -> &NativeListener {
        &self.listener
    }

    fn listener_options(&self) -> ListenerOptions {
        ListenerOptions::for_dispatcher(self.flags, &self.environment.features)
    }

    /// One dispatch cycle for a native event delivered by the host.
    pub fn dispatch(&self, native: &Rc<NativeEvent>) -> Result<(), DispatchError> {
        let origin = native.target();
        let targets =
            accumulate_dispatch_targets(self.environment.tree.as_ref(), origin, self.id);
        let has_dependents = !self.dependents.is_empty();

        if targets.is_empty() && !has_dependents {
            trace!(target: "events", event = %self.name, origin, "no observers, skipping");
            return Ok(());
        }

        let event = (self.event_factory)(native, origin);

        if !targets.is_empty() {
            dispatch_event(&targets, &event, self.bubbles())?;
        }

        self.dispatch_events_to_dependents(&event)
    }

    fn install(&self) {
        debug!(target: "events", event = %self.name, "installing delegated listener");
        self.environment.listeners.add_event_listener(
            &self.name,
            &self.listener,
            self.listener_options(),
        );
        self.listening.set(true);
    }

    fn uninstall(&self) {
        debug!(target: "events", event = %self.name, "removing delegated listener");
        self.environment.listeners.remove_event_listener(
            &self.name,
            &self.listener,
            self.listener_options(),
        );
        self.listening.set(false);
    }

    fn finish_deactivation(&self) {
        if !self.deactivating.get() {
            return;
        }
        self.deactivating.set(false);
        if self.activations.get() == 0 && self.listening.get() {
            self.uninstall();
        }
    }
}

impl EventDispatcher for NativeEventDispatcher {
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
        if self.deactivating.get() {
            // Listener is still installed; the queued teardown becomes a no-op.
            trace!(target: "events", event = %self.name, "pending teardown cancelled");
            self.deactivating.set(false);
            return;
        }
        if !self.listening.get() {
            self.install();
        }
    }

    fn deactivate(&self) {
        if !self.activations.decrement() || self.deactivating.get() {
            return;
        }
        self.deactivating.set(true);

        let weak = self.this.clone();
        self.environment
            .scheduler
            .schedule_macrotask(Box::new(move || {
                if let Some(dispatcher) = weak.upgrade() {
                    dispatcher.finish_deactivation();
                }
            }));
    }

    fn is_active(&self) -> bool {
        self.activations.get() > 0
    }

    fn dependents(&self) -> &Dependents {
        &self.dependents
    }
}
