use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::{trace, warn};

use super::error::DispatchError;
use super::synthetic_event::SyntheticEvent;

static NEXT_DISPATCHER_ID: AtomicU32 = AtomicU32::new(1);

/// Identity used to match handlers against the dispatcher that owns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DispatcherId(u32);

impl DispatcherId {
    pub fn next() -> Self {
        Self(NEXT_DISPATCHER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DispatcherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Contract shared by every dispatcher kind.
///
/// `activate` and `deactivate` are reference counted: N activations need N
/// deactivations before the dispatcher lets go of whatever feeds it.
pub trait EventDispatcher {
    fn id(&self) -> DispatcherId;

    fn name(&self) -> &str;

    fn activate(&self);

    fn deactivate(&self);

    fn is_active(&self) -> bool;

    fn dependents(&self) -> &Dependents;

    fn add_dependent(&self, dependent: Rc<dyn DependentDispatcher>) {
        self.dependents().add(dependent);
    }

    fn remove_dependent(&self, id: DispatcherId) -> bool {
        self.dependents().remove(id)
    }

    /// Forward an already constructed synthetic event to every dependent, in
    /// registration order.
    fn dispatch_events_to_dependents(&self, event: &SyntheticEvent) -> Result<(), DispatchError> {
        self.dependents().dispatch(event)
    }
}

/// Dispatcher that is fed synthetic events by another dispatcher.
pub trait DependentDispatcher: EventDispatcher {
    fn receive(&self, event: &SyntheticEvent) -> Result<(), DispatchError>;
}

/// Number of outstanding activators.
#[derive(Debug, Default)]
pub struct ActivationCount {
    count: Cell<usize>,
}

impl ActivationCount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> usize {
        self.count.get()
    }

    /// Returns `true` on the transition from zero to one.
    pub fn increment(&self) -> bool {
        let previous = self.count.get();
        self.count.set(previous + 1);
        previous == 0
    }

    /// Returns `true` on the transition from one to zero. Unbalanced calls are
    /// ignored.
    pub fn decrement(&self) -> bool {
        match self.count.get() {
            0 => {
                warn!(target: "events", "deactivate called on an inactive dispatcher");
                false
            }
            previous => {
                self.count.set(previous - 1);
                previous == 1
            }
        }
    }
}

/// Ordered set of dependents, deduplicated by dispatcher id.
#[derive(Default)]
pub struct Dependents {
    entries: RefCell<Vec<Rc<dyn DependentDispatcher>>>,
}

impl Dependents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, dependent: Rc<dyn DependentDispatcher>) {
        let mut entries = self.entries.borrow_mut();
        if entries.iter().any(|entry| entry.id() == dependent.id()) {
            return;
        }
        trace!(target: "events", dependent = dependent.name(), "dependent attached");
        entries.push(dependent);
    }

    pub fn remove(&self, id: DispatcherId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|entry| entry.id() != id);
        before != entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn dispatch(&self, event: &SyntheticEvent) -> Result<(), DispatchError> {
        // Dependents may attach or detach while receiving.
        let snapshot: Vec<_> = self.entries.borrow().iter().cloned().collect();
        for dependent in snapshot {
            dependent.receive(event)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Dependents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.borrow().iter().map(|entry| entry.name().to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NativeEvent;

    #[test]
    fn activation_count_reports_transitions() {
        let count = ActivationCount::new();
        assert!(count.increment());
        assert!(!count.increment());
        assert!(!count.decrement());
        assert!(count.decrement());
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn unbalanced_decrement_is_ignored() {
        let count = ActivationCount::new();
        assert!(!count.decrement());
        assert_eq!(count.get(), 0);
        assert!(count.increment());
    }

    #[test]
    fn dispatcher_ids_are_unique() {
        let a = DispatcherId::next();
        let b = DispatcherId::next();
        assert_ne!(a, b);
    }

    struct Recorder {
        id: DispatcherId,
        name: String,
        dependents: Dependents,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Recorder {
        fn new(name: &str, log: &Rc<RefCell<Vec<String>>>) -> Rc<Self> {
            Rc::new(Self {
                id: DispatcherId::next(),
                name: name.to_string(),
                dependents: Dependents::new(),
                log: Rc::clone(log),
            })
        }
    }

    impl EventDispatcher for Recorder {
        fn id(&self) -> DispatcherId {
            self.id
        }

        fn name(&self) -> &str {
            &self.name
        }

        fn activate(&self) {}

        fn deactivate(&self) {}

        fn is_active(&self) -> bool {
            true
        }

        fn dependents(&self) -> &Dependents {
            &self.dependents
        }
    }

    impl DependentDispatcher for Recorder {
        fn receive(&self, event: &SyntheticEvent) -> Result<(), DispatchError> {
            self.log
                .borrow_mut()
                .push(format!("{}:{}", self.name, event.native_event().name()));
            Ok(())
        }
    }

    #[test]
    fn dependents_receive_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = Recorder::new("first", &log);
        let second = Recorder::new("second", &log);

        let dependents = Dependents::new();
        dependents.add(first.clone());
        dependents.add(second.clone());
        dependents.add(first.clone());
        assert_eq!(dependents.len(), 2);

        let native = Rc::new(NativeEvent::new("click", 0));
        let event = SyntheticEvent::new(native, 0);
        dependents.dispatch(&event).unwrap();
        assert_eq!(*log.borrow(), vec!["first:click", "second:click"]);

        assert!(dependents.remove(first.id()));
        assert!(!dependents.remove(first.id()));
        assert_eq!(dependents.len(), 1);
    }
}
