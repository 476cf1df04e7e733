use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use super::flags::SyntheticEventFlags;
use super::native_event::NativeEvent;
use crate::host::NodeId;

/// Builds the synthetic event for one dispatch cycle from the native event and
/// its resolved origin node.
pub type SyntheticEventFactory = Rc<dyn Fn(&Rc<NativeEvent>, NodeId) -> SyntheticEvent>;

/// Event object shared by reference with every handler of a dispatch cycle and
/// with dependent dispatchers.
pub struct SyntheticEvent {
    flags: Cell<SyntheticEventFlags>,
    native: Rc<NativeEvent>,
    target: NodeId,
    current_target: Cell<Option<NodeId>>,
    detail: Option<Rc<dyn Any>>,
}

impl SyntheticEvent {
    pub fn new(native: Rc<NativeEvent>, target: NodeId) -> Self {
        Self {
            flags: Cell::new(SyntheticEventFlags::empty()),
            native,
            target,
            current_target: Cell::new(None),
            detail: None,
        }
    }

    /// Factory producing plain synthetic events.
    pub fn factory() -> SyntheticEventFactory {
        Rc::new(|native: &Rc<NativeEvent>, target: NodeId| {
            SyntheticEvent::new(Rc::clone(native), target)
        })
    }

    /// Attach kind-specific data, used by derived dispatchers.
    pub fn with_detail<T: Any>(mut self, detail: T) -> Self {
        self.detail = Some(Rc::new(detail));
        self
    }

    pub fn detail<T: Any>(&self) -> Option<&T> {
        self.detail.as_deref()?.downcast_ref::<T>()
    }

    pub fn native_event(&self) -> &NativeEvent {
        &self.native
    }

    pub fn native_rc(&self) -> &Rc<NativeEvent> {
        &self.native
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Node whose handler is currently running.
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target.get()
    }

    pub(crate) fn set_current_target(&self, node: Option<NodeId>) {
        self.current_target.set(node);
    }

    pub fn flags(&self) -> SyntheticEventFlags {
        self.flags.get()
    }

    pub fn stop_propagation(&self) {
        self.flags
            .set(self.flags.get() | SyntheticEventFlags::STOPPED_PROPAGATION);
    }

    pub fn prevent_default(&self) {
        self.flags
            .set(self.flags.get() | SyntheticEventFlags::PREVENTED_DEFAULT);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.flags
            .get()
            .contains(SyntheticEventFlags::STOPPED_PROPAGATION)
    }

    pub fn is_default_prevented(&self) -> bool {
        self.flags
            .get()
            .contains(SyntheticEventFlags::PREVENTED_DEFAULT)
    }
}

impl fmt::Debug for SyntheticEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntheticEvent")
            .field("name", &self.native.name())
            .field("flags", &self.flags.get())
            .field("target", &self.target)
            .field("current_target", &self.current_target.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_mutate_through_shared_reference() {
        let native = Rc::new(NativeEvent::new("click", 1));
        let event = SyntheticEvent::new(native, 1);
        let shared = &event;
        assert!(!shared.is_propagation_stopped());

        shared.stop_propagation();
        shared.prevent_default();

        assert!(event.is_propagation_stopped());
        assert!(event.is_default_prevented());
    }

    #[test]
    fn factory_keeps_native_event_and_target() {
        let native = Rc::new(NativeEvent::new("input", 7));
        let event = (SyntheticEvent::factory())(&native, 7);
        assert_eq!(event.target(), 7);
        assert_eq!(event.native_event().name(), "input");
        assert!(event.current_target().is_none());
    }

    #[test]
    fn detail_is_typed() {
        let native = Rc::new(NativeEvent::new("click", 1));
        let event = SyntheticEvent::new(native, 1).with_detail(2u32);
        assert_eq!(event.detail::<u32>(), Some(&2));
        assert!(event.detail::<i64>().is_none());
    }
}
