use std::fmt;
use std::rc::Rc;

use super::dispatcher::{DispatcherId, EventDispatcher};
use super::flags::EventHandlerFlags;
use super::synthetic_event::SyntheticEvent;

pub type EventCallback = Rc<dyn Fn(&SyntheticEvent) -> anyhow::Result<()>>;

/// Handler attached to a node by the rendering layer. The dispatcher reference
/// is what traversal matches against.
#[derive(Clone)]
pub struct EventHandler {
    dispatcher: Rc<dyn EventDispatcher>,
    flags: EventHandlerFlags,
    callback: EventCallback,
}

impl EventHandler {
    pub fn new<F>(dispatcher: Rc<dyn EventDispatcher>, callback: F) -> Self
    where
        F: Fn(&SyntheticEvent) -> anyhow::Result<()> + 'static,
    {
        Self {
            dispatcher,
            flags: EventHandlerFlags::empty(),
            callback: Rc::new(callback),
        }
    }

    /// Same as [`EventHandler::new`] but runs in the capture phase.
    pub fn capture<F>(dispatcher: Rc<dyn EventDispatcher>, callback: F) -> Self
    where
        F: Fn(&SyntheticEvent) -> anyhow::Result<()> + 'static,
    {
        Self {
            flags: EventHandlerFlags::CAPTURE,
            ..Self::new(dispatcher, callback)
        }
    }

    pub fn dispatcher(&self) -> &Rc<dyn EventDispatcher> {
        &self.dispatcher
    }

    pub fn flags(&self) -> EventHandlerFlags {
        self.flags
    }

    pub fn is_capture(&self) -> bool {
        self.flags.contains(EventHandlerFlags::CAPTURE)
    }

    pub fn matches(&self, dispatcher: DispatcherId) -> bool {
        self.dispatcher.id() == dispatcher
    }

    pub(crate) fn invoke(&self, event: &SyntheticEvent) -> anyhow::Result<()> {
        (self.callback)(event)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("dispatcher", &self.dispatcher.name())
            .field("flags", &self.flags)
            .finish()
    }
}
