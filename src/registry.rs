use std::collections::BTreeMap;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{DelegationConfig, DispatcherConfig};
use crate::events::{
    DerivedEventDispatcher, EventDispatcher, NativeEventDispatcher, NativeEventDispatcherFlags,
    SyntheticEvent,
};
use crate::host::HostEnvironment;

const BUBBLES: NativeEventDispatcherFlags = NativeEventDispatcherFlags::BUBBLES;
const CAPTURE: NativeEventDispatcherFlags = NativeEventDispatcherFlags::CAPTURE;
const PASSIVE: NativeEventDispatcherFlags = NativeEventDispatcherFlags::PASSIVE;

/// Native event kinds delegated out of the box.
const STANDARD_EVENTS: &[(&str, NativeEventDispatcherFlags)] = &[
    ("click", BUBBLES),
    ("dblclick", BUBBLES),
    ("mousedown", BUBBLES),
    ("mouseup", BUBBLES),
    ("mousemove", BUBBLES),
    ("mouseover", BUBBLES),
    ("mouseout", BUBBLES),
    ("keydown", BUBBLES),
    ("keyup", BUBBLES),
    ("keypress", BUBBLES),
    ("input", BUBBLES),
    ("change", BUBBLES),
    ("submit", BUBBLES),
    ("focus", CAPTURE),
    ("blur", CAPTURE),
    ("scroll", CAPTURE.union(PASSIVE)),
    ("wheel", BUBBLES.union(PASSIVE)),
    ("touchstart", BUBBLES.union(PASSIVE)),
    ("touchmove", BUBBLES.union(PASSIVE)),
    ("touchend", BUBBLES.union(PASSIVE)),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("event kind {0} is in use and cannot be replaced")]
    InUse(String),
    #[error("unknown source event kind {0}")]
    UnknownSource(String),
}

/// One dispatcher per event kind, created once and shared by every node that
/// handles that kind.
pub struct EventDispatchers {
    environment: HostEnvironment,
    native: BTreeMap<String, Rc<NativeEventDispatcher>>,
    derived: BTreeMap<String, Rc<DerivedEventDispatcher>>,
}

impl EventDispatchers {
    pub fn new(environment: HostEnvironment) -> Self {
        let mut dispatchers = Self {
            environment,
            native: BTreeMap::new(),
            derived: BTreeMap::new(),
        };
        for (name, flags) in STANDARD_EVENTS {
            let dispatcher =
                NativeEventDispatcher::new(*name, *flags, dispatchers.environment.clone());
            dispatchers.native.insert(name.to_string(), dispatcher);
        }
        dispatchers
    }

    /// Standard kinds plus the ones listed in `config`. A configured kind with a
    /// standard name replaces the standard flags.
    pub fn from_config(
        environment: HostEnvironment,
        config: &DelegationConfig,
    ) -> Result<Self, RegistryError> {
        let mut dispatchers = Self::new(environment);
        for entry in &config.dispatchers {
            dispatchers.register(entry)?;
        }
        Ok(dispatchers)
    }

    /// Register a native kind. An existing kind of the same name is replaced
    /// only while nothing uses it.
    pub fn register(
        &mut self,
        config: &DispatcherConfig,
    ) -> Result<Rc<NativeEventDispatcher>, RegistryError> {
        let name = config.name.as_str();
        let flags = config.flags();
        self.release(name)?;
        let dispatcher = NativeEventDispatcher::new(name, flags, self.environment.clone());
        debug!(target: "events", event = name, ?flags, "registered dispatcher");
        self.native.insert(name.to_string(), Rc::clone(&dispatcher));
        Ok(dispatcher)
    }

    /// Register a kind synthesized from `source`. Same replacement rule as
    /// [`EventDispatchers::register`].
    pub fn derive<F>(
        &mut self,
        name: &str,
        source: &str,
        bubbles: bool,
        derive: F,
    ) -> Result<Rc<DerivedEventDispatcher>, RegistryError>
    where
        F: Fn(&SyntheticEvent) -> Option<SyntheticEvent> + 'static,
    {
        let source = self
            .get(source)
            .ok_or_else(|| RegistryError::UnknownSource(source.to_string()))?;
        // A kind cannot be replaced by one derived from itself.
        if source.name() == name {
            return Err(RegistryError::InUse(name.to_string()));
        }
        self.release(name)?;
        let dispatcher = DerivedEventDispatcher::new(
            name,
            bubbles,
            source,
            Rc::clone(&self.environment.tree),
            derive,
        );
        debug!(
            target: "events",
            event = name,
            source = dispatcher.source().name(),
            "registered derived dispatcher"
        );
        self.derived.insert(name.to_string(), Rc::clone(&dispatcher));
        Ok(dispatcher)
    }

    /// Drop the dispatcher registered as `name`, if any. Fails while it is
    /// active, still holds its root listener, or feeds a derived kind.
    fn release(&mut self, name: &str) -> Result<(), RegistryError> {
        let Some(existing) = self.get(name) else {
            return Ok(());
        };
        let listening = self
            .native
            .get(name)
            .is_some_and(|native| native.is_listening());
        let feeds_derived = self
            .derived
            .values()
            .any(|derived| derived.source().id() == existing.id());
        if existing.is_active() || listening || feeds_derived {
            warn!(target: "events", event = name, "refusing to replace dispatcher in use");
            return Err(RegistryError::InUse(name.to_string()));
        }
        debug!(target: "events", event = name, "replacing idle dispatcher");
        self.native.remove(name);
        self.derived.remove(name);
        Ok(())
    }

    /// Dispatcher for `name`, native kinds first.
    pub fn get(&self, name: &str) -> Option<Rc<dyn EventDispatcher>> {
        if let Some(native) = self.native.get(name) {
            return Some(Rc::clone(native) as Rc<dyn EventDispatcher>);
        }
        self.derived
            .get(name)
            .map(|derived| Rc::clone(derived) as Rc<dyn EventDispatcher>)
    }

    pub fn native(&self, name: &str) -> Option<Rc<NativeEventDispatcher>> {
        self.native.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.native.keys().chain(self.derived.keys()).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.native.len() + self.derived.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn environment(&self) -> &HostEnvironment {
        &self.environment
    }
}
