//! Event delegation: one native listener per event kind at the root, synthetic
//! events routed along the ancestor chain.

mod derived_dispatcher;
mod dispatch;
mod dispatcher;
mod error;
mod flags;
mod handler;
mod native_dispatcher;
mod native_event;
mod synthetic_event;
mod traverse;

pub use derived_dispatcher::{passthrough, DeriveFn, DerivedEventDispatcher};
pub use dispatch::dispatch_event;
pub use dispatcher::{
    ActivationCount, DependentDispatcher, Dependents, DispatcherId, EventDispatcher,
};
pub use error::DispatchError;
pub use flags::{EventHandlerFlags, NativeEventDispatcherFlags, SyntheticEventFlags};
pub use handler::{EventCallback, EventHandler};
pub use native_dispatcher::NativeEventDispatcher;
pub use native_event::NativeEvent;
pub use synthetic_event::{SyntheticEvent, SyntheticEventFactory};
pub use traverse::{accumulate_dispatch_targets, DispatchTarget};
