// Library exports for the delegation core and its in-memory host

pub mod config;
pub mod dom;
pub mod events;
pub mod features;
pub mod host;
pub mod registry;
pub mod scheduler;

// Re-export commonly used types for tests
pub use config::DelegationConfig;
pub use dom::Document;
pub use events::{EventDispatcher, EventHandler, NativeEvent, NativeEventDispatcher, SyntheticEvent};
pub use features::Features;
pub use host::{HostEnvironment, NodeId};
pub use registry::EventDispatchers;
pub use scheduler::{MacrotaskQueue, MacrotaskScheduler, TokioMacrotaskScheduler};
