use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::host::NodeId;

/// Event as delivered by the host. The payload is never inspected here; synthetic
/// event factories may downcast it.
#[derive(Clone)]
pub struct NativeEvent {
    name: String,
    target: NodeId,
    timestamp: f64,
    payload: Option<Rc<dyn Any>>,
}

impl NativeEvent {
    pub fn new(name: impl Into<String>, target: NodeId) -> Self {
        Self {
            name: name.into(),
            target,
            timestamp: 0.0,
            payload: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_payload<T: Any>(mut self, payload: T) -> Self {
        self.payload = Some(Rc::new(payload));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Origin node of the event.
    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn downcast_payload<T: Any>(&self) -> Option<&T> {
        self.payload.as_deref()?.downcast_ref::<T>()
    }
}

impl fmt::Debug for NativeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeEvent")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("timestamp", &self.timestamp)
            .field("has_payload", &self.payload.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Pointer {
        x: f64,
        y: f64,
    }

    #[test]
    fn downcasts_matching_payload() {
        let event = NativeEvent::new("click", 3).with_payload(Pointer { x: 1.0, y: 2.0 });
        assert_eq!(
            event.downcast_payload::<Pointer>(),
            Some(&Pointer { x: 1.0, y: 2.0 })
        );
        assert!(event.downcast_payload::<String>().is_none());
    }

    #[test]
    fn missing_payload_is_none() {
        let event = NativeEvent::new("keydown", 0);
        assert!(event.downcast_payload::<Pointer>().is_none());
        assert_eq!(event.target(), 0);
    }
}
