use bitflags::bitflags;

bitflags! {
    /// Static properties of a native event kind.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NativeEventDispatcherFlags: u8 {
        /// Handlers above the origin node receive the event.
        const BUBBLES = 1;
        /// The delegated listener is installed for the capture phase.
        const CAPTURE = 1 << 1;
        /// The listener never prevents the default action and may be passive.
        const PASSIVE = 1 << 2;
    }
}

bitflags! {
    /// Mutable state carried by a synthetic event during one dispatch cycle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SyntheticEventFlags: u8 {
        const STOPPED_PROPAGATION = 1;
        const PREVENTED_DEFAULT = 1 << 1;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventHandlerFlags: u8 {
        /// Run while walking from the root towards the origin node.
        const CAPTURE = 1;
    }
}
