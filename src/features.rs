//! Host capability flags. Detected once and handed to dispatchers; absent
//! capabilities simply turn the matching option off.

use bitflags::bitflags;
use tracing::debug;

use crate::config::{DelegationConfig, PassiveListenerPolicy};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FeatureFlags: u8 {
        /// Listener options accept `{ passive: true }`, so touch and wheel
        /// listeners do not block scrolling.
        const PASSIVE_EVENTS = 1;
    }
}

/// Probe run against the host when features are detected.
pub trait CapabilityProbe {
    fn supports_passive_listeners(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Features {
    flags: FeatureFlags,
}

impl Features {
    pub fn new(flags: FeatureFlags) -> Self {
        Self { flags }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn detect(probe: &dyn CapabilityProbe) -> Self {
        let mut flags = FeatureFlags::empty();
        if probe.supports_passive_listeners() {
            flags |= FeatureFlags::PASSIVE_EVENTS;
        }
        debug!(target: "events", ?flags, "detected host features");
        Self { flags }
    }

    /// Mask detected flags with the configured policy.
    pub fn with_config(self, config: &DelegationConfig) -> Self {
        let mut flags = self.flags;
        if config.passive_listeners == PassiveListenerPolicy::Never {
            flags.remove(FeatureFlags::PASSIVE_EVENTS);
        }
        Self { flags }
    }

    pub fn flags(&self) -> FeatureFlags {
        self.flags
    }

    pub fn supports_passive_events(&self) -> bool {
        self.flags.contains(FeatureFlags::PASSIVE_EVENTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe(bool);

    impl CapabilityProbe for Probe {
        fn supports_passive_listeners(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn detects_passive_support() {
        assert!(Features::detect(&Probe(true)).supports_passive_events());
        assert!(!Features::detect(&Probe(false)).supports_passive_events());
        assert_eq!(
            Features::detect(&Probe(true)).flags(),
            FeatureFlags::PASSIVE_EVENTS
        );
        assert_eq!(Features::detect(&Probe(false)), Features::none());
    }

    #[test]
    fn config_can_disable_passive_listeners() {
        let config = DelegationConfig {
            passive_listeners: PassiveListenerPolicy::Never,
            ..DelegationConfig::default()
        };
        let features = Features::detect(&Probe(true)).with_config(&config);
        assert!(!features.supports_passive_events());

        let features = Features::detect(&Probe(true)).with_config(&DelegationConfig::default());
        assert!(features.supports_passive_events());
    }
}
