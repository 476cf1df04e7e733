use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::events::NativeEventDispatcherFlags;

pub const CONFIG_ENV_VAR: &str = "FRONTIER_EVENTS_CONFIG";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read event config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("dispatcher entry has an empty event name")]
    EmptyEventName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassiveListenerPolicy {
    /// Use passive listeners when the host supports them.
    #[default]
    Auto,
    Never,
}

/// Extra native event kind to delegate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DispatcherConfig {
    pub name: String,
    #[serde(default = "default_true")]
    pub bubbles: bool,
    #[serde(default)]
    pub capture: bool,
    #[serde(default)]
    pub passive: bool,
}

impl DispatcherConfig {
    pub fn flags(&self) -> NativeEventDispatcherFlags {
        let mut flags = NativeEventDispatcherFlags::empty();
        flags.set(NativeEventDispatcherFlags::BUBBLES, self.bubbles);
        flags.set(NativeEventDispatcherFlags::CAPTURE, self.capture);
        flags.set(NativeEventDispatcherFlags::PASSIVE, self.passive);
        flags
    }
}

fn default_true() -> bool {
    true
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DelegationConfig {
    #[serde(default)]
    pub passive_listeners: PassiveListenerPolicy,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub dispatchers: Vec<DispatcherConfig>,
}

impl Default for DelegationConfig {
    fn default() -> Self {
        Self {
            passive_listeners: PassiveListenerPolicy::Auto,
            log_filter: default_log_filter(),
            dispatchers: Vec::new(),
        }
    }
}

impl DelegationConfig {
    /// Load from `config_path`, falling back to defaults when no file exists.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = match config_path {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(path)?;
                serde_yaml::from_str::<DelegationConfig>(&contents)?
            }
            _ => DelegationConfig::default(),
        };

        if config.dispatchers.iter().any(|d| d.name.trim().is_empty()) {
            return Err(ConfigError::EmptyEventName);
        }
        Ok(config)
    }

    /// Path from `FRONTIER_EVENTS_CONFIG`, else `events.yaml` in the user
    /// config directory.
    pub fn default_path() -> Option<PathBuf> {
        std::env::var(CONFIG_ENV_VAR)
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                ProjectDirs::from("org", "frontier", "frontier-events")
                    .map(|dirs| dirs.config_dir().join("events.yaml"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_default() {
        let config = DelegationConfig::load(None).unwrap();
        assert_eq!(config, DelegationConfig::default());
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let config =
            DelegationConfig::load(Some(PathBuf::from("/nonexistent/events.yaml"))).unwrap();
        assert_eq!(config.passive_listeners, PassiveListenerPolicy::Auto);
    }

    #[test]
    fn loads_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        use std::io::Write;
        writeln!(
            file,
            "passive_listeners: never\nlog_filter: debug\ndispatchers:\n  - name: pointerdown\n  - name: load\n    bubbles: false\n    capture: true"
        )
        .unwrap();

        let config = DelegationConfig::load(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.passive_listeners, PassiveListenerPolicy::Never);
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.dispatchers.len(), 2);
        assert_eq!(
            config.dispatchers[0].flags(),
            NativeEventDispatcherFlags::BUBBLES
        );
        assert_eq!(
            config.dispatchers[1].flags(),
            NativeEventDispatcherFlags::CAPTURE
        );
    }

    #[test]
    fn rejects_empty_event_name() {
        let mut file = NamedTempFile::new().unwrap();
        use std::io::Write;
        writeln!(file, "dispatchers:\n  - name: \"  \"").unwrap();
        assert!(matches!(
            DelegationConfig::load(Some(file.path().to_path_buf())),
            Err(ConfigError::EmptyEventName)
        ));
    }

    #[test]
    fn rejects_invalid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        use std::io::Write;
        writeln!(file, "passive_listeners: sometimes").unwrap();
        assert!(matches!(
            DelegationConfig::load(Some(file.path().to_path_buf())),
            Err(ConfigError::Yaml(_))
        ));
    }
}
