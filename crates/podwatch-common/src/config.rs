//! Configuration model for the change notifier.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PodwatchError, Result};

/// How update events are reported downstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateAction {
    /// Updates are reported exactly like creations.
    #[default]
    Add,
    /// Updates carry their own `update` discriminant.
    Update,
}

/// What the hosting process does with a malformed inbound event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidEventPolicy {
    /// Stop processing and exit with an error.
    #[default]
    Fail,
    /// Log the violation and continue with the next event.
    Skip,
}

/// Root configuration for the change notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Discriminant used for update events.
    pub update_action: UpdateAction,
    /// Skip add/update notifications whose label did not change.
    pub suppress_unchanged: bool,
    /// Maximum number of pods remembered for suppression.
    pub dedup_capacity: usize,
    /// Handling of contract violations at the dispatch boundary.
    pub on_invalid: InvalidEventPolicy,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            update_action: UpdateAction::default(),
            suppress_unchanged: false,
            dedup_capacity: crate::constants::DEFAULT_DEDUP_CAPACITY,
            on_invalid: InvalidEventPolicy::default(),
        }
    }
}

impl NotifierConfig {
    /// Parses a configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or fails validation.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| PodwatchError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "loading notifier config");
        let content = std::fs::read_to_string(path).map_err(|e| PodwatchError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if suppression is enabled with a zero-sized cache.
    pub fn validate(&self) -> Result<()> {
        if self.suppress_unchanged && self.dedup_capacity == 0 {
            return Err(PodwatchError::Config {
                message: "dedup_capacity must be at least 1 when suppress_unchanged is set"
                    .to_string(),
            });
        }
        Ok(())
    }
}
