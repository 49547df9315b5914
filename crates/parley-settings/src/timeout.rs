use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Runtime override for the conversation deadline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatTimeoutSettings {
    /// Zero means "use the configured default"
    pub timeout_seconds: u64,
}

impl ChatTimeoutSettings {
    /// The stored override, if one is set
    pub const fn duration(self) -> Option<Duration> {
        if self.timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_seconds))
        }
    }

    /// Resolve the deadline to apply, preferring the stored override
    pub fn effective(self, fallback: Duration) -> Duration {
        self.duration().unwrap_or(fallback)
    }

    pub(crate) fn validate(self) -> Result<(), SettingsError> {
        if self.timeout_seconds == 0 {
            return Err(SettingsError::Invalid("timeout_seconds must be greater than zero".to_owned()));
        }
        Ok(())
    }
}
