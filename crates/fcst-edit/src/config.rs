//! Edit configuration

use crate::debounce::DEFAULT_WINDOW;
use crate::error::EditError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// When edits reach the persistence collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    /// Local store only; nothing is committed downstream
    #[default]
    Immediate,
    /// Local store at once, downstream commit after a quiet window
    Debounced,
}

/// Edit controller settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    /// Commit mode
    pub mode: EditMode,
    /// Quiet window in milliseconds
    pub debounce_ms: u64,
    /// Lowest value accepted by numeric fields; lower input is raised to it
    pub floor: f64,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            mode: EditMode::Immediate,
            debounce_ms: u64::try_from(DEFAULT_WINDOW.as_millis()).unwrap_or(200),
            floor: 0.0,
        }
    }
}

impl EditConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set commit mode
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: EditMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the quiet window
    #[inline]
    #[must_use]
    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Set the numeric floor
    #[inline]
    #[must_use]
    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = floor;
        self
    }

    /// Quiet window as a duration
    #[inline]
    #[must_use]
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Check the settings
    ///
    /// # Errors
    /// - `EditError::InvalidConfig` for a non-finite floor or a zero window
    ///   in debounced mode
    pub fn validate(&self) -> Result<(), EditError> {
        if !self.floor.is_finite() {
            return Err(EditError::InvalidConfig(format!(
                "floor must be finite, got {}",
                self.floor
            )));
        }
        if self.mode == EditMode::Debounced && self.debounce_ms == 0 {
            return Err(EditError::InvalidConfig(
                "debounce window must be positive in debounced mode".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EditConfig::default();
        assert_eq!(config.mode, EditMode::Immediate);
        assert_eq!(config.debounce_ms, 200);
        assert_eq!(config.floor, 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation() {
        assert!(EditConfig::new().with_floor(f64::NAN).validate().is_err());
        assert!(EditConfig::new()
            .with_mode(EditMode::Debounced)
            .with_debounce_ms(0)
            .validate()
            .is_err());
        // a zero window is harmless when nothing is debounced
        assert!(EditConfig::new().with_debounce_ms(0).validate().is_ok());
    }
}
