//! Smoothness tracker configuration

use crate::error::{SmoothnessError, SmoothnessResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tracker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothnessConfig {
    /// Capacity of the per-frame outcome ring buffer
    pub frame_history_size: usize,

    /// Width of the sliding window in milliseconds
    pub sliding_window_interval_ms: u64,

    /// Display rate assumed until the first frame reports its interval
    pub nominal_frame_rate: u32,
}

impl Default for SmoothnessConfig {
    fn default() -> Self {
        Self {
            frame_history_size: 60,
            sliding_window_interval_ms: 1000,
            nominal_frame_rate: 60,
        }
    }
}

impl SmoothnessConfig {
    /// Configuration for a display running at `fps`, keeping one second of history
    pub fn for_refresh_rate(fps: u32) -> Self {
        Self {
            frame_history_size: fps.max(1) as usize,
            nominal_frame_rate: fps.max(1),
            ..Default::default()
        }
    }

    pub fn sliding_window_interval(&self) -> Duration {
        Duration::from_millis(self.sliding_window_interval_ms)
    }

    /// Frames per window at the nominal rate
    pub fn nominal_frames_in_window(&self) -> u64 {
        let interval = Duration::from_secs(1) / self.nominal_frame_rate.max(1);
        frames_in_window(self.sliding_window_interval(), interval)
    }

    /// Check the configuration for values the tracker cannot work with
    pub fn validate(&self) -> SmoothnessResult<()> {
        if self.frame_history_size == 0 {
            return Err(SmoothnessError::InvalidConfig(
                "frame_history_size must be at least 1".into(),
            ));
        }
        if self.sliding_window_interval_ms == 0 {
            return Err(SmoothnessError::InvalidConfig(
                "sliding_window_interval_ms must be at least 1".into(),
            ));
        }
        if self.nominal_frame_rate == 0 {
            return Err(SmoothnessError::InvalidConfig(
                "nominal_frame_rate must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> SmoothnessResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> SmoothnessResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// How many frames of `interval` fit in `window` (integer division)
pub(crate) fn frames_in_window(window: Duration, interval: Duration) -> u64 {
    if interval.is_zero() {
        return 0;
    }
    (window.as_nanos() / interval.as_nanos()) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SmoothnessConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sliding_window_interval(), Duration::from_secs(1));
        assert_eq!(config.nominal_frames_in_window(), 60);
    }

    #[test]
    fn test_for_refresh_rate() {
        let config = SmoothnessConfig::for_refresh_rate(120);
        assert_eq!(config.frame_history_size, 120);
        assert_eq!(config.nominal_frames_in_window(), 120);
    }

    #[test]
    fn test_json_round_trip() {
        let config = SmoothnessConfig::for_refresh_rate(90);
        let json = config.to_json().unwrap();
        assert_eq!(SmoothnessConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SmoothnessConfig::from_json(r#"{ "frame_history_size": 10 }"#).unwrap();
        assert_eq!(config.frame_history_size, 10);
        assert_eq!(config.sliding_window_interval_ms, 1000);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = SmoothnessConfig::from_json(r#"{ "frame_history_size": 0 }"#).unwrap_err();
        assert!(matches!(err, SmoothnessError::InvalidConfig(_)));

        let err = SmoothnessConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, SmoothnessError::Parse(_)));
    }

    #[test]
    fn test_frames_in_window_truncates() {
        let window = Duration::from_secs(1);
        assert_eq!(frames_in_window(window, Duration::from_micros(16_667)), 59);
        assert_eq!(frames_in_window(window, Duration::from_millis(8)), 125);
        assert_eq!(frames_in_window(window, Duration::ZERO), 0);
    }
}
