//! Explicit configuration for the core components
//!
//! Every component takes its configuration by value at construction time;
//! there is no process-wide mutable default. Configs serialize to JSON so
//! host applications can persist them alongside their own settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{lod, sampling, spatial, stream};
use crate::error::{PlotError, Result};
use crate::sample::SamplingStrategy;

/// Flush cadence of the streaming buffer
///
/// The named variants match common display refresh rates; `Custom` accepts
/// any positive tick rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UpdateFrequency {
    Fps15,
    Fps30,
    Fps60,
    Fps120,
    Custom(f64),
}

impl UpdateFrequency {
    /// Ticks per second
    pub fn hz(&self) -> f64 {
        match self {
            UpdateFrequency::Fps15 => 15.0,
            UpdateFrequency::Fps30 => 30.0,
            UpdateFrequency::Fps60 => 60.0,
            UpdateFrequency::Fps120 => 120.0,
            UpdateFrequency::Custom(hz) => *hz,
        }
    }

    /// Interval between flush ticks
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.hz())
    }

    fn validate(&self) -> Result<()> {
        let hz = self.hz();
        if !hz.is_finite() || hz <= 0.0 {
            return Err(PlotError::InvalidFrequency { hz });
        }
        Ok(())
    }
}

impl Default for UpdateFrequency {
    fn default() -> Self {
        UpdateFrequency::Fps60
    }
}

/// Configuration for [`StreamingBuffer`](crate::StreamingBuffer)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Sliding window capacity; oldest values are evicted past this size
    pub window_size: usize,
    /// Flush cadence
    pub update_frequency: UpdateFrequency,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            window_size: stream::DEFAULT_WINDOW_SIZE,
            update_frequency: UpdateFrequency::default(),
        }
    }
}

impl StreamConfig {
    /// Check the configuration for contract violations
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(PlotError::InvalidWindowSize {
                size: self.window_size,
            });
        }
        self.update_frequency.validate()
    }
}

/// Configuration for [`DataOptimizer`](crate::DataOptimizer)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Active reduction algorithm
    pub strategy: SamplingStrategy,
    /// Dataset size above which ladder levels are precomputed eagerly
    pub precompute_threshold: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            strategy: SamplingStrategy::Lttb {
                buckets: sampling::DEFAULT_LTTB_BUCKETS,
            },
            precompute_threshold: lod::PRECOMPUTE_THRESHOLD,
        }
    }
}

/// Configuration for [`SpatialGrid`](crate::SpatialGrid)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Cell count per axis
    pub grid_size: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_size: spatial::DEFAULT_GRID_SIZE,
        }
    }
}

impl GridConfig {
    /// Check the configuration for contract violations
    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 {
            return Err(PlotError::InvalidGridSize {
                size: self.grid_size,
            });
        }
        Ok(())
    }
}

/// Serialize a config value to a JSON string
pub fn to_json<C: Serialize>(config: &C) -> Result<String> {
    Ok(serde_json::to_string(config)?)
}

/// Deserialize a config value from a JSON string
pub fn from_json<C: for<'de> Deserialize<'de>>(json: &str) -> Result<C> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_intervals() {
        assert_eq!(UpdateFrequency::Fps60.hz(), 60.0);
        assert_eq!(
            UpdateFrequency::Custom(10.0).interval(),
            Duration::from_millis(100)
        );
    }

    #[test]
    fn test_stream_config_validation() {
        assert!(StreamConfig::default().validate().is_ok());

        let zero_window = StreamConfig {
            window_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            zero_window.validate(),
            Err(PlotError::InvalidWindowSize { size: 0 })
        ));

        let bad_rate = StreamConfig {
            update_frequency: UpdateFrequency::Custom(-1.0),
            ..Default::default()
        };
        assert!(matches!(
            bad_rate.validate(),
            Err(PlotError::InvalidFrequency { .. })
        ));
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = StreamConfig {
            window_size: 250,
            update_frequency: UpdateFrequency::Custom(24.0),
        };
        let json = to_json(&config).unwrap();
        let restored: StreamConfig = from_json(&json).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_grid_config_validation() {
        assert!(GridConfig::default().validate().is_ok());
        assert!(GridConfig { grid_size: 0 }.validate().is_err());
    }
}
