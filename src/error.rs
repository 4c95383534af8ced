//! Error types for plotflow
//!
//! This module provides structured error handling using thiserror,
//! covering caller contract violations and configuration mistakes.
//! Empty inputs are not errors anywhere in the crate; they yield
//! empty results instead.

use thiserror::Error;

/// Main error type for plotflow operations
#[derive(Error, Debug)]
pub enum PlotError {
    /// Reduction target below the two-point anchor minimum
    #[error("target point count must be at least 2, got {target}")]
    InvalidTargetPoints { target: usize },

    /// Streaming window capacity of zero
    #[error("window size must be a positive integer, got {size}")]
    InvalidWindowSize { size: usize },

    /// Non-positive or non-finite flush frequency
    #[error("update frequency must be a positive number of ticks per second, got {hz}")]
    InvalidFrequency { hz: f64 },

    /// Spatial grid with zero cells per axis
    #[error("grid size must be a positive integer, got {size}")]
    InvalidGridSize { size: usize },

    /// Bounding rectangle without a usable area
    #[error("bounding rectangle has no area: {width}x{height}")]
    EmptyBounds { width: f64, height: f64 },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for plotflow operations
pub type Result<T> = std::result::Result<T, PlotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PlotError::InvalidTargetPoints { target: 1 };
        assert_eq!(
            err.to_string(),
            "target point count must be at least 2, got 1"
        );

        let err = PlotError::InvalidWindowSize { size: 0 };
        assert!(err.to_string().contains("positive integer"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: PlotError = json_err.into();
        assert!(matches!(err, PlotError::Json(_)));
    }
}
