//! Crate-wide constants and default values
//!
//! This module centralizes all magic numbers and default values used throughout
//! the crate, making them easier to maintain and configure.

/// Level-of-detail defaults
pub mod lod {
    /// Fixed ladder of detail levels (target point counts) used for cache keying
    pub const LADDER: [usize; 5] = [100, 500, 1_000, 5_000, 10_000];

    /// Dataset size above which every ladder level is precomputed eagerly
    /// on the background worker
    pub const PRECOMPUTE_THRESHOLD: usize = 10_000;
}

/// Sampling defaults
pub mod sampling {
    /// Smallest target point count a reduction accepts (first + last anchor)
    pub const MIN_TARGET_POINTS: usize = 2;

    /// Default bucket count for the largest-triangle-three-buckets strategy
    pub const DEFAULT_LTTB_BUCKETS: usize = 512;

    /// Default variance threshold for the adaptive strategy
    pub const DEFAULT_ADAPTIVE_THRESHOLD: f64 = 0.5;
}

/// Spatial index defaults
pub mod spatial {
    /// Cell count per axis of the lookup grid
    pub const DEFAULT_GRID_SIZE: usize = 100;
}

/// Streaming buffer defaults
pub mod stream {
    use std::time::Duration;

    /// Default sliding window capacity
    pub const DEFAULT_WINDOW_SIZE: usize = 1_000;

    /// Default flush cadence in ticks per second
    pub const DEFAULT_FREQUENCY_HZ: f64 = 60.0;

    /// Trailing interval over which arrival rate is measured
    pub const RATE_WINDOW: Duration = Duration::from_secs(1);
}

/// Numeric precision constants
pub mod numeric {
    /// Floating point comparison epsilon
    pub const EPSILON: f64 = 1e-12;
}
