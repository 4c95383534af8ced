//! Sampling strategies for series reduction
//!
//! Maps an ordered series and a target count to a bounded representative
//! subset. All strategies are index-based bucket selections, which keeps
//! them pure, deterministic and generic over the element type. Every
//! strategy except `None` preserves the first and last element of its
//! input (the anchor-point guarantee).

use serde::{Deserialize, Serialize};

use crate::constants::sampling::MIN_TARGET_POINTS;
use crate::error::{PlotError, Result};

/// Selectable reduction algorithm
///
/// Pure data; interpreted by [`reduce`] and by the reduction engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SamplingStrategy {
    /// Identity: returns the input unchanged regardless of size
    None,
    /// Evenly strided index selection across the whole series
    Uniform,
    /// Largest-triangle-three-buckets layout with simplified selection.
    /// Each interior bucket contributes its midpoint index rather than the
    /// area-maximizing point, so feature preservation is approximate.
    Lttb { buckets: usize },
    /// Bucketed selection sized for peak/valley retention; the
    /// representative is the bucket midpoint index
    MinMax,
    /// Variance-adaptive density.
    /// TODO: weight bucket density by local variance; until then this
    /// falls back to `Uniform` and ignores the threshold.
    Adaptive { threshold: f64 },
}

impl Default for SamplingStrategy {
    fn default() -> Self {
        SamplingStrategy::Lttb {
            buckets: crate::constants::sampling::DEFAULT_LTTB_BUCKETS,
        }
    }
}

/// Reduce a series to at most `target` representative elements
///
/// Returns the input unchanged (as a copy) when it already fits the target
/// or when the strategy is `None`. Targets below two are a caller contract
/// violation and fail fast; they are never clamped.
///
/// Safe to call concurrently for different inputs.
pub fn reduce<T: Clone>(
    data: &[T],
    target: usize,
    strategy: SamplingStrategy,
) -> Result<Vec<T>> {
    if target < MIN_TARGET_POINTS {
        return Err(PlotError::InvalidTargetPoints { target });
    }
    if data.len() <= target {
        return Ok(data.to_vec());
    }

    profiling::scope!("reduce");

    let reduced = match strategy {
        SamplingStrategy::None => data.to_vec(),
        SamplingStrategy::Uniform => uniform_sample(data, target),
        SamplingStrategy::Lttb { buckets } => lttb_midpoint(data, buckets.min(target)),
        SamplingStrategy::MinMax => minmax_sample(data, target),
        // Adaptive is a stub: uniform density, threshold unused
        SamplingStrategy::Adaptive { .. } => uniform_sample(data, target),
    };
    Ok(reduced)
}

/// Evenly strided selection of exactly `target` elements
fn uniform_sample<T: Clone>(data: &[T], target: usize) -> Vec<T> {
    let len = data.len();
    let mut out = Vec::with_capacity(target);
    for i in 0..target {
        out.push(data[i * len / target].clone());
    }
    // The stride rarely lands on the final element, so the last slot is
    // overwritten with it; the duplicate/skip near the tail is accepted.
    let last = out.len() - 1;
    out[last] = data[len - 1].clone();
    out
}

/// Bucket-midpoint LTTB layout: first and last kept verbatim, interior
/// split into `buckets - 2` contiguous ranges contributing one index each
fn lttb_midpoint<T: Clone>(data: &[T], buckets: usize) -> Vec<T> {
    let len = data.len();
    if buckets <= MIN_TARGET_POINTS {
        return vec![data[0].clone(), data[len - 1].clone()];
    }

    let mut out = Vec::with_capacity(buckets);
    out.push(data[0].clone());

    let bucket_size = len as f64 / buckets as f64;
    for i in 0..(buckets - 2) {
        let start = (i as f64 * bucket_size) as usize + 1;
        let end = ((i + 1) as f64 * bucket_size) as usize + 1;
        let end = end.min(len - 1);
        if start >= end {
            continue;
        }
        out.push(data[(start + end) / 2].clone());
    }

    out.push(data[len - 1].clone());
    out
}

/// Bucket walk sized at `len / (target / 2)` emitting one midpoint index
/// per bucket, anchors kept verbatim
fn minmax_sample<T: Clone>(data: &[T], target: usize) -> Vec<T> {
    let len = data.len();
    let half = (target / 2).max(1);
    let bucket_size = (len as f64 / half as f64).ceil() as usize;
    let bucket_size = bucket_size.max(1);

    let mut out = Vec::with_capacity(half + 2);
    out.push(data[0].clone());

    let mut start = 0;
    while start < len && out.len() < target - 1 {
        let end = (start + bucket_size).min(len);
        let mid = (start + end) / 2;
        if mid > 0 && mid < len - 1 {
            out.push(data[mid].clone());
        }
        start = end;
    }

    out.push(data[len - 1].clone());
    out
}
