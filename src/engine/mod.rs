//! LOD cache and reduction engine
//!
//! Owns one raw series for its lifetime, holds the active sampling
//! strategy and memoizes reductions per detail level. Large datasets get
//! their ladder levels precomputed eagerly on a background worker; results
//! publish back through a channel and appear in the cache as they finish.

mod worker;

pub use worker::{LodWorker, WorkerRequest, WorkerResult};

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, trace};

use crate::config::OptimizerConfig;
use crate::error::{PlotError, Result};
use crate::lod;
use crate::metrics::RenderMetrics;
use crate::sample::{self, SamplingStrategy};

/// Reduction engine with per-detail-level memoization
///
/// The raw series is immutable for the engine's lifetime and replaceable
/// only wholesale via [`set_data`](Self::set_data), which invalidates every
/// cached level. Queries before any data is set return empty results.
pub struct DataOptimizer<T> {
    raw: Arc<[T]>,
    strategy: SamplingStrategy,
    precompute_threshold: usize,
    cache: HashMap<usize, Arc<[T]>>,
    metrics: RenderMetrics,
    worker: LodWorker<T>,
    // Bumped on every data/strategy change so stale worker results are
    // discarded instead of landing in a fresh cache
    generation: u64,
}

impl<T: Clone + Send + Sync + 'static> DataOptimizer<T> {
    /// Create an engine with no data
    pub fn new(config: OptimizerConfig) -> Self {
        Self {
            raw: Vec::new().into(),
            strategy: config.strategy,
            precompute_threshold: config.precompute_threshold,
            cache: HashMap::new(),
            metrics: RenderMetrics::default(),
            worker: LodWorker::spawn(),
            generation: 0,
        }
    }

    /// Create an engine owning `data` from the start
    pub fn with_data(config: OptimizerConfig, data: Vec<T>) -> Self {
        let mut engine = Self::new(config);
        engine.set_data(data);
        engine
    }

    /// Replace the raw series wholesale
    ///
    /// Invalidates the entire LOD cache. Series larger than the precompute
    /// threshold get every ladder level queued on the background worker.
    pub fn set_data(&mut self, data: Vec<T>) {
        self.raw = data.into();
        self.generation += 1;
        self.cache.clear();
        debug!("raw series replaced: {} elements", self.raw.len());
        self.request_precompute();
    }

    /// Switch the active strategy, invalidating every cached level
    pub fn set_strategy(&mut self, strategy: SamplingStrategy) {
        if self.strategy == strategy {
            return;
        }
        self.strategy = strategy;
        self.generation += 1;
        self.cache.clear();
        self.request_precompute();
    }

    fn request_precompute(&self) {
        if self.raw.len() <= self.precompute_threshold {
            return;
        }
        for level in lod::levels_below(self.raw.len()) {
            self.worker.request(WorkerRequest::Precompute {
                generation: self.generation,
                level,
                data: Arc::clone(&self.raw),
                strategy: self.strategy,
            });
        }
    }

    /// Integrate finished worker reductions into the cache
    fn poll_worker(&mut self) {
        while let Some(WorkerResult::LevelReady {
            generation,
            level,
            points,
        }) = self.worker.poll()
        {
            if generation == self.generation {
                trace!("lod level {level} published");
                self.cache.insert(level, points.into());
            }
        }
    }

    /// Reduced view of the series (or an index sub-range of it)
    ///
    /// Short-circuits when the requested slice already fits `target`.
    /// Otherwise the target resolves to the nearest ladder level, served
    /// from cache when present. Only whole-series reductions are memoized;
    /// sub-range queries recompute. `target < 2` fails fast.
    pub fn optimized_data(
        &mut self,
        range: Option<Range<usize>>,
        target: usize,
    ) -> Result<Vec<T>> {
        let start = Instant::now();
        let result = self.optimized_data_inner(range, target);
        self.metrics.record(start.elapsed());
        result
    }

    fn optimized_data_inner(
        &mut self,
        range: Option<Range<usize>>,
        target: usize,
    ) -> Result<Vec<T>> {
        if target < crate::constants::sampling::MIN_TARGET_POINTS {
            return Err(PlotError::InvalidTargetPoints { target });
        }

        profiling::scope!("optimized_data");
        self.poll_worker();

        let len = self.raw.len();
        if len == 0 {
            return Ok(Vec::new());
        }

        let range = match range {
            Some(r) => r.start.min(len)..r.end.min(len),
            None => 0..len,
        };
        let whole = range == (0..len);
        let slice = &self.raw[range];

        if slice.len() <= target {
            return Ok(slice.to_vec());
        }

        let level = lod::nearest_level(target);
        if !whole {
            return sample::reduce(slice, level, self.strategy);
        }

        if let Some(cached) = self.cache.get(&level) {
            trace!("lod cache hit: level {level}");
            return Ok(cached.to_vec());
        }

        trace!("lod cache miss: level {level}");
        let reduced = sample::reduce(slice, level, self.strategy)?;
        self.cache.insert(level, Arc::from(reduced.as_slice()));
        Ok(reduced)
    }

    /// Viewport query: filter by x-range, then reduce to one point per pixel
    ///
    /// Viewport ranges are too varied to memoize usefully, so every call
    /// recomputes the filtered and reduced result. The default target is
    /// `pixel_width`.
    pub fn data_for_viewport<F>(
        &mut self,
        min_x: f64,
        max_x: f64,
        pixel_width: usize,
        value_accessor: F,
        target: Option<usize>,
    ) -> Result<Vec<T>>
    where
        F: Fn(&T) -> f64,
    {
        let start = Instant::now();
        let result = self.viewport_inner(min_x, max_x, pixel_width, value_accessor, target);
        self.metrics.record(start.elapsed());
        result
    }

    fn viewport_inner<F>(
        &mut self,
        min_x: f64,
        max_x: f64,
        pixel_width: usize,
        value_accessor: F,
        target: Option<usize>,
    ) -> Result<Vec<T>>
    where
        F: Fn(&T) -> f64,
    {
        let target = target.unwrap_or(pixel_width);
        if target < crate::constants::sampling::MIN_TARGET_POINTS {
            return Err(PlotError::InvalidTargetPoints { target });
        }

        profiling::scope!("data_for_viewport");

        let visible: Vec<T> = self
            .raw
            .iter()
            .filter(|element| {
                let x = value_accessor(element);
                x >= min_x && x <= max_x
            })
            .cloned()
            .collect();

        sample::reduce(&visible, target, self.strategy)
    }

    /// Snapshot of the running query metrics
    pub fn metrics(&self) -> RenderMetrics {
        self.metrics
    }

    /// Zero the query metrics
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Whether a reduction for `level` is currently cached
    ///
    /// Polls the worker first, so eagerly computed levels become visible as
    /// they complete.
    pub fn has_cached_level(&mut self, level: usize) -> bool {
        self.poll_worker();
        self.cache.contains_key(&level)
    }

    /// Active sampling strategy
    pub fn strategy(&self) -> SamplingStrategy {
        self.strategy
    }

    /// Raw series length
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Shared handle to the raw series
    pub fn raw_data(&self) -> Arc<[T]> {
        Arc::clone(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn engine_with(n: usize) -> DataOptimizer<usize> {
        DataOptimizer::with_data(
            OptimizerConfig {
                strategy: SamplingStrategy::Uniform,
                ..Default::default()
            },
            (0..n).collect(),
        )
    }

    #[test]
    fn test_query_before_data_is_empty() {
        let mut engine: DataOptimizer<usize> = DataOptimizer::new(OptimizerConfig::default());
        assert!(engine.optimized_data(None, 100).unwrap().is_empty());
        assert_eq!(engine.metrics().query_count(), 1);
    }

    #[test]
    fn test_identity_short_circuit() {
        let mut engine = engine_with(50);
        let result = engine.optimized_data(None, 100).unwrap();
        assert_eq!(result.len(), 50);
        assert_eq!(result, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_reduction_resolves_nearest_ladder_level() {
        let mut engine = engine_with(5_000);
        // target 120 resolves to ladder level 100
        let result = engine.optimized_data(None, 120).unwrap();
        assert_eq!(result.len(), 100);
        assert_eq!(result[0], 0);
        assert_eq!(result[99], 4_999);
    }

    #[test]
    fn test_cache_serves_repeat_queries() {
        let mut engine = engine_with(5_000);
        let first = engine.optimized_data(None, 100).unwrap();
        assert!(engine.has_cached_level(100));
        let second = engine.optimized_data(None, 100).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_set_data_invalidates_cache() {
        let mut engine = engine_with(5_000);
        engine.optimized_data(None, 100).unwrap();
        assert!(engine.has_cached_level(100));

        engine.set_data((0..3_000).rev().collect());
        assert!(!engine.has_cached_level(100));

        let result = engine.optimized_data(None, 100).unwrap();
        assert_eq!(result[0], 2_999);
        assert_eq!(result[99], 0);
    }

    #[test]
    fn test_set_strategy_invalidates_cache() {
        let mut engine = engine_with(5_000);
        engine.optimized_data(None, 100).unwrap();
        assert!(engine.has_cached_level(100));

        engine.set_strategy(SamplingStrategy::MinMax);
        assert!(!engine.has_cached_level(100));
    }

    #[test]
    fn test_sub_range_query_slices_before_reducing() {
        let mut engine = engine_with(10_000);
        let result = engine.optimized_data(Some(2_000..2_050), 100).unwrap();
        assert_eq!(result, (2_000..2_050).collect::<Vec<_>>());

        // Out-of-range ends clamp to the series length
        let clamped = engine.optimized_data(Some(9_990..20_000), 100).unwrap();
        assert_eq!(clamped, (9_990..10_000).collect::<Vec<_>>());
    }

    #[test]
    fn test_target_below_two_fails_fast() {
        let mut engine = engine_with(100);
        assert!(matches!(
            engine.optimized_data(None, 1),
            Err(PlotError::InvalidTargetPoints { target: 1 })
        ));
    }

    #[test]
    fn test_eager_precompute_publishes_levels() {
        let mut engine = engine_with(50_000);

        let deadline = Instant::now() + Duration::from_secs(5);
        while !engine.has_cached_level(10_000) {
            assert!(Instant::now() < deadline, "precompute never published");
            std::thread::sleep(Duration::from_millis(5));
        }
        for level in [100, 500, 1_000, 5_000] {
            let deadline = Instant::now() + Duration::from_secs(5);
            while !engine.has_cached_level(level) {
                assert!(Instant::now() < deadline);
                std::thread::sleep(Duration::from_millis(5));
            }
        }
    }

    #[test]
    fn test_stale_worker_results_are_discarded() {
        let mut engine = engine_with(50_000);
        // Replace the data before the worker can publish; old-generation
        // results must not appear in the new cache
        engine.set_data((0..10).collect());
        std::thread::sleep(Duration::from_millis(50));
        for level in crate::constants::lod::LADDER {
            assert!(!engine.has_cached_level(level));
        }
        assert_eq!(engine.optimized_data(None, 100).unwrap().len(), 10);
    }

    #[test]
    fn test_viewport_filters_then_reduces() {
        let mut engine = engine_with(10_000);
        let result = engine
            .data_for_viewport(100.0, 300.0, 50, |&v| v as f64, None)
            .unwrap();
        assert!(result.len() <= 50);
        assert_eq!(*result.first().unwrap(), 100);
        assert_eq!(*result.last().unwrap(), 300);
    }

    #[test]
    fn test_viewport_outside_data_is_empty() {
        let mut engine = engine_with(1_000);
        let result = engine
            .data_for_viewport(5_000.0, 6_000.0, 100, |&v| v as f64, None)
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_metrics_record_every_call() {
        let mut engine = engine_with(5_000);
        engine.optimized_data(None, 100).unwrap();
        engine.optimized_data(None, 10_000).unwrap(); // identity short-circuit
        engine
            .data_for_viewport(0.0, 100.0, 50, |&v| v as f64, None)
            .unwrap();
        assert_eq!(engine.metrics().query_count(), 3);

        engine.reset_metrics();
        assert_eq!(engine.metrics().query_count(), 0);
    }
}
