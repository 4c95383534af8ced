//! Data-reduction, spatial-index and streaming core for interactive
//! plotting frontends.
//!
//! Three subsystems, consumed by a presentation layer through plain
//! function calls:
//!
//! - [`DataOptimizer`]: owns a raw series, reduces it to bounded
//!   representative subsets with selectable [`SamplingStrategy`]s and
//!   memoizes reductions per detail level.
//! - [`SpatialGrid`] / [`GridBuilder`]: grid-bucketed index over 2D points
//!   for sub-linear radius queries against the full, un-reduced dataset.
//! - [`StreamingBuffer`]: thread-safe ingestion queue flushed on a fixed
//!   cadence into a bounded sliding window with rate measurement.
//!
//! The crate performs no rendering and no I/O; it turns too-much-data into
//! just-enough-data and leaves drawing to the caller.

pub mod constants;

mod config;
mod engine;
mod error;
mod lod;
mod metrics;
mod sample;
mod spatial;
mod stream;

pub use config::{GridConfig, OptimizerConfig, StreamConfig, UpdateFrequency, from_json, to_json};
pub use engine::{DataOptimizer, LodWorker, WorkerRequest, WorkerResult};
pub use error::{PlotError, Result};
pub use lod::{ladder, levels_below, nearest_level};
pub use metrics::RenderMetrics;
pub use sample::{SamplingStrategy, reduce};
pub use spatial::{Bounds, GridBuilder, SpatialGrid};
pub use stream::StreamingBuffer;
