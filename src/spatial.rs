//! Grid-bucketed spatial index for nearest-point queries
//!
//! A fixed cell grid over a bounding rectangle, filled once by bulk insert
//! and read-only afterwards. Rebuilding means discarding the grid and
//! reinserting. [`GridBuilder`] runs the bulk insert on a background thread
//! and exposes an availability flag so queries never touch a partially
//! built structure.

use std::sync::mpsc::{Receiver, TryRecvError, channel};
use std::thread::{self, JoinHandle};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::GridConfig;
use crate::error::{PlotError, Result};

/// Axis-aligned bounding rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, width: f64, height: f64) -> Self {
        Self {
            min_x,
            min_y,
            width,
            height,
        }
    }

    /// Whether a point falls inside the rectangle
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x
            && x <= self.min_x + self.width
            && y >= self.min_y
            && y <= self.min_y + self.height
    }
}

/// Fixed-size cell grid over 2D points
///
/// Each cell holds indices into a flat record array; points outside the
/// bounds clamp into the nearest edge cell rather than being rejected.
#[derive(Debug)]
pub struct SpatialGrid<T> {
    bounds: Bounds,
    grid_size: usize,
    records: Vec<(T, f64, f64)>,
    cells: Vec<Vec<usize>>,
}

impl<T: Clone> SpatialGrid<T> {
    /// Create an empty grid over `bounds` with `config.grid_size` cells per axis
    pub fn new(bounds: Bounds, config: GridConfig) -> Result<Self> {
        config.validate()?;
        if !(bounds.width > 0.0) || !(bounds.height > 0.0) {
            return Err(PlotError::EmptyBounds {
                width: bounds.width,
                height: bounds.height,
            });
        }
        Ok(Self {
            bounds,
            grid_size: config.grid_size,
            records: Vec::new(),
            cells: vec![Vec::new(); config.grid_size * config.grid_size],
        })
    }

    /// Clamped cell coordinate for a point
    fn cell_coord(&self, x: f64, y: f64) -> (usize, usize) {
        let size = self.grid_size as f64;
        let cx = ((x - self.bounds.min_x) / self.bounds.width * size).floor();
        let cy = ((y - self.bounds.min_y) / self.bounds.height * size).floor();
        (
            cx.clamp(0.0, size - 1.0) as usize,
            cy.clamp(0.0, size - 1.0) as usize,
        )
    }

    /// Insert one element at a point
    pub fn insert(&mut self, element: T, x: f64, y: f64) {
        let index = self.records.len();
        let (cx, cy) = self.cell_coord(x, y);
        self.records.push((element, x, y));
        self.cells[cy * self.grid_size + cx].push(index);
    }

    /// All elements within exact Euclidean distance `radius` of `(x, y)`
    ///
    /// Scans only the cells covered by the query square, then applies the
    /// circular distance test per record.
    pub fn query(&self, x: f64, y: f64, radius: f64) -> Vec<T> {
        profiling::scope!("grid_query");

        if self.records.is_empty() {
            return Vec::new();
        }

        let (min_cx, min_cy) = self.cell_coord(x - radius, y - radius);
        let (max_cx, max_cy) = self.cell_coord(x + radius, y + radius);
        let radius_sq = radius * radius;

        let mut found = Vec::new();
        for cy in min_cy..=max_cy {
            for cx in min_cx..=max_cx {
                for &index in &self.cells[cy * self.grid_size + cx] {
                    let (ref element, px, py) = self.records[index];
                    let dx = px - x;
                    let dy = py - y;
                    if dx * dx + dy * dy <= radius_sq {
                        found.push(element.clone());
                    }
                }
            }
        }
        found
    }

    /// Number of inserted records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }
}

/// Background bulk construction of a [`SpatialGrid`]
///
/// Insertion runs off the interactive thread; the finished grid is handed
/// back over a channel and integrated by [`GridBuilder::poll`]. Queries
/// before the grid is ready return empty results.
pub struct GridBuilder<T> {
    rx: Receiver<SpatialGrid<T>>,
    grid: Option<SpatialGrid<T>>,
    handle: Option<JoinHandle<()>>,
}

impl<T: Clone + Send + 'static> GridBuilder<T> {
    /// Validate parameters and start building from `items` in the background
    pub fn spawn(bounds: Bounds, config: GridConfig, items: Vec<(T, f64, f64)>) -> Result<Self> {
        // Fail fast on bad parameters before the thread starts
        let mut grid = SpatialGrid::new(bounds, config)?;
        let (tx, rx) = channel();

        let handle = thread::spawn(move || {
            debug!("spatial grid build started: {} records", items.len());
            for (element, x, y) in items {
                grid.insert(element, x, y);
            }
            let _ = tx.send(grid);
        });

        Ok(Self {
            rx,
            grid: None,
            handle: Some(handle),
        })
    }

    /// Integrate a finished grid if one is available; returns readiness
    pub fn poll(&mut self) -> bool {
        if self.grid.is_none() {
            match self.rx.try_recv() {
                Ok(grid) => {
                    debug!("spatial grid ready: {} records", grid.len());
                    self.grid = Some(grid);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {}
            }
        }
        self.grid.is_some()
    }

    /// Availability flag: whether a completed grid has been integrated
    pub fn is_ready(&self) -> bool {
        self.grid.is_some()
    }

    /// Query the grid, or report not-yet-available as an empty result
    pub fn query(&mut self, x: f64, y: f64, radius: f64) -> Vec<T> {
        if !self.poll() {
            return Vec::new();
        }
        self.grid
            .as_ref()
            .map(|grid| grid.query(x, y, radius))
            .unwrap_or_default()
    }

    /// Access the finished grid once ready
    pub fn grid(&self) -> Option<&SpatialGrid<T>> {
        self.grid.as_ref()
    }
}

impl<T> Drop for GridBuilder<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
