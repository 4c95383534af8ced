//! Real-time ingestion buffer with cadenced window publication
//!
//! `push` accepts values from any thread at any rate and only ever touches
//! the pending queue behind a short-lived lock. A ticker thread emits
//! flush ticks at the configured cadence; the owning context applies them
//! via [`poll`](StreamingBuffer::poll), moving pending values into the
//! bounded sliding window. Backpressure is handled by windowing: oldest
//! values are dropped silently, never reported as an error.

use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use log::{debug, trace};

use crate::config::StreamConfig;
use crate::constants::stream::RATE_WINDOW;
use crate::error::Result;

/// Pending values and their arrival timestamps, guarded by one lock
struct Ingest<T> {
    pending: Vec<T>,
    // Arrivals within the trailing rate window, re-filtered on each push
    arrivals: Vec<Instant>,
}

struct Ticker {
    stop_tx: Sender<()>,
    tick_rx: Receiver<()>,
    handle: Option<JoinHandle<()>>,
}

/// Thread-safe ingestion queue feeding a bounded sliding window
pub struct StreamingBuffer<T> {
    config: StreamConfig,
    ingest: Arc<Mutex<Ingest<T>>>,
    window: VecDeque<T>,
    data_rate: usize,
    ticker: Option<Ticker>,
}

impl<T> StreamingBuffer<T> {
    /// Create a stopped buffer; fails fast on invalid configuration
    pub fn new(config: StreamConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ingest: Arc::new(Mutex::new(Ingest {
                pending: Vec::new(),
                arrivals: Vec::new(),
            })),
            window: VecDeque::with_capacity(config.window_size),
            data_rate: 0,
            ticker: None,
        })
    }

    fn lock_ingest(&self) -> MutexGuard<'_, Ingest<T>> {
        // A poisoned lock only means a panicking pusher; the data is still
        // a consistent append-only queue
        match self.ingest.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Append one value to the pending queue
    ///
    /// Legal in any state and callable from any thread; never blocks on
    /// the flush cadence. The lock covers only the append and the bounded
    /// trailing-window timestamp filter.
    pub fn push(&self, value: T) {
        let now = Instant::now();
        let mut ingest = self.lock_ingest();
        ingest.pending.push(value);
        if let Some(cutoff) = now.checked_sub(RATE_WINDOW) {
            ingest.arrivals.retain(|&t| t >= cutoff);
        }
        ingest.arrivals.push(now);
    }

    /// Start the flush ticker; no-op when already active
    pub fn start(&mut self) {
        if self.ticker.is_some() {
            return;
        }
        let interval = self.config.update_frequency.interval();
        let (stop_tx, stop_rx) = channel::<()>();
        let (tick_tx, tick_rx) = channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if tick_tx.send(()).is_err() {
                            break;
                        }
                    }
                    // Stop requested or buffer dropped
                    _ => break,
                }
            }
        });

        debug!("streaming buffer started at {} hz", self.config.update_frequency.hz());
        self.ticker = Some(Ticker {
            stop_tx,
            tick_rx,
            handle: Some(handle),
        });
    }

    /// Stop the flush ticker; idempotent
    ///
    /// After this returns the ticker thread has exited and no further
    /// flush will be applied by [`poll`](Self::poll).
    pub fn stop(&mut self) {
        let Some(mut ticker) = self.ticker.take() else {
            return;
        };
        let _ = ticker.stop_tx.send(());
        if let Some(handle) = ticker.handle.take() {
            let _ = handle.join();
        }
        debug!("streaming buffer stopped");
    }

    /// Whether the flush ticker is running
    pub fn is_active(&self) -> bool {
        self.ticker.is_some()
    }

    /// Apply all flush ticks due since the last call; returns how many ran
    pub fn poll(&mut self) -> usize {
        let due = match &self.ticker {
            Some(ticker) => ticker.tick_rx.try_iter().count(),
            None => return 0,
        };
        for _ in 0..due {
            self.flush_now();
        }
        due
    }

    /// Perform one flush synchronously
    ///
    /// Atomically drains the entire pending queue, appends to the window,
    /// evicts oldest past capacity and recomputes the arrival rate. With
    /// an empty pending queue this is a no-op and leaves the rate as-is.
    pub fn flush_now(&mut self) {
        profiling::scope!("stream_flush");

        let (drained, rate) = {
            let mut ingest = self.lock_ingest();
            if ingest.pending.is_empty() {
                return;
            }
            let drained = std::mem::take(&mut ingest.pending);
            if let Some(cutoff) = Instant::now().checked_sub(RATE_WINDOW) {
                ingest.arrivals.retain(|&t| t >= cutoff);
            }
            (drained, ingest.arrivals.len())
        };

        // The lock is released before publication so producers never wait
        // on the window update
        trace!("flush: {} values, rate {}/s", drained.len(), rate);
        self.window.extend(drained);
        while self.window.len() > self.config.window_size {
            self.window.pop_front();
        }
        self.data_rate = rate;
    }

    /// Replace the window outright, bypassing the flush cadence
    ///
    /// Keeps the most recent `window_size` of `values` and discards any
    /// pending buffer contents.
    pub fn set_data(&mut self, values: Vec<T>) {
        self.lock_ingest().pending.clear();
        let skip = values.len().saturating_sub(self.config.window_size);
        self.window = values.into_iter().skip(skip).collect();
    }

    /// Discard pending and windowed data atomically and zero the rate
    pub fn clear(&mut self) {
        {
            let mut ingest = self.lock_ingest();
            ingest.pending.clear();
            ingest.arrivals.clear();
        }
        self.window.clear();
        self.data_rate = 0;
    }

    /// The published sliding window, oldest first
    pub fn window(&self) -> &VecDeque<T> {
        &self.window
    }

    /// Arrivals per trailing rate window, as of the last flush
    pub fn data_rate(&self) -> usize {
        self.data_rate
    }

    /// Values pushed but not yet flushed
    pub fn pending_len(&self) -> usize {
        self.lock_ingest().pending.len()
    }

    /// Configured window capacity
    pub fn window_size(&self) -> usize {
        self.config.window_size
    }
}

impl<T> Drop for StreamingBuffer<T> {
    fn drop(&mut self) {
        self.stop();
    }
}
