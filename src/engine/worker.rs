//! Background worker for eager LOD precomputation
//!
//! Reductions for the ladder levels run off the owning thread; results are
//! published back over a channel and integrated when the engine polls.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::{self, JoinHandle};

use crate::sample::{self, SamplingStrategy};

/// Requests that can be sent to the background worker
pub enum WorkerRequest<T> {
    /// Reduce a shared series to one ladder level
    Precompute {
        generation: u64,
        level: usize,
        data: Arc<[T]>,
        strategy: SamplingStrategy,
    },
    /// Shutdown the worker
    Shutdown,
}

/// Results returned from the background worker
pub enum WorkerResult<T> {
    /// One ladder level finished
    LevelReady {
        generation: u64,
        level: usize,
        points: Vec<T>,
    },
}

/// Worker thread computing ladder reductions off the owning context
pub struct LodWorker<T> {
    tx: Sender<WorkerRequest<T>>,
    rx: Receiver<WorkerResult<T>>,
    handle: Option<JoinHandle<()>>,
}

impl<T: Clone + Send + Sync + 'static> LodWorker<T> {
    /// Spawn a new background worker thread
    pub fn spawn() -> Self {
        let (req_tx, req_rx) = channel::<WorkerRequest<T>>();
        let (res_tx, res_rx) = channel::<WorkerResult<T>>();

        let handle = thread::spawn(move || {
            Self::worker_loop(req_rx, res_tx);
        });

        Self {
            tx: req_tx,
            rx: res_rx,
            handle: Some(handle),
        }
    }

    fn worker_loop(rx: Receiver<WorkerRequest<T>>, tx: Sender<WorkerResult<T>>) {
        while let Ok(request) = rx.recv() {
            match request {
                WorkerRequest::Precompute {
                    generation,
                    level,
                    data,
                    strategy,
                } => {
                    // Ladder levels are always >= 2, so this cannot fail
                    let Ok(points) = sample::reduce(&data, level, strategy) else {
                        continue;
                    };
                    let result = WorkerResult::LevelReady {
                        generation,
                        level,
                        points,
                    };
                    if tx.send(result).is_err() {
                        break;
                    }
                }
                WorkerRequest::Shutdown => break,
            }
        }
    }

    /// Send a request to the worker (non-blocking)
    pub fn request(&self, req: WorkerRequest<T>) {
        let _ = self.tx.send(req);
    }

    /// Poll for completed work (non-blocking)
    pub fn poll(&self) -> Option<WorkerResult<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => None,
        }
    }
}

impl<T> Drop for LodWorker<T> {
    fn drop(&mut self) {
        let _ = self.tx.send(WorkerRequest::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_worker_computes_level() {
        let worker: LodWorker<usize> = LodWorker::spawn();
        let data: Arc<[usize]> = (0..1_000).collect::<Vec<_>>().into();

        worker.request(WorkerRequest::Precompute {
            generation: 1,
            level: 100,
            data,
            strategy: SamplingStrategy::Uniform,
        });

        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(WorkerResult::LevelReady {
                generation,
                level,
                points,
            }) = worker.poll()
            {
                assert_eq!(generation, 1);
                assert_eq!(level, 100);
                assert_eq!(points.len(), 100);
                assert_eq!(points[0], 0);
                assert_eq!(points[99], 999);
                break;
            }
            assert!(Instant::now() < deadline, "worker never answered");
            thread::sleep(Duration::from_millis(2));
        }
    }
}
