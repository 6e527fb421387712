#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Prefetch cache and background generation pipeline.
//!
//! A single worker thread runs the same bounded generation algorithm the
//! interactive path uses, ahead of need, so large-grid levels never stall
//! frame delivery. The two contexts share nothing mutable: requests and
//! completed layouts cross the boundary as plain-data messages over one-way
//! channels, and the cache is keyed purely by level index so out-of-order
//! completion is harmless. A cache miss is never an error, only a latency
//! cost; callers fall back to generating synchronously.

use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};
use snake_escape_core::{LevelIndex, LevelLayout};
use snake_escape_system_generation::Generator;

/// Number of upcoming levels scheduled ahead of the player's position.
pub const LOOKAHEAD: u32 = 3;

/// Request message delivered to the background worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerRequest {
    /// Asks the worker to generate the layout for one level.
    Generate {
        /// Level index to generate.
        level: LevelIndex,
    },
}

/// Completed generation result sent back from the worker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkerResponse {
    /// Level index the layout belongs to.
    pub level: LevelIndex,
    /// Generated layout, already validated by the oracle.
    pub layout: LevelLayout,
}

/// Look-ahead buffer of generated levels backed by a worker thread.
///
/// Entries are retained after a read so a retried level costs nothing, and
/// stale entries for passed levels are merely wasted memory, never wrong
/// answers.
#[derive(Debug)]
pub struct Prefetcher {
    requests: Option<Sender<WorkerRequest>>,
    results: Receiver<WorkerResponse>,
    cache: HashMap<LevelIndex, LevelLayout>,
    pending: HashSet<LevelIndex>,
    worker: Option<JoinHandle<()>>,
}

impl Prefetcher {
    /// Starts the background worker around its own generator instance.
    #[must_use]
    pub fn spawn(generator: Generator) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<WorkerRequest>();
        let (result_tx, result_rx) = mpsc::channel::<WorkerResponse>();

        let worker = thread::spawn(move || {
            while let Ok(WorkerRequest::Generate { level }) = request_rx.recv() {
                let layout = generator.generate(level);
                if result_tx.send(WorkerResponse { level, layout }).is_err() {
                    break;
                }
            }
        });

        Self {
            requests: Some(request_tx),
            results: result_rx,
            cache: HashMap::new(),
            pending: HashSet::new(),
            worker: Some(worker),
        }
    }

    /// Schedules background generation for the provided level.
    ///
    /// Fire-and-forget and idempotent: already-cached and in-flight levels
    /// are no-ops. A dead worker also degrades to a no-op, leaving a
    /// permanent cache miss that the caller's synchronous fallback absorbs.
    pub fn request_generation(&mut self, level: LevelIndex) {
        self.drain_completed();
        if self.cache.contains_key(&level) || self.pending.contains(&level) {
            return;
        }

        let Some(requests) = &self.requests else {
            return;
        };
        if requests.send(WorkerRequest::Generate { level }).is_ok() {
            let _ = self.pending.insert(level);
        }
    }

    /// Returns the cached layout for the level, if generation has completed.
    #[must_use]
    pub fn try_get(&mut self, level: LevelIndex) -> Option<LevelLayout> {
        self.drain_completed();
        self.cache.get(&level).cloned()
    }

    /// Schedules the look-ahead window beyond the player's current level.
    pub fn preload(&mut self, current: LevelIndex) {
        for step in 1..=LOOKAHEAD {
            self.request_generation(LevelIndex::new(current.get() + step));
        }
    }

    /// Reports whether a completed layout is buffered for the level.
    #[must_use]
    pub fn is_buffered(&mut self, level: LevelIndex) -> bool {
        self.drain_completed();
        self.cache.contains_key(&level)
    }

    /// Moves completed worker responses into the cache without blocking.
    fn drain_completed(&mut self) {
        loop {
            match self.results.try_recv() {
                Ok(response) => {
                    let _ = self.pending.remove(&response.level);
                    let _ = self.cache.insert(response.level, response.layout);
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
    }
}

impl Drop for Prefetcher {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop; any in-flight
        // generation finishes within its own budgets before the join.
        drop(self.requests.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{WorkerRequest, WorkerResponse};
    use snake_escape_core::{GridSize, LevelIndex, LevelLayout};

    #[test]
    fn worker_messages_round_trip_as_plain_data() {
        let request = WorkerRequest::Generate {
            level: LevelIndex::new(12),
        };
        let encoded = serde_json::to_string(&request).expect("serialize request");
        let decoded: WorkerRequest = serde_json::from_str(&encoded).expect("deserialize request");
        assert_eq!(decoded, request);

        let response = WorkerResponse {
            level: LevelIndex::new(12),
            layout: LevelLayout {
                level: LevelIndex::new(12),
                grid: GridSize::new(6),
                snakes: Vec::new(),
                obstacles: Vec::new(),
                challenge: true,
                move_buffer: 0,
            },
        };
        let encoded = serde_json::to_string(&response).expect("serialize response");
        let decoded: WorkerResponse = serde_json::from_str(&encoded).expect("deserialize response");
        assert_eq!(decoded, response);
    }
}
