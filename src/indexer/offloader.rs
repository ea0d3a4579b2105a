//! Background offload worker: drains batches of in-memory postings to
//! on-disk shards using a bounded pool of merge workers.

use crate::model::{RangeKey, Shard, ALL_RANGE_KEYS};
use crate::Result;
use log::{debug, warn};
use parking_lot::{Condvar, Mutex};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub type ShardBatch = HashMap<RangeKey, Shard>;

/// Shared handoff point between the producer thread and the offloader
/// thread: a FIFO queue of batches waiting to be merged to disk, plus a
/// flag the producer sets once it has no more documents to feed in.
///
/// The queue is unbounded rather than a single slot: if the offloader
/// is still merging (or hasn't yet been scheduled) when the producer
/// crosses the offload threshold again, the new batch must queue behind
/// the old one, never replace it, or postings recorded in memory would
/// be silently dropped instead of eventually reaching disk.
#[derive(Default)]
pub struct OffloadState {
    pending: VecDeque<ShardBatch>,
    producer_done: bool,
}

pub type OffloadSync = Arc<(Mutex<OffloadState>, Condvar)>;

pub struct OffloadHandle {
    pub state: OffloadSync,
}

impl OffloadHandle {
    pub fn new() -> Self {
        Self { state: Arc::new((Mutex::new(OffloadState::default()), Condvar::new())) }
    }

    /// Queue a batch for the offloader and wake it up.
    pub fn submit(&self, batch: ShardBatch) {
        let (mutex, condvar) = &*self.state;
        let mut state = mutex.lock();
        state.pending.push_back(batch);
        condvar.notify_one();
    }

    /// Signal that no further batches will be submitted. The offloader
    /// drains any still-pending batch before exiting.
    pub fn finish(&self) {
        let (mutex, condvar) = &*self.state;
        let mut state = mutex.lock();
        state.producer_done = true;
        condvar.notify_one();
    }
}

/// Runs on its own thread. Blocks on the condvar until a batch is
/// submitted or the producer signals completion, merging each batch
/// into the on-disk shards with a bounded-parallelism rayon pool before
/// going back to sleep.
///
/// A merge failure is logged and then aborts the build: a half-applied
/// merge can leave a shard file permanently missing postings with no
/// way for a later build to detect it short of a full rebuild, so this
/// implementation chooses to propagate rather than continue past it.
pub fn run(handle: OffloadSync, index_dir: PathBuf, pool: ThreadPool) -> Result<()> {
    let (mutex, condvar) = &*handle;
    loop {
        let batch = {
            let mut state = mutex.lock();
            loop {
                if let Some(batch) = state.pending.pop_front() {
                    break Some(batch);
                }
                if state.producer_done {
                    break None;
                }
                condvar.wait(&mut state);
            }
        };

        match batch {
            Some(batch) => {
                if let Err(err) = merge_batch_to_disk(&batch, &index_dir, &pool) {
                    warn!("offload merge failed: {err}");
                    return Err(err);
                }
            }
            None => break,
        }
    }
    debug!("offloader thread exiting");
    Ok(())
}

/// Merge one in-memory batch into the on-disk shards, one range key per
/// worker, bounded by the pool's configured parallelism.
fn merge_batch_to_disk(batch: &ShardBatch, index_dir: &Path, pool: &ThreadPool) -> Result<()> {
    pool.install(|| -> Result<()> {
        ALL_RANGE_KEYS
            .to_vec()
            .into_par_iter()
            .map(|range_key| {
                let in_memory = match batch.get(&range_key) {
                    Some(shard) if !shard.is_empty() => shard,
                    _ => return Ok(()),
                };
                let path = Shard::path_for(index_dir, range_key);
                let mut on_disk = Shard::load(&path)?.unwrap_or_default();
                on_disk.merge_from(in_memory);
                on_disk.store(&path)
            })
            .collect::<Result<Vec<()>>>()?;
        Ok(())
    })
}
