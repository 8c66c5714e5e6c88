//! # Save Writer
//!
//! **Single background writer, latest snapshot wins**
//!
//! Gameplay never waits on storage. Each accepted edit hands the writer a
//! full encoded snapshot and returns immediately.
//!
//! ## Architecture
//!
//! ```text
//!   dig ──┐
//!   undig ┼──> [pending slot] ──> [writer thread] ──> SaveBackend
//!   pit ──┘    (newest only)      (one store at a time)
//! ```
//!
//! The slot holds at most one snapshot. A snapshot enqueued while another is
//! still waiting replaces it, since only the latest state matters. Stores
//! are serialized on one thread, so two saves never interleave.
//!
//! A failed store is logged and counted. The next enqueue retries with the
//! newest state; if none comes, the failed snapshot is retried once more on
//! shutdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use crate::backend::SaveBackend;
use crate::error::{StoreError, StoreResult};

/// Counters for the writer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Snapshots handed to the writer.
    pub enqueued: u64,
    /// Snapshots replaced before they were written.
    pub coalesced: u64,
    /// Successful stores.
    pub writes: u64,
    /// Failed stores.
    pub failures: u64,
    /// Bytes successfully stored.
    pub bytes_written: u64,
    /// Error from the most recent store, if it failed.
    pub last_error: Option<String>,
}

/// The pending slot plus progress markers.
#[derive(Default)]
struct Slot {
    pending: Option<Vec<u8>>,
    /// Sequence number of the last enqueue.
    enqueued_seq: u64,
    /// Sequence number covered by the last store attempt.
    attempted_seq: u64,
    writer_exited: bool,
}

struct Shared {
    slot: Mutex<Slot>,
    /// Signals the writer: new snapshot or shutdown.
    wake: Condvar,
    /// Signals flushers: an attempt finished.
    progress: Condvar,
    shutdown: AtomicBool,
    stats: Mutex<WriterStats>,
}

/// Background persistence worker.
pub struct SaveWriter {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for SaveWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveWriter")
            .field("stats", &*self.shared.stats.lock())
            .finish_non_exhaustive()
    }
}

impl SaveWriter {
    /// Starts the writer thread, which takes ownership of the backend.
    pub fn spawn<B: SaveBackend>(backend: B) -> Self {
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot::default()),
            wake: Condvar::new(),
            progress: Condvar::new(),
            shutdown: AtomicBool::new(false),
            stats: Mutex::new(WriterStats::default()),
        });

        let writer_shared = Arc::clone(&shared);
        let handle = thread::spawn(move || {
            Self::writer_loop(backend, &writer_shared);
            writer_shared.slot.lock().writer_exited = true;
            writer_shared.progress.notify_all();
        });

        Self {
            shared,
            handle: Some(handle),
        }
    }

    /// Writer thread main loop.
    fn writer_loop<B: SaveBackend>(mut backend: B, shared: &Shared) {
        let mut failed: Option<Vec<u8>> = None;

        loop {
            let (bytes, seq) = {
                let mut slot = shared.slot.lock();
                while slot.pending.is_none() && !shared.shutdown.load(Ordering::Acquire) {
                    shared.wake.wait(&mut slot);
                }
                match slot.pending.take() {
                    Some(bytes) => (bytes, slot.enqueued_seq),
                    None => break,
                }
            };

            failed = Self::attempt(&mut backend, shared, bytes);
            shared.slot.lock().attempted_seq = seq;
            shared.progress.notify_all();
        }

        // Shutdown with nothing pending: one last try for a failed snapshot.
        if let Some(bytes) = failed {
            debug!("retrying failed save on shutdown");
            Self::attempt(&mut backend, shared, bytes);
        }
    }

    /// Stores one snapshot. Returns it back if the store failed.
    fn attempt<B: SaveBackend>(backend: &mut B, shared: &Shared, bytes: Vec<u8>) -> Option<Vec<u8>> {
        let result = backend.store(&bytes);
        let mut stats = shared.stats.lock();
        match result {
            Ok(()) => {
                stats.writes += 1;
                stats.bytes_written += bytes.len() as u64;
                stats.last_error = None;
                debug!(bytes = bytes.len(), writes = stats.writes, "save written");
                None
            }
            Err(e) => {
                stats.failures += 1;
                stats.last_error = Some(e.to_string());
                warn!(error = %e, failures = stats.failures, "save failed; will retry on next change");
                Some(bytes)
            }
        }
    }

    /// Hands a snapshot to the writer without waiting for it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::WriterShutDown` if the writer has stopped.
    pub fn enqueue(&self, bytes: Vec<u8>) -> StoreResult<()> {
        let mut slot = self.shared.slot.lock();
        if slot.writer_exited || self.shared.shutdown.load(Ordering::Acquire) {
            return Err(StoreError::WriterShutDown);
        }

        let replaced = slot.pending.replace(bytes).is_some();
        slot.enqueued_seq += 1;
        drop(slot);
        self.shared.wake.notify_one();

        let mut stats = self.shared.stats.lock();
        stats.enqueued += 1;
        if replaced {
            stats.coalesced += 1;
        }
        Ok(())
    }

    /// Blocks until everything enqueued so far has been attempted.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the latest attempt failed, or
    /// `StoreError::WriterShutDown` if the writer stopped first.
    pub fn flush(&self) -> StoreResult<()> {
        let mut slot = self.shared.slot.lock();
        let target = slot.enqueued_seq;
        while slot.attempted_seq < target {
            if slot.writer_exited {
                return Err(StoreError::WriterShutDown);
            }
            self.shared.progress.wait(&mut slot);
        }
        drop(slot);

        match &self.shared.stats.lock().last_error {
            Some(error) => Err(StoreError::Io(error.clone())),
            None => Ok(()),
        }
    }

    /// Returns current statistics.
    #[must_use]
    pub fn stats(&self) -> WriterStats {
        self.shared.stats.lock().clone()
    }

    /// Returns true if a snapshot is waiting to be written.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.shared.slot.lock().pending.is_some()
    }
}

impl Drop for SaveWriter {
    fn drop(&mut self) {
        // Signal shutdown; the writer drains the slot before exiting.
        self.shared.shutdown.store(true, Ordering::Release);
        {
            let slot = self.shared.slot.lock();
            self.shared.wake.notify_all();
            drop(slot);
        }

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
