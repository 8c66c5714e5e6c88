//! # Store Error Types
//!
//! Everything that can go wrong between the change log and durable storage.
//! Gameplay never sees these: the session logs them and keeps going.

use burrow_world::WorldError;
use thiserror::Error;

/// Errors from loading, saving or the background writer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Reading or writing the backing storage failed.
    #[error("storage I/O failed: {0}")]
    Io(String),

    /// The data does not start with the save magic.
    #[error("not a save file (magic {0:?})")]
    BadMagic([u8; 4]),

    /// Written by another schema version. There is no migration.
    #[error("unsupported save version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version in the file.
        found: u32,
        /// Version this build reads.
        expected: u32,
    },

    /// The CRC32 trailer does not match the contents.
    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// Trailer value.
        stored: u32,
        /// Checksum of the data.
        computed: u32,
    },

    /// The data ends before a complete save.
    #[error("truncated save: needed {needed} bytes, found {found}")]
    Truncated {
        /// Bytes required.
        needed: usize,
        /// Bytes present.
        found: usize,
    },

    /// The save was written for a grid of another width, so its indices
    /// would land on the wrong cells.
    #[error("save is for a grid {saved} wide, configured width is {configured}")]
    WidthMismatch {
        /// Width in the save.
        saved: u32,
        /// Width in the config.
        configured: u32,
    },

    /// The change-log body does not decompress.
    #[error("corrupt change log body: {0}")]
    Decompression(String),

    /// More entries than the format can count.
    #[error("change log too large to save: {0} entries")]
    TooManyEntries(usize),

    /// The background writer has stopped.
    #[error("save writer has shut down")]
    WriterShutDown,

    /// World construction or replay failed.
    #[error(transparent)]
    World(#[from] WorldError),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
