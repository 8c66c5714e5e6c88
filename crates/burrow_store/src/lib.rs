//! # Burrow Store
//!
//! Durability for the Burrow world core.
//!
//! ## Guarantees
//!
//! 1. **Non-blocking**: Edits enqueue a snapshot and return immediately
//! 2. **Serialized**: One writer thread; saves never interleave
//! 3. **Latest wins**: Unwritten snapshots are replaced by newer ones
//! 4. **Checked**: Bad magic, other versions and corruption are rejected
//!
//! ## Core Components
//!
//! - `SaveData`: Seed + change log in the binary save format
//! - `SaveBackend`: File or in-memory storage for one save
//! - `SaveWriter`: The background single writer
//! - `Session`: Per-game context tying the world to its save
//!
//! ## Example
//!
//! ```rust,ignore
//! use burrow_store::{FileBackend, Session};
//! use burrow_world::WorldConfig;
//!
//! let config = WorldConfig::from_toml_file("world.toml")?;
//! let mut session = Session::open(&config, FileBackend::new("world.sav"))?;
//!
//! session.dig(10, 4);
//! println!("{}", session.depth());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod backend;
pub mod error;
pub mod save_format;
pub mod session;
pub mod writer;

pub use backend::{FileBackend, MemoryBackend, SaveBackend};
pub use error::{StoreError, StoreResult};
pub use save_format::{SaveData, SAVE_MAGIC, SAVE_VERSION};
pub use session::Session;
pub use writer::{SaveWriter, WriterStats};
