//! # Storage Backends
//!
//! Where save bytes live. A backend stores one blob and hands it back; the
//! format is not its concern.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{StoreError, StoreResult};

/// Durable storage for one save.
///
/// Backends move onto the writer thread after the initial load.
pub trait SaveBackend: Send + 'static {
    /// Returns the stored save, or `None` for a fresh world.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the storage exists but cannot be read.
    fn load(&mut self) -> StoreResult<Option<Vec<u8>>>;

    /// Replaces the stored save.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the write fails. The previous save must
    /// remain readable in that case.
    fn store(&mut self, bytes: &[u8]) -> StoreResult<()>;
}

/// A save file on disk, replaced atomically via a temp file and rename.
#[derive(Clone, Debug)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Creates a backend for a save path. Nothing is touched until the
    /// first load or store.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The save path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl SaveBackend for FileBackend {
    fn load(&mut self) -> StoreResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(format!(
                "Failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn store(&mut self, bytes: &[u8]) -> StoreResult<()> {
        let temp = self.temp_path();
        let io = |what: &str, e: std::io::Error| {
            StoreError::Io(format!("Failed to {what} {}: {e}", temp.display()))
        };

        let mut file = fs::File::create(&temp).map_err(|e| io("create", e))?;
        std::io::Write::write_all(&mut file, bytes).map_err(|e| io("write", e))?;
        file.sync_all().map_err(|e| io("sync", e))?;
        drop(file);

        fs::rename(&temp, &self.path).map_err(|e| {
            StoreError::Io(format!("Failed to replace {}: {e}", self.path.display()))
        })
    }
}

/// An in-memory save shared between clones, with switchable failure
/// injection. Used by tests and by hosts that persist elsewhere.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    bytes: Arc<Mutex<Option<Vec<u8>>>>,
    failing: Arc<AtomicBool>,
    stores: Arc<AtomicU64>,
}

impl MemoryBackend {
    /// An empty backend: loads as a fresh world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend preloaded with a save.
    #[must_use]
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        let backend = Self::default();
        *backend.bytes.lock() = Some(bytes);
        backend
    }

    /// The currently stored save.
    #[must_use]
    pub fn bytes(&self) -> Option<Vec<u8>> {
        self.bytes.lock().clone()
    }

    /// Makes every following store fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of successful stores.
    #[must_use]
    pub fn store_count(&self) -> u64 {
        self.stores.load(Ordering::SeqCst)
    }
}

impl SaveBackend for MemoryBackend {
    fn load(&mut self) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.bytes())
    }

    fn store(&mut self, bytes: &[u8]) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Io("storage unavailable".to_string()));
        }
        *self.bytes.lock() = Some(bytes.to_vec());
        self.stores.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
