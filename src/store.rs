//! On-disk screenshot store.
//!
//! Each capture becomes one PNG file under the store root. File names
//! carry a monotonic sequence number (uniqueness, even for identical
//! captures) and a sha256 prefix (content addressability). Queue state
//! itself is in-memory only; these files are ephemeral working storage.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use base64::Engine as _;
use sha2::{Digest, Sha256};

use crate::error::StoreError;

pub struct ShotStore {
    root: PathBuf,
    seq: AtomicU64,
}

impl ShotStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            seq: AtomicU64::new(1),
        })
    }

    /// Store under the platform data dir, e.g.
    /// `~/.local/share/snapsolve/screenshots` on Linux.
    pub fn in_default_location() -> Result<Self, StoreError> {
        let base = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        Self::new(base.join("snapsolve").join("screenshots"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist PNG bytes; returns the new file's path, the handle used
    /// everywhere else in the crate.
    pub fn write(&self, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        let digest = Sha256::digest(bytes);
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let name = format!("shot-{:04}-{:.12}.png", seq, hex_string(digest.as_slice()));
        let path = self.root.join(name);
        std::fs::write(&path, bytes)?;
        log::info!("[STORE] Wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    pub fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
        std::fs::read(path).map_err(|e| not_found_or_io(e, path))
    }

    pub fn delete(&self, path: &Path) -> Result<(), StoreError> {
        std::fs::remove_file(path).map_err(|e| not_found_or_io(e, path))?;
        log::info!("[STORE] Deleted {}", path.display());
        Ok(())
    }

    /// Read-only rendering of one screenshot for display.
    pub fn preview(&self, path: &Path) -> Result<String, StoreError> {
        let bytes = self.read(path)?;
        Ok(format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(bytes)
        ))
    }
}

fn not_found_or_io(e: std::io::Error, path: &Path) -> StoreError {
    if e.kind() == std::io::ErrorKind::NotFound {
        StoreError::NotFound {
            path: path.display().to_string(),
        }
    } else {
        StoreError::Io(e)
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
