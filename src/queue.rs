//! Screenshot queues — two bounded FIFO buffers routed by view mode.
//!
//! The intake queue holds shots of the problem being entered; the
//! follow-up queue holds shots taken while reviewing a solution (input
//! to the debug pipeline). All queue mutation goes through
//! [`QueueManager`]; nothing else touches queue contents or storage.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::capture::CaptureProvider;
use crate::error::{CaptureError, StoreError};
use crate::store::ShotStore;

/// Each queue keeps this many screenshots; older ones are evicted.
pub const DEFAULT_QUEUE_CAPACITY: usize = 2;

/// Which view the user is in. Decides where new captures go and which
/// queue a pipeline run reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Entering a problem: captures land in the intake queue.
    Intake,
    /// Reviewing a solution: captures land in the follow-up queue.
    Review,
}

impl Mode {
    pub fn target_queue(self) -> QueueKind {
        match self {
            Mode::Intake => QueueKind::Intake,
            Mode::Review => QueueKind::Followup,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    Intake,
    Followup,
}

/// Owns the two queues and the capture provider + store they feed from.
pub struct QueueManager {
    capture: Arc<dyn CaptureProvider>,
    store: ShotStore,
    capacity: usize,
    intake: Mutex<VecDeque<PathBuf>>,
    followup: Mutex<VecDeque<PathBuf>>,
}

impl QueueManager {
    pub fn new(capture: Arc<dyn CaptureProvider>, store: ShotStore) -> Self {
        Self::with_capacity(capture, store, DEFAULT_QUEUE_CAPACITY)
    }

    /// Capacity is constant in the product; tests shrink or grow it
    /// without changing eviction semantics.
    pub fn with_capacity(
        capture: Arc<dyn CaptureProvider>,
        store: ShotStore,
        capacity: usize,
    ) -> Self {
        Self {
            capture,
            store,
            capacity,
            intake: Mutex::new(VecDeque::new()),
            followup: Mutex::new(VecDeque::new()),
        }
    }

    fn queue(&self, kind: QueueKind) -> &Mutex<VecDeque<PathBuf>> {
        match kind {
            QueueKind::Intake => &self.intake,
            QueueKind::Followup => &self.followup,
        }
    }

    /// Grab the screen, persist the PNG, and enqueue it on the queue the
    /// mode selects. At capacity the single oldest entry is evicted
    /// first; releasing its storage is best-effort.
    pub async fn capture(&self, mode: Mode) -> Result<PathBuf, CaptureError> {
        let provider = Arc::clone(&self.capture);
        let bytes = tokio::task::spawn_blocking(move || provider.grab(None))
            .await
            .map_err(|e| CaptureError::Screen {
                message: format!("capture worker join failed: {}", e),
            })??;

        let path = self.store.write(&bytes).map_err(CaptureError::Store)?;
        let kind = mode.target_queue();

        let (evicted, len) = {
            let mut q = self.queue(kind).lock().unwrap();
            let evicted = if q.len() >= self.capacity {
                q.pop_front()
            } else {
                None
            };
            q.push_back(path.clone());
            (evicted, q.len())
        };

        if let Some(old) = evicted {
            if let Err(e) = self.store.delete(&old) {
                log::warn!(
                    "[QUEUE] Could not release evicted screenshot {}: {}",
                    old.display(),
                    e
                );
            }
        }

        log::info!("[QUEUE] {:?} queue at {}/{}", kind, len, self.capacity);
        Ok(path)
    }

    /// Queue contents in capture order, oldest first. Non-mutating.
    pub fn list(&self, kind: QueueKind) -> Vec<PathBuf> {
        self.queue(kind).lock().unwrap().iter().cloned().collect()
    }

    /// Remove one screenshot from whichever queue holds it and release
    /// its storage. `NotFound` if neither queue has it.
    pub fn delete(&self, path: &Path) -> Result<(), StoreError> {
        for kind in [QueueKind::Intake, QueueKind::Followup] {
            let removed = {
                let mut q = self.queue(kind).lock().unwrap();
                match q.iter().position(|p| p == path) {
                    Some(pos) => {
                        q.remove(pos);
                        true
                    }
                    None => false,
                }
            };
            if removed {
                // The queue entry is authoritative; a file already gone
                // just means there is nothing left to release.
                if let Err(e) = self.store.delete(path) {
                    log::warn!("[QUEUE] Storage already gone for {}: {}", path.display(), e);
                }
                return Ok(());
            }
        }
        Err(StoreError::NotFound {
            path: path.display().to_string(),
        })
    }

    /// Empty one queue, releasing storage best-effort.
    pub fn clear(&self, kind: QueueKind) {
        let drained: Vec<PathBuf> = {
            let mut q = self.queue(kind).lock().unwrap();
            q.drain(..).collect()
        };
        for path in &drained {
            if let Err(e) = self.store.delete(path) {
                log::warn!("[QUEUE] Could not release {}: {}", path.display(), e);
            }
        }
        if !drained.is_empty() {
            log::info!("[QUEUE] Cleared {:?} queue ({} screenshots)", kind, drained.len());
        }
    }

    pub fn clear_all(&self) {
        self.clear(QueueKind::Intake);
        self.clear(QueueKind::Followup);
    }

    /// Raw PNG bytes of one stored screenshot.
    pub fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
        self.store.read(path)
    }

    /// Base64 data URL of one stored screenshot for display.
    pub fn preview(&self, path: &Path) -> Result<String, StoreError> {
        self.store.preview(path)
    }
}
