//! Screen capture domain — public API.
//!
//! The queue manager only knows the [`CaptureProvider`] trait; the xcap
//! implementation below is the one real backend. Grabbing is blocking
//! (the OS call is synchronous), so callers run it on a blocking thread.

mod screenshot;

pub use screenshot::PrimaryMonitorCapture;

use crate::error::CaptureError;

/// A sub-rectangle of the screen, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Produces PNG bytes for the current screen contents.
pub trait CaptureProvider: Send + Sync {
    /// Grab the screen (or a region of it) as encoded PNG bytes.
    /// Blocking; wrap in `spawn_blocking` from async contexts.
    fn grab(&self, region: Option<CaptureRegion>) -> Result<Vec<u8>, CaptureError>;
}
