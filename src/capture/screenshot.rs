//! Primary monitor capture via xcap.

use image::DynamicImage;

use super::{CaptureProvider, CaptureRegion};
use crate::error::CaptureError;

/// Captures the primary monitor; falls back to the first monitor when
/// the OS doesn't flag one as primary.
pub struct PrimaryMonitorCapture;

impl CaptureProvider for PrimaryMonitorCapture {
    fn grab(&self, region: Option<CaptureRegion>) -> Result<Vec<u8>, CaptureError> {
        let start = std::time::Instant::now();

        let monitors = xcap::Monitor::all().map_err(|e| CaptureError::Screen {
            message: e.to_string(),
        })?;
        let monitor = monitors
            .iter()
            .find(|m| m.is_primary().unwrap_or(false))
            .or_else(|| monitors.first())
            .ok_or(CaptureError::NoMonitor)?;

        let rgba = monitor.capture_image().map_err(|e| CaptureError::Screen {
            message: e.to_string(),
        })?;
        let mut full = DynamicImage::ImageRgba8(rgba);
        if let Some(r) = region {
            full = full.crop_imm(r.x, r.y, r.width, r.height);
        }

        // Encode to PNG in memory, no temp file.
        let mut png_bytes = Vec::new();
        full.write_to(
            &mut std::io::Cursor::new(&mut png_bytes),
            image::ImageFormat::Png,
        )
        .map_err(|e| CaptureError::Encode {
            message: e.to_string(),
        })?;

        log::info!(
            "[CAPTURE] Grabbed {}x{} in {}ms ({} bytes)",
            full.width(),
            full.height(),
            start.elapsed().as_millis(),
            png_bytes.len()
        );
        Ok(png_bytes)
    }
}
