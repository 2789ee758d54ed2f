//! Exclusive session over the single attached scanner.

use std::sync::{Mutex, MutexGuard};

use crate::driver::{Scanner, ScannerDriver};
use crate::error::CaptureFailure;
use crate::store::TemplateStore;
use crate::template::{MAX_TEMPLATE_LEN, Template};

/// Tuning for a [`DeviceSession`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Extractions scoring below this are rejected. `0` accepts everything.
    pub min_quality: u8,
}

struct Attached {
    id: String,
    scanner: Box<dyn Scanner>,
}

/// Owns the scanner handle and serializes every hardware operation.
///
/// The lock covers the full capture, buffer read and extract sequence, so two
/// captures never interleave on the device. A session without a scanner is
/// valid: every capture fails fast with [`CaptureFailure::NoDevice`].
pub struct DeviceSession {
    device: Mutex<Option<Attached>>,
    options: SessionOptions,
}

impl DeviceSession {
    /// Enumerate scanners through `driver` and take the first one.
    ///
    /// Never fails: a driver error or an empty enumeration leaves the session
    /// unavailable.
    pub fn initialize(driver: &dyn ScannerDriver, options: SessionOptions) -> Self {
        let attached = match driver.enumerate() {
            Ok(scanners) => {
                let count = scanners.len();
                let mut scanners = scanners.into_iter();
                match scanners.next() {
                    Some(scanner) => {
                        // Extra scanners are released immediately; only one is driven.
                        for mut extra in scanners {
                            tracing::debug!(scanner = extra.id(), "releasing unused scanner");
                            extra.release();
                        }
                        let id = scanner.id().to_string();
                        tracing::info!(
                            driver = driver.name(),
                            scanner = %id,
                            found = count,
                            "scanner ready"
                        );
                        Some(Attached { id, scanner })
                    }
                    None => {
                        tracing::warn!(driver = driver.name(), "no scanner found");
                        None
                    }
                }
            }
            Err(err) => {
                tracing::error!(driver = driver.name(), error = %err, "scanner enumeration failed");
                None
            }
        };

        Self {
            device: Mutex::new(attached),
            options,
        }
    }

    /// A session that never had a scanner.
    pub fn unavailable(options: SessionOptions) -> Self {
        Self {
            device: Mutex::new(None),
            options,
        }
    }

    /// Whether a scanner is attached. Blocks while a capture is in progress.
    pub fn is_available(&self) -> bool {
        self.lock().is_some()
    }

    /// Identifier of the attached scanner, if any.
    pub fn scanner_id(&self) -> Option<String> {
        self.lock().as_ref().map(|attached| attached.id.clone())
    }

    /// Capture a fingerprint and extract its template as one atomic unit.
    pub fn capture_and_extract(&self) -> Result<Template, CaptureFailure> {
        let mut guard = self.lock();
        self.run_capture(&mut guard)
    }

    /// Capture and publish the result to `store` before releasing the device,
    /// so the store always reflects the most recent capture.
    pub fn enroll(&self, store: &TemplateStore) -> Result<Template, CaptureFailure> {
        let mut guard = self.lock();
        let template = self.run_capture(&mut guard)?;
        store.replace(template.clone());
        Ok(template)
    }

    /// Release the scanner. Later captures fail with `NoDevice`.
    pub fn shutdown(&self) {
        if let Some(mut attached) = self.lock().take() {
            tracing::info!(scanner = %attached.id, "releasing scanner");
            attached.scanner.release();
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Attached>> {
        // A panic inside a driver call leaves the handle in whatever state the
        // driver left it; the next capture decides whether it still works.
        self.device
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn run_capture(&self, device: &mut Option<Attached>) -> Result<Template, CaptureFailure> {
        let attached = device.as_mut().ok_or(CaptureFailure::NoDevice)?;
        let scanner = &mut *attached.scanner;

        scanner
            .capture_image()
            .map_err(CaptureFailure::DeviceCapture)?;
        let image = scanner.image_buffer().map_err(CaptureFailure::BufferRead)?;
        let extracted = scanner
            .extract(&image)
            .map_err(|err| CaptureFailure::Extraction(err.to_string()))?;

        let template = extracted.template;
        if template.is_empty() {
            return Err(CaptureFailure::Extraction("empty template".into()));
        }
        if template.len() > MAX_TEMPLATE_LEN {
            return Err(CaptureFailure::Extraction(format!(
                "template is {} bytes, limit is {MAX_TEMPLATE_LEN}",
                template.len()
            )));
        }
        if extracted.quality < self.options.min_quality {
            return Err(CaptureFailure::Extraction(format!(
                "quality {} below minimum {}",
                extracted.quality, self.options.min_quality
            )));
        }

        tracing::debug!(
            scanner = %attached.id,
            bytes = template.len(),
            quality = extracted.quality,
            "template extracted"
        );
        Ok(template)
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        let device = self
            .device
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(mut attached) = device.take() {
            attached.scanner.release();
        }
    }
}

impl std::fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSession")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
