//! Collaborator interfaces for the scanner SDK and the template matcher.
//!
//! The service never talks to vendor libraries directly. A binding for a
//! concrete SDK implements these traits; [`crate::sim`] provides a simulated
//! pair for development and tests.

use crate::error::DriverError;
use crate::template::{Extracted, RawImage};

/// Entry point of a scanner SDK.
pub trait ScannerDriver: Send + Sync {
    /// Human readable driver name, for logs.
    fn name(&self) -> &str;

    /// Enumerate attached scanners. An empty list is not an error.
    fn enumerate(&self) -> Result<Vec<Box<dyn Scanner>>, DriverError>;
}

/// An opened scanner.
///
/// Calls block until the hardware answers. A handle is owned by exactly one
/// [`DeviceSession`](crate::DeviceSession) and is never called concurrently.
pub trait Scanner: Send {
    /// Serial number or other stable identifier.
    fn id(&self) -> &str;

    /// Acquire a single fingerprint image on the sensor.
    fn capture_image(&mut self) -> Result<(), DriverError>;

    /// Read back the image acquired by the last [`capture_image`](Self::capture_image).
    fn image_buffer(&mut self) -> Result<RawImage, DriverError>;

    /// Derive a template from a captured image.
    fn extract(&mut self, image: &RawImage) -> Result<Extracted, DriverError>;

    /// Release the underlying device handle. Called at most once.
    fn release(&mut self) {}
}

/// Template verification collaborator.
pub trait TemplateMatcher: Send + Sync {
    /// Compare `probe` against `reference`. Not assumed to be symmetric.
    fn verify(&self, reference: &[u8], probe: &[u8]) -> Result<bool, DriverError>;
}
