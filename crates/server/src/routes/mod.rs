//! API route handlers
//!
//! - `capture`: enroll a fingerprint from the scanner
//! - `matching`: verify a live capture against the stored template, or two
//!   client-supplied templates against each other
//!
//! Domain outcomes, failures included, are 200 responses carrying an
//! [`Envelope`]; clients branch on `success`.

pub mod capture;
pub mod matching;

use crate::envelope::Envelope;
use crate::error::ProtocolError;
use fpbridge::{CaptureFailure, MatchFailure};

pub const CAPTURED: &str = "Fingerprint captured.";
pub const SCANNER_NOT_READY: &str = "Scanner is not ready.";
pub const CAPTURE_FIRST: &str = "Capture a fingerprint first.";
pub const FINGERPRINT_MATCHED: &str = "Fingerprint matched.";
pub const FINGERPRINT_NOT_MATCHED: &str = "Fingerprint does not match.";
pub const TEMPLATES_MATCHED: &str = "Templates matched.";
pub const TEMPLATES_NOT_MATCHED: &str = "Templates do not match.";
pub const TEMPLATES_REQUIRED: &str = "Both templates are required.";

/// 404 handler for unknown paths and unsupported methods on known paths.
pub async fn not_found() -> ProtocolError {
    ProtocolError::UnknownRoute
}

pub(crate) fn capture_failure(failure: CaptureFailure) -> Envelope {
    match failure {
        CaptureFailure::NoDevice => Envelope::failure(SCANNER_NOT_READY),
        other => {
            tracing::warn!(stage = other.stage(), error = %other, "capture failed");
            Envelope::failure(format!("Failed to capture fingerprint: {other}"))
        }
    }
}

pub(crate) fn match_failure(failure: MatchFailure) -> Envelope {
    Envelope::failure(format!("Match failed: {failure}"))
}
