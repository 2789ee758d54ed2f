//! Fingerprint scanner bridge core.
//!
//! This crate owns everything with state or concurrency concerns behind the
//! local fingerprint HTTP endpoint (see the `fpbridge-server` crate):
//!
//! - [`DeviceSession`]: exclusive owner of the one attached scanner. Every
//!   capture runs capture, buffer read and extraction under a single lock.
//! - [`TemplateStore`]: the most recently captured [`Template`], kept for
//!   the life of the process.
//! - [`MatchEngine`]: input validation in front of the verify collaborator.
//!
//! Vendor SDKs are reached only through the [`ScannerDriver`], [`Scanner`]
//! and [`TemplateMatcher`] traits. The [`sim`] module implements them
//! without hardware.
//!
//! ```
//! use std::sync::Arc;
//! use fpbridge::sim::{SimulatedDriver, SimulatedMatcher};
//! use fpbridge::{DeviceSession, MatchEngine, MatchOutcome, TemplateStore};
//!
//! let session = DeviceSession::initialize(&SimulatedDriver::default(), Default::default());
//! let store = TemplateStore::new();
//! let engine = MatchEngine::new(Arc::new(SimulatedMatcher::default()));
//!
//! let enrolled = session.enroll(&store).unwrap();
//! let live = session.capture_and_extract().unwrap();
//! let outcome = engine.verify(enrolled.as_bytes(), live.as_bytes()).unwrap();
//! assert_eq!(outcome, MatchOutcome::Matched);
//! ```

pub mod device;
pub mod driver;
pub mod error;
pub mod matching;
pub mod sim;
pub mod store;
pub mod template;

pub use device::{DeviceSession, SessionOptions};
pub use driver::{Scanner, ScannerDriver, TemplateMatcher};
pub use error::{CaptureFailure, DriverError, MatchFailure};
pub use matching::{MatchEngine, MatchOutcome};
pub use store::TemplateStore;
pub use template::{Extracted, MAX_TEMPLATE_LEN, RawImage, Template};
