//! Biometric template and raw image types.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Upper bound on template size. Matches the extraction buffer handed to the
/// scanner SDK; anything longer is a truncated or corrupt extraction.
pub const MAX_TEMPLATE_LEN: usize = 1024;

/// Feature bytes extracted from a single capture.
///
/// Templates carry no identity beyond their bytes and are only ever compared
/// through a [`TemplateMatcher`](crate::TemplateMatcher). On the wire they are
/// standard base64 strings.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Template(Vec<u8>);

impl Template {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encode as standard base64.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    /// Decode from standard base64. Surrounding whitespace is ignored.
    pub fn from_base64(encoded: &str) -> Result<Self, base64::DecodeError> {
        STANDARD.decode(encoded.trim()).map(Self)
    }
}

impl From<Vec<u8>> for Template {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl AsRef<[u8]> for Template {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// Template bytes are biometric data; keep them out of logs.
impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Template({} bytes)", self.0.len())
    }
}

impl Serialize for Template {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Template {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Template::from_base64(&encoded).map_err(serde::de::Error::custom)
    }
}

/// Image buffer read back from the sensor after a capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Sensor resolution in DPI.
    pub resolution: u32,
}

/// Output of the extraction collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub template: Template,
    /// Vendor quality score, 0 (worst) to 100 (best).
    pub quality: u8,
}
