//! Uniform response envelope.
//!
//! Every endpoint answers with `{"success": bool, "data": ..., "message": str}`.
//! `data` is `null`, a base64 string carrying template bytes, or a plain
//! string, depending on the operation. Clients branch on `success` and
//! `message`, never on the shape of `data`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fpbridge::Template;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeData {
    /// Serialized as standard base64.
    Bytes(Vec<u8>),
    Text(String),
}

impl Serialize for EnvelopeData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EnvelopeData::Bytes(bytes) => {
                serializer.serialize_str(&Template::new(bytes.as_slice()).to_base64())
            }
            EnvelopeData::Text(text) => serializer.serialize_str(text),
        }
    }
}

impl From<Template> for EnvelopeData {
    fn from(template: Template) -> Self {
        EnvelopeData::Bytes(template.into_bytes())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub success: bool,
    pub data: Option<EnvelopeData>,
    pub message: String,
}

impl Envelope {
    pub fn new(success: bool, data: Option<EnvelopeData>, message: impl Into<String>) -> Self {
        Self {
            success,
            data,
            message: message.into(),
        }
    }

    pub fn success(data: impl Into<EnvelopeData>, message: impl Into<String>) -> Self {
        Self::new(true, Some(data.into()), message)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(false, None, message)
    }

    /// Failure that still carries a payload, e.g. a "does not match" verdict.
    pub fn rejection(data: impl Into<EnvelopeData>, message: impl Into<String>) -> Self {
        Self::new(false, Some(data.into()), message)
    }
}

impl From<&str> for EnvelopeData {
    fn from(text: &str) -> Self {
        EnvelopeData::Text(text.to_string())
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_data_is_serialized() {
        let value = serde_json::to_value(Envelope::failure("Not found.")).unwrap();
        assert_eq!(
            value,
            json!({"success": false, "data": null, "message": "Not found."})
        );
    }

    #[test]
    fn bytes_become_base64() {
        let envelope = Envelope::success(Template::new(vec![1, 2, 3]), "Fingerprint captured.");
        let value = serde_json::to_value(envelope).unwrap();
        assert_eq!(value["data"], json!("AQID"));
        assert_eq!(value["success"], json!(true));
    }

    #[test]
    fn text_data_passes_through() {
        let envelope = Envelope::rejection("Fingerprint does not match.", "Fingerprint does not match.");
        let value = serde_json::to_value(envelope).unwrap();
        assert_eq!(value["data"], json!("Fingerprint does not match."));
        assert_eq!(value["success"], json!(false));
    }
}
