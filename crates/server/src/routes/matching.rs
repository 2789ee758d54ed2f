use crate::envelope::Envelope;
use crate::error::{ProtocolError, ServerResult};
use crate::routes::{
    capture_failure, match_failure, CAPTURE_FIRST, FINGERPRINT_MATCHED, FINGERPRINT_NOT_MATCHED,
    TEMPLATES_MATCHED, TEMPLATES_NOT_MATCHED, TEMPLATES_REQUIRED,
};
use crate::state::ServerState;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use fpbridge::{MatchFailure, MatchOutcome, Template};
use serde::Deserialize;
use std::sync::Arc;
use tokio::task;

/// Body of `POST /matchtemplates`
#[derive(Debug, Deserialize)]
pub struct TemplateMatchRequest {
    #[serde(default, rename = "storedTemplate", alias = "StoredTemplate")]
    pub stored_template: Option<TemplateField>,

    #[serde(default, rename = "newTemplate", alias = "NewTemplate")]
    pub new_template: Option<TemplateField>,
}

/// Template bytes as sent by clients: a base64 string, or a plain array of
/// byte values.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TemplateField {
    Base64(String),
    Bytes(Vec<u8>),
}

impl TemplateField {
    pub fn decode(self) -> Result<Template, ProtocolError> {
        match self {
            TemplateField::Base64(encoded) => Template::from_base64(&encoded)
                .map_err(|err| ProtocolError::MalformedBody(format!("invalid base64: {err}"))),
            TemplateField::Bytes(bytes) => Ok(Template::new(bytes)),
        }
    }
}

/// Labels for the two verdicts an operation can return.
struct Verdicts {
    matched: &'static str,
    not_matched: &'static str,
}

const FINGERPRINT: Verdicts = Verdicts {
    matched: FINGERPRINT_MATCHED,
    not_matched: FINGERPRINT_NOT_MATCHED,
};

const TEMPLATES: Verdicts = Verdicts {
    matched: TEMPLATES_MATCHED,
    not_matched: TEMPLATES_NOT_MATCHED,
};

fn verdict(result: Result<MatchOutcome, MatchFailure>, labels: &Verdicts) -> Envelope {
    match result {
        Ok(MatchOutcome::Matched) => Envelope::success(labels.matched, labels.matched),
        Ok(MatchOutcome::NotMatched) => Envelope::rejection(labels.not_matched, labels.not_matched),
        Err(failure) => match_failure(failure),
    }
}

/// Capture a live fingerprint and verify it against the stored template.
pub async fn match_stored(State(state): State<Arc<ServerState>>) -> ServerResult<Envelope> {
    let Some(reference) = state.store.current() else {
        return Ok(Envelope::failure(CAPTURE_FIRST));
    };

    let session = Arc::clone(&state.session);
    let engine = state.engine.clone();
    let envelope = task::spawn_blocking(move || match session.capture_and_extract() {
        Ok(live) => {
            let result = engine.verify(reference.as_bytes(), live.as_bytes());
            tracing::info!(
                matched = matches!(result, Ok(MatchOutcome::Matched)),
                "live capture verified against stored template"
            );
            verdict(result, &FINGERPRINT)
        }
        Err(failure) => capture_failure(failure),
    })
    .await?;

    Ok(envelope)
}

/// Verify two client-supplied templates. Never touches the scanner.
pub async fn match_templates(
    State(state): State<Arc<ServerState>>,
    body: Result<Bytes, BytesRejection>,
) -> ServerResult<Envelope> {
    let request = match parse_request(body) {
        Ok(request) => request,
        Err(err) => {
            tracing::warn!(error = %err, "rejected matchtemplates body");
            return Ok(err.into_envelope());
        }
    };

    let (Some(stored), Some(incoming)) = (request.stored_template, request.new_template) else {
        return Ok(Envelope::failure(TEMPLATES_REQUIRED));
    };
    let (reference, probe) = match (stored.decode(), incoming.decode()) {
        (Ok(reference), Ok(probe)) => (reference, probe),
        (Err(err), _) | (_, Err(err)) => return Ok(err.into_envelope()),
    };
    if reference.is_empty() || probe.is_empty() {
        return Ok(Envelope::failure(TEMPLATES_REQUIRED));
    }

    let engine = state.engine.clone();
    let result =
        task::spawn_blocking(move || engine.verify(reference.as_bytes(), probe.as_bytes())).await?;

    Ok(verdict(result, &TEMPLATES))
}

fn parse_request(body: Result<Bytes, BytesRejection>) -> Result<TemplateMatchRequest, ProtocolError> {
    let bytes = body.map_err(|rejection| ProtocolError::MalformedBody(rejection.body_text()))?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ProtocolError::MalformedBody("empty body".to_string()));
    }
    serde_json::from_slice(&bytes).map_err(|err| ProtocolError::MalformedBody(err.to_string()))
}

impl ProtocolError {
    fn into_envelope(self) -> Envelope {
        Envelope::failure(self.to_string())
    }
}
