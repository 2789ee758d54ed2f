use crate::envelope::Envelope;
use crate::error::ServerResult;
use crate::routes::{capture_failure, CAPTURED};
use crate::state::ServerState;
use axum::extract::State;
use std::sync::Arc;
use tokio::task;

/// Capture a fingerprint and make it the stored template.
///
/// Blocks until the scanner is free and the finger has been read. On
/// success `data` carries the template bytes.
pub async fn capture(State(state): State<Arc<ServerState>>) -> ServerResult<Envelope> {
    let session = Arc::clone(&state.session);
    let store = Arc::clone(&state.store);

    let result = task::spawn_blocking(move || session.enroll(&store)).await?;

    Ok(match result {
        Ok(template) => {
            tracing::info!(bytes = template.len(), "fingerprint enrolled");
            Envelope::success(template, CAPTURED)
        }
        Err(failure) => capture_failure(failure),
    })
}
