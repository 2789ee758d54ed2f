//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration for the three fingerprint operations
//! - Middleware stack (CORS, request ids, logging, panic recovery)
//! - Case-insensitive path matching
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::envelope::Envelope;
use crate::middleware::{cors, log_requests, normalize_path, request_id};
use crate::routes::{capture, matching, not_found};
use crate::state::ServerState;
use axum::extract::{DefaultBodyLimit, Request};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Router, ServiceExt};
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::util::{MapRequest, MapRequestLayer};
use tower::Layer;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

/// Router wrapped with path normalization, ready to serve.
pub type App = MapRequest<Router, fn(Request) -> Request>;

/// Build the Axum router with all routes and middleware
///
/// Routes:
/// - `GET|POST /capture`
/// - `GET|POST /match`
/// - `POST /matchtemplates`
///
/// Everything else, including other methods on these paths, is a 404
/// envelope. `get` also answers `HEAD`, so `HEAD` is routed to the 404
/// explicitly and never reaches the scanner. Middleware stack, outermost first:
/// 1. HTTP tracing
/// 2. CORS headers and `OPTIONS` short-circuit
/// 3. Request ID tracking
/// 4. Request logging
/// 5. Panic recovery into a 500 envelope
pub fn build_router(state: Arc<ServerState>) -> Router {
    let max_body = state.config.max_body_size();

    Router::new()
        .route(
            "/capture",
            get(capture::capture)
                .post(capture::capture)
                .head(not_found)
                .fallback(not_found),
        )
        .route(
            "/match",
            get(matching::match_stored)
                .post(matching::match_stored)
                .head(not_found)
                .fallback(not_found),
        )
        .route(
            "/matchtemplates",
            post(matching::match_templates).fallback(not_found),
        )
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(from_fn(cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the router and put case-insensitive path matching in front of it.
pub fn build_app(state: Arc<ServerState>) -> App {
    MapRequestLayer::new(normalize_path as fn(Request) -> Request).layer(build_router(state))
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Envelope::failure(format!("Internal server error: {detail}")),
    )
        .into_response()
}

/// Serve `state` on `listener` until `shutdown` resolves.
///
/// In-flight requests are drained before this returns. The scanner is
/// released afterwards.
pub async fn run<F>(listener: TcpListener, state: Arc<ServerState>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(Arc::clone(&state));
    let result = axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown)
        .await;

    state.shutdown();
    result
}

/// Start the fingerprint HTTP server
///
/// Initializes logging, creates the device session and shared state, binds
/// the configured address and serves until SIGTERM or Ctrl+C.
///
/// A missing scanner is not fatal: capture requests then fail with
/// "Scanner is not ready." while `/matchtemplates` keeps working. Failing to
/// bind the port is fatal.
///
/// # Example
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     server::start_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_new(&config.log_level)?)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json()
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))?;

    let addr = config.socket_addr()?;
    let backend = config.device.backend;
    let state = Arc::new(ServerState::new(config)?);

    tracing::info!(
        backend = ?backend,
        scanner = state.session.scanner_id().as_deref().unwrap_or("none"),
        "Device session initialized"
    );

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    run(listener, state, shutdown_signal()).await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
