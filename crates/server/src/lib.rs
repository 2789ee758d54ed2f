//! fpbridge server - local HTTP endpoint for fingerprint capture and matching
//!
//! Browser pages and desktop clients on the same machine use this server to
//! drive the attached fingerprint scanner:
//!
//! - **Capture**: read a finger, keep its template, return the template bytes
//! - **Match**: read a finger and verify it against the kept template
//! - **Match templates**: verify two client-supplied templates, no hardware
//!
//! Every response is a JSON envelope `{"success", "data", "message"}`; see
//! [`envelope`]. Domain failures (no scanner, no match, bad template) are
//! HTTP 200 with `success: false`. Unknown routes are 404 and internal
//! failures 500, both still enveloped.
//!
//! # API Endpoints
//!
//! - `GET|POST /capture`
//! - `GET|POST /match`
//! - `POST /matchtemplates` with `{"storedTemplate": <base64>, "newTemplate": <base64>}`
//! - `OPTIONS *` answers 200 with CORS headers only
//!
//! Paths are matched case-insensitively.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod envelope;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use envelope::{Envelope, EnvelopeData};
pub use error::{ProtocolError, ServerError, ServerResult};
pub use server::{build_app, build_router, run, start_server};
pub use state::ServerState;
