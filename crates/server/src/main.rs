//! fpbridge server binary
//!
//! Loads configuration from `fpbridge.*` and `FPBRIDGE__*` variables and
//! serves the fingerprint endpoint until interrupted.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::load()?;

    // Start server
    server::start_server(config).await?;

    Ok(())
}
