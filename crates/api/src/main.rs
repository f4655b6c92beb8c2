//! EyeGuard Server - Main Entry Point

use anyhow::Result;
use api::{init_logging, run_server, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let settings = Settings::load()?;

    info!("=== EyeGuard v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Starting screen wellness monitor on {}...", settings.bind_addr());

    run_server(settings).await?;

    Ok(())
}
