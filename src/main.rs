// src/main.rs

//! # Shiksha Wallet - Main Entry Point
//!
//! Loads configuration, prepares the credential store and starts the API
//! server. See [`shiksha_wallet::config`] for the environment variables read
//! at startup.

use anyhow::Context;
use dotenv::dotenv;
use log::info;
use shiksha_wallet::config::Settings;
use shiksha_wallet::services::api_server::ApiServer;
use shiksha_wallet::storage::memory::MemStorage;
use shiksha_wallet::storage::seed::seed_demo_data;
use shiksha_wallet::storage::Storage;
use std::net::SocketAddr;
use std::sync::Arc;

/// Main application entry point
///
/// # Initialization Sequence
/// 1. Load environment configuration
/// 2. Create the store and seed demo accounts if enabled
/// 3. Initialize service components
/// 4. Start API server
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load().context("failed to load settings")?;
    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address {}", settings.bind_addr))?;

    let store: Arc<dyn Storage> = Arc::new(MemStorage::new());
    if settings.seed_demo_data {
        seed_demo_data(store.as_ref(), &settings.registrar_issuer)
            .await
            .context("failed to seed demo data")?;
    }

    let api_server = ApiServer::new(&settings, store).context("failed to build API server")?;

    info!("Available endpoints:");
    info!("- POST /api/auth/login");
    info!("- POST /api/auth/register");
    info!("- GET  /api/auth/me");
    info!("- GET  /api/credentials");
    info!("- POST /api/credentials/issue");
    info!("- POST /api/credentials/verify");
    info!("- POST /api/credentials/:id/revoke");
    info!("- POST /api/attendance");
    info!("- GET  /api/attendance");
    info!("- GET  /api/admin/verifications");

    api_server.run(addr).await.context("API server failed")?;
    Ok(())
}
