use anyhow::Context;
use pmoconfig::Config;
use pmomediaserver::MediaServer;
use pmoserver::init_logging;
use pmoupnp::devices::DESCRIPTION_ROUTE;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ========== PHASE 1 : Configuration ==========
    // Répertoire de configuration explicite en premier argument, sinon
    // PMOMEDIASERVER_CONFIG, ./.pmomediaserver ou ~/.pmomediaserver.
    let config_dir = std::env::args().nth(1).unwrap_or_default();
    let config = Config::load_config(&config_dir).context("Cannot load configuration")?;
    init_logging(&config)?;
    info!("⚙️ Configuration loaded from {}", config.directory());

    // ========== PHASE 2 : Composition ==========
    let server = MediaServer::from_config(&config).context("Cannot compose MediaServer")?;
    info!(
        "📡 {} ({}) ready",
        server.device().friendly_name(),
        server.device().udn()
    );

    // ========== PHASE 3 : Service ==========
    server.start().context("Cannot start MediaServer")?;
    info!(
        "✅ MediaServer ready at {}{}",
        server.network().base_url(),
        DESCRIPTION_ROUTE
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl_c")?;
    info!("Ctrl+C reçu, arrêt gracieux");

    if !server.stop() {
        warn!("⚠️ MediaServer did not stop cleanly");
    }
    Ok(())
}
