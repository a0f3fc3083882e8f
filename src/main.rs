// Tutorgate - Normalized multi-provider tutoring-request gateway
// Main entry point

use anyhow::Result;

use tutorgate::config::load_config;
use tutorgate::server::GatewayServer;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (RUST_LOG controls verbosity)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tutorgate=info,tower_http=info".into()),
        )
        .init();

    let config = load_config()?;

    let server = GatewayServer::new(config)?;
    server.serve().await?;

    Ok(())
}
