use anyhow::Result;
use clap::Parser;
use hrdesk_daemon::{Server, Settings, logging::init_logging};
use std::path::PathBuf;
use tracing::info;

/// hrdesk - session guard and edge gateway for the HR dashboard
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (TOML or YAML)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Directory holding the built front-end
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        settings.server.host = host;
    }
    if let Some(port) = cli.port {
        settings.server.port = port;
    }
    if let Some(static_dir) = cli.static_dir {
        settings.server.static_dir = Some(static_dir);
    }

    init_logging(&settings.logging)?;
    if let Some(config_path) = &cli.config {
        info!("Loaded configuration from: {}", config_path.display());
    }

    let server = Server::bind(&settings).await?;
    println!("Server running at: http://{}/", server.local_addr()?);

    server
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Received shutdown signal");
        })
        .await?;

    Ok(())
}
