use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod server;
mod zones;

#[derive(Debug, Parser)]
#[command(name = "adns-server")]
#[command(about = "Authoritative DNS server answering A queries from JSON zone files")]
struct Args {
    /// Address to listen for UDP queries on
    #[arg(short, long, default_value = "127.0.0.1:53")]
    bind: SocketAddr,

    /// Directory holding the *.zone files
    #[arg(short, long, value_name = "DIR", default_value = "zones")]
    zones: PathBuf,

    /// Log level used when RUST_LOG is not set (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let zones = zones::load_zones(&args.zones)?;
    info!("Serving {} zones", zones.len());

    let server = server::Server::bind(args.bind, Arc::new(zones)).await?;
    server.run().await
}
