//! EmberKV Server Binary
//!
//! Starts the TCP server for EmberKV.

use std::sync::Arc;

use clap::Parser;
use emberkv::config::DEFAULT_ADDR;
use emberkv::{Config, Server, Store};
use tracing_subscriber::{fmt, EnvFilter};

/// EmberKV Server
#[derive(Parser, Debug)]
#[command(name = "emberkv-server")]
#[command(about = "In-memory key-value store with a Redis-style protocol")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = DEFAULT_ADDR)]
    listen: String,

    /// Close connections idle for this long (milliseconds, 0 = never)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,

    /// Give up on replies blocked for this long (milliseconds, 0 = never)
    #[arg(long, default_value = "0")]
    write_timeout_ms: u64,

    /// Reject unframed, space-separated request lines
    #[arg(long)]
    no_inline: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,emberkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("EmberKV Server v{}", emberkv::VERSION);

    let config = Config::builder()
        .listen_addr(&args.listen)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .allow_inline(!args.no_inline)
        .build();

    let server = match Server::bind(config, Arc::new(Store::new())) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", args.listen, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
