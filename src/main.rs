use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use wordplay_engine::config::{load_config, load_default_config};
use wordplay_engine::engine::{Dictionary, GameRegistry};
use wordplay_engine::relay::RelayServer;

#[derive(Parser)]
#[command(name = "wordplay-engine", about = "Word-placement game engine and relay server")]
struct Cli {
    /// Path to wordplay.toml (default: auto-discover)
    #[arg(short, long, env = "WORDPLAY_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "WORDPLAY_PORT")]
    port: Option<u16>,

    /// Word-list file or directory of *.txt word lists
    #[arg(short, long, env = "WORDPLAY_DICTIONARY")]
    dictionary: Option<PathBuf>,

    /// Fixed RNG seed for reproducible games
    #[arg(long, env = "WORDPLAY_SEED")]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => load_config(path)?,
        None => load_default_config(),
    };
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(dictionary) = cli.dictionary {
        config.dictionary.path = dictionary;
    }
    if cli.seed.is_some() {
        config.game.seed = cli.seed;
    }

    let dictionary = Dictionary::load(&config.dictionary.path)
        .map_err(|e| format!("Failed to load dictionary: {}", e))?;
    tracing::info!(
        words = dictionary.word_count(),
        buckets = ?dictionary.bucket_sizes(),
        "dictionary ready"
    );

    let registry = GameRegistry::new(
        Arc::new(dictionary),
        config.game.max_players,
        config.game.seed,
    );
    let server = Arc::new(RelayServer::new(Arc::new(registry)));

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, max_players = config.game.max_players, "starting relay server");

    tokio::select! {
        result = server.serve(listener) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }

    Ok(())
}
