use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use anchor::api::{self, AppState};
use anchor::clients::{BibleClient, OpenAiClient, SpeechifyClient, StorageClient};
use anchor::config::Config;
use anchor::services::audio::AudioService;
use anchor::services::usage::UsageLimiter;
use anchor::services::votd::VerseOfDayService;
use anchor_core::db::Database;

#[derive(Parser)]
#[command(name = "anchor-api")]
#[command(about = "Backend API for the Anchor daily verse app")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port for the HTTP API (overrides $PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "anchor=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let port = match cli.command {
        Some(Commands::Serve { port }) => port.unwrap_or(config.port),
        None => config.port,
    };

    let db = match &config.db_path {
        Some(path) => Database::open(path)?,
        None => Database::open_default()?,
    };
    db.migrate()?;

    let bible = Arc::new(BibleClient::new(config.bible_api_key.clone()));
    let ai = Arc::new(OpenAiClient::new(config.openai_api_key.clone()));
    let tts = Arc::new(SpeechifyClient::new(config.speechify_api_key.clone()));
    let store = Arc::new(StorageClient::new(
        config.storage_url.clone(),
        config.storage_key.clone(),
    ));

    let state = AppState {
        db: db.clone(),
        bible: bible.clone(),
        ai,
        votd: VerseOfDayService::new(db.clone(), bible),
        audio: AudioService::new(db.clone(), tts, store),
        usage: UsageLimiter::new(db),
    };

    let app = api::create_router(state, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Anchor API listening on http://0.0.0.0:{}", port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
