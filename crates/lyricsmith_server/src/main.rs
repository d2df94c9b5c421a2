//! Remote song API server entrypoint.

use clap::Parser;
use lyricsmith_server::config::{env_flag_enabled, Config};
use lyricsmith_server::{resolve_bind_address, serve_router, AppState, Database};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line overrides; everything else comes from the environment.
#[derive(Parser, Debug)]
#[command(
    name = "lyricsmith-server",
    about = "LyricSmith song API",
    version,
    after_help = "Environment: DB_PATH, PORT, MAX_SONG_SIZE, ALLOWED_ORIGINS (first entry is the \
                  CORS fallback), ALLOW_PUBLIC_ACCESS, BIND, RUST_LOG"
)]
struct ServerArgs {
    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Database file (overrides DB_PATH)
    #[arg(long)]
    db: Option<String>,

    /// Accept any CORS origin and allow non-loopback binds
    #[arg(long)]
    public: bool,
}

impl ServerArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(db) = self.db.as_deref().map(str::trim).filter(|db| !db.is_empty()) {
            config.db_path = db.to_string();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lyricsmith=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = ServerArgs::parse();
    let mut config = Config::from_env();
    args.apply(&mut config);

    let database = Database::new(&config.db_path)?;
    let allow_public = args.public || env_flag_enabled("ALLOW_PUBLIC_ACCESS");
    if allow_public {
        tracing::warn!("public access enabled: any origin is echoed and any bind is honoured");
    }

    let bind_addr = resolve_bind_address(&config, allow_public);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let local_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!(
        addr = %local_addr,
        db = %config.db_path,
        origins = ?config.allowed_origins,
        "song API listening"
    );

    let state = AppState::new(config, database);
    serve_router(listener, state, allow_public, shutdown_signal()).await?;
    tracing::info!("song API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
