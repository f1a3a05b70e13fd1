use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use stockwatch_daemon::{
    config::{DaemonConfig, DEFAULT_PAYLOAD_KEY, DEFAULT_UPSTREAM_URL},
    credentials::{self, KeyMaterial},
    fetch::HttpStockSource,
    http,
    notify::{Notifier, SendGridMailer},
    scheduler,
    service::StockWatcher,
    store::SnapshotStore,
};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "stockwatch", version, about = "Upstream stock watcher with email alerts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP listen port.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// HTTP listen address.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Email API key.
    #[arg(long, env = "SENDGRID_API_KEY", hide_env_values = true)]
    sendgrid_api_key: Option<String>,

    /// Hex of nonce || AES-256-GCM ciphertext of the API key.
    #[arg(long, env = "ENCRYPTED_API_KEY", hide_env_values = true)]
    encrypted_api_key: Option<String>,

    /// 32-byte key used to open --encrypted-api-key.
    #[arg(long, env = "DECRYPTION_KEY", hide_env_values = true)]
    decryption_key: Option<String>,

    /// Notification address (used as both recipient and sender).
    #[arg(long, env = "YOUR_EMAIL", default_value = "your-email@example.com")]
    email: String,

    /// Where the last fetched payload is kept.
    #[arg(long, env = "STOCK_FILE", default_value = "stockData.json")]
    snapshot_path: PathBuf,

    /// Directory served as static files.
    #[arg(long, env = "PUBLIC_DIR", default_value = "public")]
    public_dir: PathBuf,

    #[arg(long, env = "UPSTREAM_URL", default_value = DEFAULT_UPSTREAM_URL)]
    upstream_url: String,

    /// Key of the JSON object embedded in the upstream page.
    #[arg(long, default_value = DEFAULT_PAYLOAD_KEY)]
    payload_key: String,

    /// Seconds between scheduled checks.
    #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(u64).range(1..))]
    interval_seconds: u64,

    /// Log level (env-filter syntax).
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log: String,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API and run scheduled checks (default).
    Serve,
    /// Run one check cycle and print the result.
    Check,
    /// Fetch and email the current listing, then print it.
    Current,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&cli.log))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = DaemonConfig {
        listen: SocketAddr::new(cli.host, cli.port),
        public_dir: cli.public_dir.clone(),
        upstream_url: cli.upstream_url.clone(),
        payload_key: cli.payload_key.clone(),
        snapshot_path: cli.snapshot_path.clone(),
        email: cli.email.clone(),
        interval_seconds: cli.interval_seconds,
    };

    let notifier = build_notifier(&cli, &config.email);
    let watcher = Arc::new(StockWatcher::new(
        Arc::new(HttpStockSource::new(&config.upstream_url, &config.payload_key)),
        SnapshotStore::new(&config.snapshot_path),
        notifier,
    ));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, watcher).await,
        Command::Check => {
            let res = watcher.check_stock_changes().await;
            println!("{}", serde_json::to_string_pretty(&res)?);
            Ok(())
        }
        Command::Current => {
            let res = watcher.get_current_stock().await;
            println!("{}", serde_json::to_string_pretty(&res)?);
            Ok(())
        }
    }
}

/// Key failures disable email for the process lifetime; polling carries on.
fn build_notifier(cli: &Cli, email: &str) -> Notifier {
    let material = KeyMaterial {
        api_key: cli.sendgrid_api_key.clone(),
        encrypted_api_key: cli.encrypted_api_key.clone(),
        decryption_key: cli.decryption_key.clone(),
    };
    match credentials::resolve_api_key(&material) {
        Ok(Some(key)) => Notifier::new(Arc::new(SendGridMailer::new(key)), email),
        Ok(None) => {
            warn!("no email API key configured; notifications disabled");
            Notifier::disabled(email)
        }
        Err(e) => {
            error!(kind = e.kind(), error = %e, "notifications disabled");
            Notifier::disabled(email)
        }
    }
}

async fn serve(config: DaemonConfig, watcher: Arc<StockWatcher>) -> anyhow::Result<()> {
    info!(?config, "starting stock watcher");

    scheduler::spawn_scheduler(
        Arc::clone(&watcher),
        Duration::from_secs(config.interval_seconds),
    );

    let app = http::router(http::AppState::new(watcher), &config.public_dir);

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("bind {}", config.listen))?;
    info!("Server running on port {}", config.listen.port());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("shutdown requested");
}
