use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use eventcast::{init_logging, Server, Settings};
use tracing::{error, info};

/// Сервер-брокер событий eventcast.
#[derive(Parser)]
#[command(name = "eventcast")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "eventcast - single-publisher WebSocket event broker", long_about = None)]
struct Args {
    /// Путь к TOML-файлу настроек
    #[arg(short, long, env = "EVENTCAST_CONFIG", help = "TOML-файл настроек")]
    config: Option<PathBuf>,
    /// Адрес прослушивания (перекрывает настройки)
    #[arg(short, long, help = "Адрес прослушивания, например 0.0.0.0:8000")]
    listen: Option<String>,
    /// Уровень логирования (перекрывает настройки)
    #[arg(long, help = "Уровень логирования: trace, debug, info, warn, error")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    if let Some(listen) = args.listen {
        settings.server.listen = listen;
    }
    if let Some(level) = args.log_level {
        settings.logging.level = level;
    }
    settings.validate().context("Invalid settings")?;

    let logging = init_logging(settings.logging.clone())
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        commit = env!("GIT_COMMIT"),
        built = env!("BUILD_TIME"),
        "Starting eventcast"
    );

    let server = Server::bind(settings.server)
        .await
        .context("Failed to start server")?;

    let shutdown = server.shutdown_handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received");
                shutdown.shutdown();
            }
            Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });

    let result = server.run().await;
    logging.shutdown();
    result.map_err(Into::into)
}
