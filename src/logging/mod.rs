//! Логирование на базе `tracing`.
//!
//! Консольный слой в одном из трёх форматов и необязательный файловый слой
//! с ежедневной ротацией. `RUST_LOG` имеет приоритет над уровнем из
//! конфигурации.

pub mod config;
mod filters;
mod formatter;
pub mod handle;
pub mod sinks;

pub use config::{FileConfig, LogFormat, LoggingConfig};
pub use handle::LoggingHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub type LoggingError = Box<dyn std::error::Error + Send + Sync>;

/// Инициализация логирования с конфигурацией.
///
/// Глобальный subscriber ставится один раз на процесс; повторный вызов
/// возвращает ошибку.
pub fn init_logging(config: LoggingConfig) -> Result<LoggingHandle, LoggingError> {
    config.validate()?;
    config.ensure_log_dir()?;

    let env_filter = filters::build_filter_from_config(&config);
    let mut layers = vec![sinks::console::layer_with_config(&config)];

    let file_guard = if config.file.enabled {
        let (file_layer, guard) = sinks::file::layer_with_config(&config)?;
        layers.push(file_layer);
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = %config.level,
        format = ?config.format,
        file_enabled = config.file.enabled,
        log_dir = %config.file.dir.display(),
        "Logging system initialized"
    );

    Ok(LoggingHandle::new(file_guard))
}
