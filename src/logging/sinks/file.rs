use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling::daily};
use tracing_subscriber::registry::LookupSpan;

use crate::logging::{
    config::LoggingConfig,
    formatter::{self, BoxedLayer},
};

/// Файловый слой с ежедневной ротацией и неблокирующей записью.
///
/// `WorkerGuard` должен жить до конца программы, иначе хвост лога
/// потеряется.
pub fn layer_with_config<S>(config: &LoggingConfig) -> std::io::Result<(BoxedLayer<S>, WorkerGuard)>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    std::fs::create_dir_all(&config.file.dir)?;

    let appender = daily(&config.file.dir, &config.file.prefix);
    let (writer, guard) = non_blocking(appender);

    // В файл escape-последовательности не пишем.
    let layer = formatter::build_formatter_from_config(config, config.format, false, writer);
    Ok((layer, guard))
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::{prelude::*, registry::Registry};

    use super::*;

    /// Тест проверяет, что записи попадают в файл в указанном каталоге.
    #[test]
    fn test_file_layer_writes_to_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = LoggingConfig::default();
        cfg.file.enabled = true;
        cfg.file.dir = tmp.path().join("nested");
        cfg.file.prefix = "test.log".to_string();

        let (layer, guard) = layer_with_config::<Registry>(&cfg).unwrap();
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("written to file");
        });
        drop(guard);

        let files: Vec<_> = std::fs::read_dir(&cfg.file.dir).unwrap().collect();
        assert_eq!(files.len(), 1);
        let path = files[0].as_ref().unwrap().path();
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("written to file"));
    }
}
