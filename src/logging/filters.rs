use tracing_subscriber::EnvFilter;

use crate::logging::config::LoggingConfig;

/// Строит `EnvFilter`: `RUST_LOG`, если задана, иначе директива из
/// конфигурации.
pub fn build_filter_from_config(config: &LoggingConfig) -> EnvFilter {
    match EnvFilter::try_from_default_env() {
        Ok(env_filter) => env_filter,
        Err(_) => {
            let directive = config.build_filter_directive();
            EnvFilter::try_new(&directive).unwrap_or_else(|e| {
                eprintln!("Invalid log filter directive ('{directive}'): {e}; falling back to 'info'");
                EnvFilter::new("info")
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::{fmt, prelude::*, registry::Registry};

    use super::*;

    // Мини-буферный writer для тестов
    #[derive(Clone)]
    struct VecMakeWriter(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for VecMakeWriter {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Тест проверяет, что директива "warn" отсекает info и пропускает warn.
    #[test]
    fn test_directive_filters_levels() {
        let cfg = LoggingConfig {
            level: "warn".to_string(),
            ..Default::default()
        };
        let filter = EnvFilter::try_new(cfg.build_filter_directive()).unwrap();

        let buffer = Arc::new(Mutex::new(Vec::new()));
        let writer = VecMakeWriter(buffer.clone());
        let layer = fmt::layer()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .with_filter(filter);
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("filtered info message");
            tracing::warn!("passing warn message");
        });

        let out = String::from_utf8_lossy(&buffer.lock().unwrap()).to_string();
        assert!(out.contains("passing warn message"));
        assert!(!out.contains("filtered info message"));
    }

    /// Тест проверяет, что некорректный уровень не роняет построение фильтра.
    #[test]
    fn test_invalid_directive_falls_back() {
        let cfg = LoggingConfig {
            level: "not a level!!".to_string(),
            ..Default::default()
        };
        let _filter = build_filter_from_config(&cfg);
    }
}
