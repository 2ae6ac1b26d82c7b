use std::time::Instant;

use tracing_appender::non_blocking::WorkerGuard;

/// Handle для управления lifecycle логирования.
///
/// Держит guard файлового писателя: пока handle жив, фоновая запись лога
/// продолжается.
#[must_use = "dropping the handle stops the file log writer"]
pub struct LoggingHandle {
    file_guard: Option<WorkerGuard>,
}

impl LoggingHandle {
    pub fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self { file_guard }
    }

    /// Включён ли файловый вывод.
    pub fn has_file_sink(&self) -> bool {
        self.file_guard.is_some()
    }

    /// Graceful shutdown: сбрасывает буферы файлового писателя.
    pub fn shutdown(mut self) {
        let Some(guard) = self.file_guard.take() else {
            return;
        };
        tracing::info!("Flushing file log");
        let start = Instant::now();
        drop(guard);
        // Subscriber ещё жив, но файловый писатель уже остановлен.
        eprintln!(
            "Logging shutdown completed in {}ms",
            start.elapsed().as_millis()
        );
    }
}

impl std::fmt::Debug for LoggingHandle {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("LoggingHandle")
            .field("file_sink", &self.has_file_sink())
            .finish()
    }
}
