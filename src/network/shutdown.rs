use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::Notify;
use tracing::info;

/// Сигнал graceful shutdown, общий для цикла приёма и всех соединений.
///
/// Сигнал одноразовый: после `shutdown()` каждый последующий `wait()`
/// завершается сразу.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    notify: Notify,
    triggered: AtomicBool,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Инициирует остановку и будит всех ожидающих.
    pub fn shutdown(&self) {
        if !self.inner.triggered.swap(true, Ordering::SeqCst) {
            info!("Initiating graceful shutdown");
        }
        self.inner.notify.notify_waiters();
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::SeqCst)
    }

    /// Ждёт сигнала остановки.
    pub async fn wait(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Регистрируемся до проверки флага, иначе сигнал между проверкой и
        // ожиданием потеряется.
        notified.as_mut().enable();
        if self.is_triggered() {
            return;
        }
        notified.await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    /// Тест проверяет, что ожидающая задача просыпается.
    #[tokio::test]
    async fn test_wait_wakes_on_shutdown() {
        let handle = ShutdownHandle::new();
        let waiter = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.wait().await })
        };
        tokio::task::yield_now().await;
        handle.shutdown();
        timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter must wake")
            .unwrap();
    }

    /// Тест проверяет, что ожидание после сигнала завершается сразу.
    #[tokio::test]
    async fn test_wait_after_shutdown_returns_immediately() {
        let handle = ShutdownHandle::new();
        handle.shutdown();
        assert!(handle.is_triggered());
        timeout(Duration::from_millis(100), handle.wait())
            .await
            .expect("must not block");
    }
}
