use std::{
    collections::VecDeque,
    future::Future,
    sync::atomic::{AtomicBool, Ordering},
    thread::{self, JoinHandle},
};

use eventcast_error::{EventcastResult, StackError};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::{debug, error, warn};

use super::{AdapterConfig, AdapterState};
use crate::message::Message;

/// Общая часть издателя и подписчика.
///
/// Приложение и сетевой цикл общаются только через локальную очередь;
/// остановка кооперативная: флаг + пробуждение цикла.
pub(crate) struct AdapterCore {
    role: &'static str,
    config: AdapterConfig,
    queue: Mutex<VecDeque<Message>>,
    wake: Notify,
    stop: AtomicBool,
    state: Mutex<AdapterState>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl AdapterCore {
    pub(crate) fn new(
        role: &'static str,
        config: AdapterConfig,
    ) -> Self {
        Self {
            role,
            config,
            queue: Mutex::new(VecDeque::new()),
            wake: Notify::new(),
            stop: AtomicBool::new(false),
            state: Mutex::new(AdapterState::Created),
            worker: Mutex::new(None),
        }
    }

    pub(crate) fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub(crate) fn state(&self) -> AdapterState {
        *self.state.lock()
    }

    /// Переводит адаптер в `next`, если переход допустим.
    pub(crate) fn transition(
        &self,
        next: AdapterState,
    ) -> bool {
        let mut state = self.state.lock();
        if state.can_transition_to(next) {
            debug!(role = self.role, from = %*state, to = %next, "State transition");
            *state = next;
            true
        } else {
            false
        }
    }

    /// Закрывает адаптер из любого нетерминального состояния, проходя
    /// через `Stopping`, если цикл был активен.
    pub(crate) fn finish(&self) {
        self.transition(AdapterState::Stopping);
        self.transition(AdapterState::Closed);
    }

    pub(crate) fn push(
        &self,
        msg: Message,
    ) {
        self.queue.lock().push_back(msg);
        self.wake.notify_one();
    }

    pub(crate) fn pop(&self) -> Option<Message> {
        self.queue.lock().pop_front()
    }

    pub(crate) fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    pub(crate) fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Ждёт пробуждения (новое сообщение или остановка).
    pub(crate) async fn woken(&self) {
        self.wake.notified().await
    }

    /// Запускает `run` в отдельном потоке со своим однопоточным runtime.
    pub(crate) fn spawn_worker<F, Fut>(
        &self,
        run: F,
    ) -> EventcastResult<()>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()>,
    {
        let mut worker = self.worker.lock();
        if worker.is_some() || self.state() != AdapterState::Created {
            warn!(role = self.role, state = %self.state(), "Adapter already started");
            return Ok(());
        }

        let role = self.role;
        let handle = thread::Builder::new()
            .name(format!("eventcast-{role}"))
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        error!(role, error = %e, "Failed to build adapter runtime");
                        return;
                    }
                };
                runtime.block_on(run());
            })
            .map_err(|e| StackError::from(e).context(format!("Spawning {role} thread")))?;

        *worker = Some(handle);
        Ok(())
    }

    /// Останавливает адаптер: флаг, пробуждение, join, очистка очереди.
    ///
    /// Возвращает число выброшенных из очереди сообщений.
    pub(crate) fn stop(&self) -> usize {
        self.stop.store(true, Ordering::Release);
        self.wake.notify_one();
        // Адаптер, не дошедший до Active, закрывается сразу.
        self.transition(AdapterState::Closed);

        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if handle.thread().id() == thread::current().id() {
                warn!(role = self.role, "stop() called from the adapter thread, not joining");
            } else if handle.join().is_err() {
                error!(role = self.role, "Adapter thread panicked");
            }
        }

        let mut queue = self.queue.lock();
        let dropped = queue.len();
        queue.clear();
        if dropped > 0 {
            debug!(role = self.role, dropped, "Dropped queued messages on stop");
        }
        dropped
    }
}
