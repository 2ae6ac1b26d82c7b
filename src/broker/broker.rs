use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicU32, AtomicU64, Ordering},
        Arc,
    },
};

use eventcast_error::BrokerError;
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{ConnectionId, Frame, SubscriberSink};

/// Параметры брокера.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Максимальная длина истории. `None`: история не ограничена.
    pub history_capacity: Option<usize>,
}

/// Итог одной публикации.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Подписчики, принявшие кадр.
    pub delivered: usize,
    /// Подписчики, которым кадр передать не удалось.
    pub failed: usize,
}

/// Снимок счётчиков брокера.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrokerStats {
    pub published: u64,
    pub delivered: u64,
    pub failed: u64,
    pub replayed: u64,
    pub rejected_publishers: u64,
}

/// Брокер событий.
///
/// Поддерживает:
/// - не более одного издателя одновременно
/// - произвольное число подписчиков
/// - историю всех кадров с повтором для опоздавших подписчиков
///
/// Добавление в историю и рассылка выполняются в одной критической секции,
/// как и повтор истории вместе со вставкой нового подписчика. Поэтому
/// подписчик видит каждый кадр ровно один раз и в порядке публикации.
pub struct Broker {
    state: Mutex<BrokerState>,
    config: BrokerConfig,
    /// Счётчик для генерации ID соединений
    id_counter: AtomicU32,
    publish_count: AtomicU64,
    delivered_count: AtomicU64,
    failed_count: AtomicU64,
    replayed_count: AtomicU64,
    rejected_count: AtomicU64,
}

#[derive(Default)]
struct BrokerState {
    subscribers: HashMap<ConnectionId, Arc<dyn SubscriberSink>>,
    publisher: Option<ConnectionId>,
    history: VecDeque<Frame>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl Broker {
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            state: Mutex::new(BrokerState::default()),
            config,
            id_counter: AtomicU32::new(0),
            publish_count: AtomicU64::new(0),
            delivered_count: AtomicU64::new(0),
            failed_count: AtomicU64::new(0),
            replayed_count: AtomicU64::new(0),
            rejected_count: AtomicU64::new(0),
        }
    }

    /// Выдаёт новый ID соединения.
    pub fn next_connection_id(&self) -> ConnectionId {
        ConnectionId(self.id_counter.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Назначает соединение издателем.
    ///
    /// Успешно только при свободном слоте; иначе состояние не меняется.
    pub fn assign_publisher(
        &self,
        conn: ConnectionId,
    ) -> Result<(), BrokerError> {
        let mut state = self.state.lock();
        if let Some(current) = state.publisher {
            self.rejected_count.fetch_add(1, Ordering::Relaxed);
            warn!(%conn, %current, "Publisher rejected: slot is taken");
            return Err(BrokerError::PublisherAlreadyAssigned { current: current.0 });
        }
        state.publisher = Some(conn);
        info!(%conn, "Publisher assigned");
        Ok(())
    }

    /// Освобождает слот издателя, если его занимает `conn`.
    pub fn release_publisher(
        &self,
        conn: ConnectionId,
    ) -> bool {
        let mut state = self.state.lock();
        if state.publisher == Some(conn) {
            state.publisher = None;
            info!(%conn, "Publisher released");
            true
        } else {
            false
        }
    }

    /// Регистрирует подписчика и повторяет ему всю историю.
    ///
    /// Возвращает число повторённых кадров. Ошибка отправки при повторе
    /// логируется, подписчик остаётся зарегистрированным.
    pub fn register(
        &self,
        sink: Arc<dyn SubscriberSink>,
    ) -> usize {
        let conn = sink.id();
        let mut state = self.state.lock();

        let mut replayed = 0;
        for frame in &state.history {
            match sink.send_text(frame) {
                Ok(()) => replayed += 1,
                Err(e) => {
                    self.failed_count.fetch_add(1, Ordering::Relaxed);
                    warn!(%conn, error = %e, "Replay send failed");
                }
            }
        }
        state.subscribers.insert(conn, sink);

        self.replayed_count
            .fetch_add(replayed as u64, Ordering::Relaxed);
        info!(
            %conn,
            replayed,
            subscribers = state.subscribers.len(),
            "Subscriber registered"
        );
        replayed
    }

    /// Удаляет подписчика. Повторный вызов ничего не делает.
    pub fn unregister(
        &self,
        conn: ConnectionId,
    ) -> bool {
        let mut state = self.state.lock();
        let removed = state.subscribers.remove(&conn).is_some();
        if removed {
            info!(%conn, subscribers = state.subscribers.len(), "Subscriber unregistered");
        }
        removed
    }

    /// Добавляет кадр в историю и рассылает его всем подписчикам.
    ///
    /// Ошибка доставки одному подписчику не прерывает рассылку и не
    /// удаляет его: это делает транспорт, заметив разрыв соединения.
    pub fn publish(
        &self,
        frame: Frame,
    ) -> PublishReport {
        self.publish_count.fetch_add(1, Ordering::Relaxed);

        let mut state = self.state.lock();
        if let Some(capacity) = self.config.history_capacity {
            while state.history.len() >= capacity.max(1) {
                state.history.pop_front();
            }
        }
        state.history.push_back(frame.clone());

        let mut report = PublishReport::default();
        for (conn, sink) in &state.subscribers {
            match sink.send_text(&frame) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(%conn, error = %e, "Delivery failed");
                }
            }
        }
        drop(state);

        self.delivered_count
            .fetch_add(report.delivered as u64, Ordering::Relaxed);
        self.failed_count
            .fetch_add(report.failed as u64, Ordering::Relaxed);
        debug!(
            len = frame.len(),
            delivered = report.delivered,
            failed = report.failed,
            "Frame published"
        );
        report
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    pub fn history_len(&self) -> usize {
        self.state.lock().history.len()
    }

    /// Текущий издатель, если слот занят.
    pub fn publisher(&self) -> Option<ConnectionId> {
        self.state.lock().publisher
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    pub fn stats(&self) -> BrokerStats {
        BrokerStats {
            published: self.publish_count.load(Ordering::Relaxed),
            delivered: self.delivered_count.load(Ordering::Relaxed),
            failed: self.failed_count.load(Ordering::Relaxed),
            replayed: self.replayed_count.load(Ordering::Relaxed),
            rejected_publishers: self.rejected_count.load(Ordering::Relaxed),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl Default for Broker {
    fn default() -> Self {
        Self::new(BrokerConfig::default())
    }
}

impl std::fmt::Debug for Broker {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Broker")
            .field("publisher", &state.publisher)
            .field("subscribers", &state.subscribers.len())
            .field("history", &state.history.len())
            .field("config", &self.config)
            .finish()
    }
}
