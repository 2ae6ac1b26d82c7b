use std::time::Duration;

use serde::Deserialize;

use crate::network::Routes;

/// Клиентская часть настроек: общий адрес брокера и интервалы опроса.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Базовый адрес брокера, например `ws://127.0.0.1:8000`
    pub url: String,
    /// Интервал опроса очереди издателя, мс
    pub publisher_poll_ms: u64,
    /// Таймаут ожидания кадра подписчиком, мс
    pub subscriber_poll_ms: u64,
    /// Таймаут подключения, мс
    pub connect_timeout_ms: u64,
}

/// Параметры одного адаптера.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Полный адрес WebSocket-маршрута
    pub url: String,
    /// Как часто цикл проверяет флаг остановки в простое
    pub poll_interval: Duration,
    pub connect_timeout: Duration,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl ClientConfig {
    pub const DEFAULT_URL: &'static str = "ws://127.0.0.1:8000";

    pub fn publisher(&self) -> AdapterConfig {
        AdapterConfig::publisher(&self.url)
            .with_poll_interval(Duration::from_millis(self.publisher_poll_ms))
            .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms))
    }

    pub fn subscriber(&self) -> AdapterConfig {
        AdapterConfig::subscriber(&self.url)
            .with_poll_interval(Duration::from_millis(self.subscriber_poll_ms))
            .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms))
    }
}

impl AdapterConfig {
    pub const PUBLISHER_POLL: Duration = Duration::from_millis(10);
    pub const SUBSCRIBER_POLL: Duration = Duration::from_millis(100);
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Конфигурация издателя для брокера по адресу `base_url`.
    pub fn publisher(base_url: &str) -> Self {
        Self {
            url: join_url(base_url, Routes::PUBLISHER_PATH),
            poll_interval: Self::PUBLISHER_POLL,
            connect_timeout: Self::CONNECT_TIMEOUT,
        }
    }

    /// Конфигурация подписчика для брокера по адресу `base_url`.
    pub fn subscriber(base_url: &str) -> Self {
        Self {
            url: join_url(base_url, Routes::SUBSCRIBER_PATH),
            poll_interval: Self::SUBSCRIBER_POLL,
            connect_timeout: Self::CONNECT_TIMEOUT,
        }
    }

    pub fn with_poll_interval(
        mut self,
        interval: Duration,
    ) -> Self {
        // Нулевой интервал превратил бы простой в активное ожидание.
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_connect_timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

fn join_url(
    base: &str,
    path: &str,
) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: Self::DEFAULT_URL.to_string(),
            publisher_poll_ms: AdapterConfig::PUBLISHER_POLL.as_millis() as u64,
            subscriber_poll_ms: AdapterConfig::SUBSCRIBER_POLL.as_millis() as u64,
            connect_timeout_ms: AdapterConfig::CONNECT_TIMEOUT.as_millis() as u64,
        }
    }
}
