use std::sync::Arc;

use eventcast_error::EventcastResult;
use futures::{SinkExt, StreamExt};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, info, trace, warn};

use super::{
    adapter::AdapterCore,
    connection::{closed_by_peer, connect, transport_error, ClientStream},
    AdapterConfig, AdapterState,
};
use crate::message::Message;

/// Адаптер подписчика.
///
/// Фоновый цикл принимает кадры от брокера, декодирует их и складывает в
/// локальную очередь; приложение забирает сообщения через [`get`](Self::get)
/// без блокировки.
#[derive(Clone)]
pub struct Subscriber {
    core: Arc<AdapterCore>,
}

impl Subscriber {
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            core: Arc::new(AdapterCore::new("subscriber", config)),
        }
    }

    /// Подписчик для брокера по базовому адресу `ws://host:port`.
    pub fn connect_to(base_url: &str) -> Self {
        Self::new(AdapterConfig::subscriber(base_url))
    }

    /// Забирает самое старое полученное сообщение, если оно есть.
    pub fn get(&self) -> Option<Message> {
        self.core.pop()
    }

    pub fn state(&self) -> AdapterState {
        self.core.state()
    }

    /// Число полученных, но ещё не забранных сообщений.
    pub fn pending(&self) -> usize {
        self.core.pending()
    }

    pub fn config(&self) -> &AdapterConfig {
        self.core.config()
    }

    /// Запускает [`run`](Self::run) в фоновом потоке.
    pub fn start(&self) -> EventcastResult<()> {
        let this = self.clone();
        self.core.spawn_worker(move || async move { this.run().await })
    }

    /// Останавливает цикл и выбрасывает незабранные сообщения.
    pub fn stop(&self) {
        self.core.stop();
    }

    /// Сетевой цикл подписчика.
    pub async fn run(&self) {
        if !self.core.transition(AdapterState::Connecting) {
            warn!(state = %self.state(), "Subscriber run() ignored");
            return;
        }

        let config = self.core.config().clone();
        let mut ws = match connect(&config.url, config.connect_timeout).await {
            Ok(ws) => ws,
            Err(e) => {
                error!(url = %config.url, error = %e, "Subscriber failed to connect");
                self.core.transition(AdapterState::Closed);
                return;
            }
        };

        if !self.core.transition(AdapterState::Active) {
            let _ = ws.close(None).await;
            return;
        }
        info!(url = %config.url, "Subscriber connected");

        self.receive(&mut ws).await;

        self.core.transition(AdapterState::Stopping);
        if let Err(e) = ws.close(None).await {
            debug!(error = %e, "Subscriber close failed");
        }
        self.core.finish();
        info!(url = %config.url, "Subscriber closed");
    }

    /// Принимает кадры, пока не придёт остановка или не оборвётся связь.
    async fn receive(
        &self,
        ws: &mut ClientStream,
    ) {
        let poll = self.core.config().poll_interval;

        while !self.core.should_stop() {
            let frame = match timeout(poll, ws.next()).await {
                Err(_) => continue,
                Ok(frame) => frame,
            };

            match frame {
                Some(Ok(WsMessage::Text(text))) => match Message::decode(text.as_str()) {
                    Ok(message) => {
                        trace!(kind = ?message.kind(), "Message received");
                        self.core.push(message);
                    }
                    Err(e) => warn!(error = %e, "Skipping malformed frame"),
                },
                Some(Ok(WsMessage::Binary(data))) => {
                    debug!(len = data.len(), "Ignoring binary frame");
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    info!(error = %closed_by_peer(frame), "Broker closed subscriber connection");
                    return;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %transport_error(e), "Subscriber connection error");
                    return;
                }
                None => return,
            }
        }

        // Ответ на ping мог остаться в буфере записи.
        let _ = ws.flush().await;
    }
}

impl Default for Subscriber {
    fn default() -> Self {
        Self::connect_to(super::ClientConfig::DEFAULT_URL)
    }
}

impl std::fmt::Debug for Subscriber {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("url", &self.core.config().url)
            .field("state", &self.state())
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    /// Тест проверяет, что get() на пустой очереди не блокирует.
    #[test]
    fn test_get_on_empty_queue() {
        let subscriber = Subscriber::default();
        assert!(subscriber.get().is_none());
        assert_eq!(subscriber.pending(), 0);
        assert_eq!(subscriber.state(), AdapterState::Created);
        assert_eq!(subscriber.config().poll_interval, Duration::from_millis(100));
    }

    /// Тест проверяет, что неудачное подключение закрывает подписчика.
    #[tokio::test]
    async fn test_connect_failure_is_terminal() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let subscriber = Subscriber::connect_to(&format!("ws://{addr}"));
        subscriber.run().await;
        assert_eq!(subscriber.state(), AdapterState::Closed);
    }

    /// Тест проверяет stop() без запуска.
    #[test]
    fn test_stop_without_start() {
        let subscriber = Subscriber::default();
        subscriber.stop();
        assert_eq!(subscriber.state(), AdapterState::Closed);
        // Повторный stop() безопасен.
        subscriber.stop();
        assert_eq!(subscriber.state(), AdapterState::Closed);
    }
}
