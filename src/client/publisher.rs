use std::sync::Arc;

use eventcast_error::{ErrorExt, EventcastResult};
use futures::{SinkExt, StreamExt};
use tokio::{select, time::sleep};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, info, warn};

use super::{
    adapter::AdapterCore,
    connection::{closed_by_peer, connect, transport_error, ClientStream},
    AdapterConfig, AdapterState,
};
use crate::message::{Event, Message, Payload};

/// Адаптер издателя.
///
/// `publish` никогда не блокирует: сообщение ставится в локальную очередь, а
/// фоновый цикл отправляет очередь брокеру в порядке FIFO. Клонирование
/// даёт ещё один хэндл на тот же адаптер.
#[derive(Clone)]
pub struct Publisher {
    core: Arc<AdapterCore>,
}

impl Publisher {
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            core: Arc::new(AdapterCore::new("publisher", config)),
        }
    }

    /// Издатель для брокера по базовому адресу `ws://host:port`.
    pub fn connect_to(base_url: &str) -> Self {
        Self::new(AdapterConfig::publisher(base_url))
    }

    /// Ставит событие в очередь на отправку.
    pub fn publish(
        &self,
        event: Option<Event>,
        extra: Option<Payload>,
    ) {
        self.send(Message::new(event, extra));
    }

    /// Ставит готовое сообщение в очередь на отправку.
    pub fn send(
        &self,
        message: Message,
    ) {
        // После неудачного подключения очередь остаётся доступной; отказ
        // только после явного stop().
        if self.core.should_stop() {
            debug!("Publisher is stopped, message dropped");
            return;
        }
        self.core.push(message);
    }

    pub fn state(&self) -> AdapterState {
        self.core.state()
    }

    /// Число сообщений, ещё не отправленных брокеру.
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

    /// Останавливает цикл и выбрасывает неотправленные сообщения.
    pub fn stop(&self) {
        self.core.stop();
    }

    /// Сетевой цикл издателя.
    ///
    /// Ошибки не пробрасываются наружу: всё, что случилось с соединением,
    /// попадает в лог и в итоговое состояние `Closed`.
    pub async fn run(&self) {
        if !self.core.transition(AdapterState::Connecting) {
            warn!(state = %self.state(), "Publisher run() ignored");
            return;
        }

        let config = self.core.config().clone();
        let mut ws = match connect(&config.url, config.connect_timeout).await {
            Ok(ws) => ws,
            Err(e) => {
                error!(url = %config.url, error = %e, "Publisher failed to connect");
                self.core.transition(AdapterState::Closed);
                return;
            }
        };

        if !self.core.transition(AdapterState::Active) {
            let _ = ws.close(None).await;
            return;
        }
        info!(url = %config.url, "Publisher connected");

        self.pump(&mut ws).await;

        self.core.transition(AdapterState::Stopping);
        if let Err(e) = ws.close(None).await {
            debug!(error = %e, "Publisher close failed");
        }
        self.core.transition(AdapterState::Closed);
        info!(url = %config.url, "Publisher closed");
    }

    /// Отправляет очередь, пока не придёт остановка или не оборвётся связь.
    async fn pump(
        &self,
        ws: &mut ClientStream,
    ) {
        let poll = self.core.config().poll_interval;

        while !self.core.should_stop() {
            while let Some(message) = self.next_outgoing() {
                let frame = match message.encode() {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!(error = %e, "Dropping message that failed to encode");
                        continue;
                    }
                };
                if let Err(e) = ws.send(WsMessage::text(frame)).await {
                    let err = transport_error(e);
                    if err.status_code().is_retryable() {
                        warn!(error = %err, "Publisher connection lost");
                        return;
                    }
                    warn!(error = %err, "Dropping message that failed to send");
                }
            }

            select! {
                inbound = ws.next() => match inbound {
                    Some(Ok(WsMessage::Text(text))) => {
                        warn!(reply = %text.as_str(), "Broker replied to publisher");
                    }
                    Some(Ok(WsMessage::Close(frame))) => {
                        info!(error = %closed_by_peer(frame), "Broker closed publisher connection");
                        return;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %transport_error(e), "Publisher connection error");
                        return;
                    }
                    None => return,
                },
                _ = self.core.woken() => {}
                _ = sleep(poll) => {}
            }
        }
    }

    fn next_outgoing(&self) -> Option<Message> {
        if self.core.should_stop() {
            return None;
        }
        self.core.pop()
    }
}

impl Default for Publisher {
    fn default() -> Self {
        Self::connect_to(super::ClientConfig::DEFAULT_URL)
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Publisher")
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
    use crate::message::EventType;

    fn unreachable_publisher() -> Publisher {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        Publisher::new(
            AdapterConfig::publisher(&format!("ws://{addr}"))
                .with_connect_timeout(Duration::from_secs(2)),
        )
    }

    /// Тест проверяет, что publish() только ставит сообщение в очередь.
    #[test]
    fn test_publish_queues_without_connection() {
        let publisher = Publisher::default();
        publisher.publish(Some(Event::bare(1)), None);
        publisher.send(Message::empty());
        assert_eq!(publisher.pending(), 2);
        assert_eq!(publisher.state(), AdapterState::Created);
    }

    /// Тест проверяет, что неудачное подключение закрывает адаптер навсегда.
    #[tokio::test]
    async fn test_connect_failure_is_terminal() {
        let publisher = unreachable_publisher();
        publisher.run().await;
        assert_eq!(publisher.state(), AdapterState::Closed);

        // Повторный run() ничего не делает.
        publisher.run().await;
        assert_eq!(publisher.state(), AdapterState::Closed);
    }

    /// Тест проверяет, что после неудачного подключения publish() по-прежнему
    /// ставит сообщения в очередь.
    #[tokio::test]
    async fn test_publish_after_connect_failure_still_queues() {
        let publisher = unreachable_publisher();
        publisher.run().await;
        assert_eq!(publisher.state(), AdapterState::Closed);

        publisher.publish(Some(Event::bare(7)), None);
        publisher.send(Message::empty());
        assert_eq!(publisher.pending(), 2);
        assert_eq!(publisher.core.pop().and_then(|m| m.kind()), Some(EventType(7)));
    }

    /// Тест проверяет, что stop() до запуска закрывает издателя и что
    /// после явной остановки сообщения не принимаются.
    #[test]
    fn test_stop_before_start_closes() {
        let publisher = Publisher::default();
        publisher.publish(Some(Event::bare(3)), None);
        publisher.stop();
        assert_eq!(publisher.state(), AdapterState::Closed);
        assert_eq!(publisher.pending(), 0);

        publisher.publish(Some(Event::bare(4)), None);
        assert_eq!(publisher.pending(), 0);
    }

    /// Тест проверяет фоновый поток: start() при недоступном брокере
    /// приводит к `Closed`, stop() корректно присоединяет поток.
    #[test]
    fn test_start_stop_with_unreachable_broker() {
        let publisher = unreachable_publisher();
        publisher.start().unwrap();
        publisher.stop();
        assert_eq!(publisher.state(), AdapterState::Closed);
    }
}
