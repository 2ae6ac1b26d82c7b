//! Общие помощники интеграционных тестов.

#![allow(dead_code)]

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use eventcast::{
    message::{Event, Message, Payload},
    AdapterConfig, Broker, Publisher, Server, ServerConfig, ShutdownHandle, Subscriber,
};
use serde_json::json;
use tokio::task::JoinHandle;

/// Запущенный на эфемерном порту сервер.
pub struct TestServer {
    pub addr: SocketAddr,
    pub broker: Arc<Broker>,
    pub shutdown: ShutdownHandle,
    pub task: JoinHandle<eventcast::EventcastResult<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(ServerConfig::default()).await
    }

    pub async fn start_with(config: ServerConfig) -> Self {
        let server = Server::bind(ServerConfig {
            listen: "127.0.0.1:0".to_string(),
            ..config
        })
        .await
        .expect("bind test server");

        Self {
            addr: server.local_addr(),
            broker: server.broker(),
            shutdown: server.shutdown_handle(),
            task: tokio::spawn(server.run()),
        }
    }

    pub fn base_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    pub fn url(
        &self,
        path: &str,
    ) -> String {
        format!("ws://{}{path}", self.addr)
    }

    /// Издатель с коротким интервалом опроса, запущенный в задаче tokio.
    pub fn spawn_publisher(&self) -> (Publisher, JoinHandle<()>) {
        let publisher = Publisher::new(fast(AdapterConfig::publisher(&self.base_url())));
        let task = tokio::spawn({
            let publisher = publisher.clone();
            async move { publisher.run().await }
        });
        (publisher, task)
    }

    /// Подписчик с коротким интервалом опроса, запущенный в задаче tokio.
    pub fn spawn_subscriber(&self) -> (Subscriber, JoinHandle<()>) {
        let subscriber = Subscriber::new(fast(AdapterConfig::subscriber(&self.base_url())));
        let task = tokio::spawn({
            let subscriber = subscriber.clone();
            async move { subscriber.run().await }
        });
        (subscriber, task)
    }

    pub async fn stop(self) {
        self.shutdown.shutdown();
        let _ = tokio::time::timeout(Duration::from_secs(5), self.task).await;
    }
}

pub fn fast(config: AdapterConfig) -> AdapterConfig {
    config
        .with_poll_interval(Duration::from_millis(5))
        .with_connect_timeout(Duration::from_secs(2))
}

/// Ждёт выполнения условия, опрашивая его каждые 5 мс.
pub async fn eventually<F>(
    what: &str,
    mut cond: F,
) where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for: {what}"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Собирает `n` сообщений из подписчика.
pub async fn collect(
    subscriber: &Subscriber,
    n: usize,
) -> Vec<Message> {
    let mut out = Vec::with_capacity(n);
    eventually(&format!("{n} messages"), || {
        while let Some(m) = subscriber.get() {
            out.push(m);
        }
        out.len() >= n
    })
    .await;
    out
}

/// Событие с порядковым номером в атрибутах.
pub fn numbered(
    kind: i64,
    seq: u64,
) -> Event {
    let mut payload = Payload::new();
    payload.insert("seq".to_string(), json!(seq));
    Event::new(kind, payload)
}

pub fn seq_of(message: &Message) -> u64 {
    message
        .event
        .as_ref()
        .and_then(|e| e.payload.get("seq"))
        .and_then(|v| v.as_u64())
        .expect("message carries seq")
}

pub async fn with_timeout<T>(fut: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), fut)
        .await
        .expect("operation timed out")
}
