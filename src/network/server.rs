use std::{net::SocketAddr, sync::Arc, time::Duration};

use eventcast_error::{ErrorExt, EventcastResult, LogLevel, NetworkError};
use serde::Deserialize;
use tokio::{net::TcpListener, select, task::JoinSet, time::timeout};
use tracing::{debug, error, info, warn};

use super::{connection::ConnectionHandler, Routes, ShutdownHandle};
use crate::broker::{Broker, BrokerConfig, ConnectionId};

/// Конфигурация сервера.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Адрес прослушивания
    pub listen: String,
    /// Пути WebSocket-маршрутов
    #[serde(flatten)]
    pub routes: Routes,
    /// Таймаут WebSocket-рукопожатия, мс
    pub handshake_timeout_ms: u64,
    /// Сколько ждать завершения соединений при остановке, мс
    pub shutdown_grace_ms: u64,
    pub broker: BrokerConfig,
}

/// WebSocket-сервер брокера.
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    broker: Arc<Broker>,
    config: ServerConfig,
    shutdown: ShutdownHandle,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl ServerConfig {
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

impl Server {
    /// Занимает адрес и создаёт брокер.
    pub async fn bind(config: ServerConfig) -> Result<Self, NetworkError> {
        let bind_err = |e: std::io::Error| NetworkError::Bind {
            address: config.listen.clone(),
            reason: e.to_string(),
        };
        let listener = TcpListener::bind(&config.listen).await.map_err(bind_err)?;
        let local_addr = listener.local_addr().map_err(bind_err)?;

        Ok(Self {
            listener,
            local_addr,
            broker: Arc::new(Broker::new(config.broker.clone())),
            config,
            shutdown: ShutdownHandle::new(),
        })
    }

    /// Фактический адрес (полезно при `listen = "127.0.0.1:0"`).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn broker(&self) -> Arc<Broker> {
        self.broker.clone()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Цикл приёма соединений.
    ///
    /// Каждое соединение обслуживается своей задачей. После сигнала
    /// остановки ждёт завершения соединений не дольше `shutdown_grace`.
    pub async fn run(self) -> EventcastResult<()> {
        let Server {
            listener,
            local_addr,
            broker,
            config,
            shutdown,
        } = self;

        info!(
            addr = %local_addr,
            publisher = %config.routes.publisher_path,
            subscriber = %config.routes.subscriber_path,
            "Server listening"
        );

        let routes = Arc::new(config.routes.clone());
        let mut tasks = JoinSet::new();

        loop {
            select! {
                _ = shutdown.wait() => break,
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
                accepted = listener.accept() => {
                    let (socket, addr) = match accepted {
                        Ok(pair) => pair,
                        Err(e) => {
                            warn!(error = %e, "Accept failed");
                            continue;
                        }
                    };

                    let handler = ConnectionHandler::new(addr, broker.clone(), shutdown.clone());
                    let routes = routes.clone();
                    let handshake_timeout = config.handshake_timeout();
                    tasks.spawn(async move {
                        let conn = handler.id();
                        if let Err(e) = handler.run(socket, &routes, handshake_timeout).await {
                            log_connection_error(&conn, addr, &e);
                        }
                    });
                }
            }
        }

        drop(listener);
        info!(active = tasks.len(), "Waiting for connections to close");
        let drain = async { while tasks.join_next().await.is_some() {} };
        if timeout(config.shutdown_grace(), drain).await.is_err() {
            warn!(remaining = tasks.len(), "Shutdown grace period exceeded, aborting");
            tasks.abort_all();
        }

        let stats = broker.stats();
        info!(
            published = stats.published,
            delivered = stats.delivered,
            failed = stats.failed,
            "Server stopped"
        );
        Ok(())
    }
}

fn log_connection_error(
    conn: &ConnectionId,
    addr: SocketAddr,
    e: &NetworkError,
) {
    match e.status_code().log_level() {
        LogLevel::Debug => debug!(%conn, %addr, error = %e, "Connection failed"),
        LogLevel::Info => info!(%conn, %addr, error = %e, "Connection failed"),
        LogLevel::Warn => warn!(%conn, %addr, error = %e, "Connection failed"),
        LogLevel::Error => error!(%conn, %addr, error = %e, "Connection failed"),
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8000".to_string(),
            routes: Routes::default(),
            handshake_timeout_ms: 10_000,
            shutdown_grace_ms: 5_000,
            broker: BrokerConfig::default(),
        }
    }
}
