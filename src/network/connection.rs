use std::{net::SocketAddr, sync::Arc, time::Duration};

use eventcast_error::{ErrorExt, NetworkError};
use futures::{SinkExt, StreamExt};
use tokio::{net::TcpStream, select, time::timeout};
use tokio_tungstenite::{
    accept_hdr_async,
    tungstenite::{
        handshake::server::{ErrorResponse, Request, Response},
        http::StatusCode,
        Message as WsMessage,
    },
    WebSocketStream,
};
use tracing::{debug, info, trace, warn};

use super::{Route, Routes, ShutdownHandle};
use crate::broker::{Broker, ChannelSink, ConnectionId, Frame};

type WsStream = WebSocketStream<TcpStream>;

/// Обработчик отдельного соединения.
///
/// Выполняет рукопожатие, определяет роль по пути запроса и обслуживает
/// соединение до его закрытия или сигнала остановки.
pub struct ConnectionHandler {
    id: ConnectionId,
    addr: SocketAddr,
    broker: Arc<Broker>,
    shutdown: ShutdownHandle,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl ConnectionHandler {
    pub fn new(
        addr: SocketAddr,
        broker: Arc<Broker>,
        shutdown: ShutdownHandle,
    ) -> Self {
        Self {
            id: broker.next_connection_id(),
            addr,
            broker,
            shutdown,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Основной цикл обработки соединения.
    pub async fn run(
        self,
        socket: TcpStream,
        routes: &Routes,
        handshake_timeout: Duration,
    ) -> Result<(), NetworkError> {
        let (route, ws) = match timeout(handshake_timeout, handshake(socket, routes)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(NetworkError::Handshake {
                    reason: format!("timed out after {handshake_timeout:?}"),
                })
            }
        };

        info!(conn = %self.id, addr = %self.addr, %route, "Connection established");
        match route {
            Route::Publisher => self.serve_publisher(ws).await,
            Route::Subscriber => self.serve_subscriber(ws).await,
        }
        Ok(())
    }

    /// Обслуживает издателя: пересылает каждый текстовый кадр в брокер.
    async fn serve_publisher(
        &self,
        mut ws: WsStream,
    ) {
        if let Err(e) = self.broker.assign_publisher(self.id) {
            if let Err(send_err) = ws.send(WsMessage::text(e.client_message())).await {
                debug!(conn = %self.id, error = %send_err, "Failed to send rejection");
            }
            let _ = ws.close(None).await;
            return;
        }

        loop {
            select! {
                _ = self.shutdown.wait() => {
                    debug!(conn = %self.id, "Publisher: shutdown signal");
                    let _ = ws.close(None).await;
                    break;
                }
                msg = ws.next() => match msg {
                    Some(Ok(WsMessage::Text(text))) => {
                        trace!(conn = %self.id, len = text.len(), "Publisher frame");
                        self.broker.publish(Frame::from(text.as_str()));
                    }
                    Some(Ok(WsMessage::Binary(data))) => {
                        debug!(conn = %self.id, len = data.len(), "Ignoring binary frame");
                    }
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(conn = %self.id, error = %e, "Publisher read error");
                        break;
                    }
                }
            }
        }

        self.broker.release_publisher(self.id);
        info!(conn = %self.id, addr = %self.addr, "Publisher disconnected");
    }

    /// Обслуживает подписчика.
    ///
    /// Кадры пишет отдельная задача, питаемая из канала `ChannelSink`;
    /// входящий поток читается только ради обнаружения разрыва.
    async fn serve_subscriber(
        &self,
        ws: WsStream,
    ) {
        let (mut write, mut read) = ws.split();
        let (sink, mut rx) = ChannelSink::new(self.id);

        let id = self.id;
        let writer = tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                if let Err(e) = write.send(WsMessage::text(frame.to_string())).await {
                    debug!(conn = %id, error = %e, "Subscriber write failed");
                    return;
                }
            }
            // Канал закрыт: брокер отпустил sink, закрываем сокет.
            let _ = write.close().await;
        });

        self.broker.register(Arc::new(sink));

        loop {
            select! {
                _ = self.shutdown.wait() => {
                    debug!(conn = %self.id, "Subscriber: shutdown signal");
                    break;
                }
                msg = read.next() => match msg {
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(conn = %self.id, error = %e, "Subscriber read error");
                        break;
                    }
                }
            }
        }

        self.broker.unregister(self.id);
        if let Err(e) = writer.await {
            warn!(conn = %self.id, error = %e, "Subscriber writer task failed");
        }
        info!(conn = %self.id, addr = %self.addr, "Subscriber disconnected");
    }
}

/// WebSocket-рукопожатие с маршрутизацией по пути.
///
/// Неизвестный путь отклоняется ответом HTTP 404 до апгрейда.
async fn handshake(
    socket: TcpStream,
    routes: &Routes,
) -> Result<(Route, WsStream), NetworkError> {
    let mut route = None;
    let callback = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        let path = req.uri().path();
        match routes.resolve(path) {
            Some(r) => {
                route = Some(r);
                Ok(resp)
            }
            None => {
                debug!(path, "Rejecting unknown path");
                let mut err = ErrorResponse::new(Some(format!("No route for {path}")));
                *err.status_mut() = StatusCode::NOT_FOUND;
                Err(err)
            }
        }
    };

    let ws = accept_hdr_async(socket, callback)
        .await
        .map_err(|e| NetworkError::Handshake {
            reason: e.to_string(),
        })?;

    match route {
        Some(route) => Ok((route, ws)),
        None => Err(NetworkError::Handshake {
            reason: "route not resolved".to_string(),
        }),
    }
}
