use std::time::Duration;

use eventcast_error::NetworkError;
use tokio::{net::TcpStream, time::timeout};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, protocol::CloseFrame},
    MaybeTlsStream, WebSocketStream,
};
use tracing::debug;

/// Клиентский WebSocket-поток.
pub type ClientStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Подключается к WebSocket-маршруту брокера с таймаутом.
pub async fn connect(
    url: &str,
    connect_timeout: Duration,
) -> Result<ClientStream, NetworkError> {
    debug!(url, "Connecting");

    let (stream, response) = timeout(connect_timeout, connect_async(url))
        .await
        .map_err(|_| NetworkError::ConnectionTimeout {
            url: url.to_string(),
        })?
        .map_err(|e| NetworkError::ConnectionFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    debug!(url, status = %response.status(), "Connection established");
    Ok(stream)
}

/// Переводит ошибку транспорта в [`NetworkError`].
///
/// Всё, после чего соединением пользоваться нельзя, становится
/// `ConnectionClosed` (код считается повторяемым внешним супервизором);
/// остальное относится к одному кадру и становится `Send`.
pub fn transport_error(err: tungstenite::Error) -> NetworkError {
    use tungstenite::Error as WsError;

    match err {
        WsError::ConnectionClosed | WsError::AlreadyClosed => {
            NetworkError::ConnectionClosed { reason: None }
        }
        WsError::Io(e) => NetworkError::ConnectionClosed {
            reason: Some(e.to_string()),
        },
        WsError::Protocol(e) => NetworkError::ConnectionClosed {
            reason: Some(e.to_string()),
        },
        other => NetworkError::Send {
            reason: other.to_string(),
        },
    }
}

/// Закрывающий кадр брокера как ошибка `ConnectionClosed`.
pub fn closed_by_peer(frame: Option<CloseFrame>) -> NetworkError {
    NetworkError::ConnectionClosed {
        reason: frame
            .map(|f| f.reason.as_str().to_string())
            .filter(|r| !r.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use tungstenite::protocol::frame::coding::CloseCode;

    use super::*;

    /// Тест проверяет классификацию ошибок транспорта: обрыв связи
    /// повторяем, сбой одного кадра нет.
    #[test]
    fn test_transport_error_classification() {
        use eventcast_error::{ErrorExt, StatusCode};

        let lost = [
            tungstenite::Error::ConnectionClosed,
            tungstenite::Error::AlreadyClosed,
            tungstenite::Error::Io(std::io::ErrorKind::BrokenPipe.into()),
        ];
        for err in lost {
            let err = transport_error(err);
            assert!(matches!(err, NetworkError::ConnectionClosed { .. }), "{err:?}");
            assert!(err.status_code().is_retryable());
        }

        let frame = transport_error(tungstenite::Error::Capacity(
            tungstenite::error::CapacityError::TooManyHeaders,
        ));
        assert!(matches!(frame, NetworkError::Send { .. }));
        assert_eq!(frame.status_code(), StatusCode::WriteFailed);
        assert!(!frame.status_code().is_retryable());
    }

    #[test]
    fn test_closed_by_peer() {
        assert_eq!(closed_by_peer(None).to_string(), "Connection closed");

        let frame = CloseFrame {
            code: CloseCode::Away,
            reason: "server shutting down".to_string().into(),
        };
        assert_eq!(
            closed_by_peer(Some(frame)).to_string(),
            "Connection closed: server shutting down"
        );
    }

    /// Тест проверяет ошибку подключения к закрытому порту.
    #[tokio::test]
    async fn test_connect_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = connect(&format!("ws://{addr}/ws/publisher"), Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, NetworkError::ConnectionFailed { .. }));
    }
}
