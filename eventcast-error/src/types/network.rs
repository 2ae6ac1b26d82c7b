use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки сетевого подключения и передачи данных.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// Не удалось занять адрес для прослушивания
    #[error("Failed to bind {address}: {reason}")]
    Bind { address: String, reason: String },
    /// Не удалось подключиться
    #[error("Failed to connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },
    /// Таймаут подключения
    #[error("Connection timeout to {url}")]
    ConnectionTimeout { url: String },
    /// Соединение закрыто
    #[error("Connection closed{}", closed_suffix(.reason))]
    ConnectionClosed { reason: Option<String> },
    /// Ошибка WebSocket-рукопожатия
    #[error("Handshake failed: {reason}")]
    Handshake { reason: String },
    /// Ошибка отправки кадра
    #[error("Send failed: {reason}")]
    Send { reason: String },
}

fn closed_suffix(reason: &Option<String>) -> String {
    reason
        .as_ref()
        .map(|r| format!(": {r}"))
        .unwrap_or_default()
}

impl ErrorExt for NetworkError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Bind { .. } => StatusCode::BindFailed,
            Self::ConnectionFailed { .. } => StatusCode::ConnectionFailed,
            Self::ConnectionTimeout { .. } => StatusCode::Timeout,
            Self::ConnectionClosed { .. } => StatusCode::ConnectionClosed,
            Self::Handshake { .. } => StatusCode::ProtocolError,
            Self::Send { .. } => StatusCode::WriteFailed,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn client_message(&self) -> String {
        match self {
            Self::Bind { .. } => "Server unavailable".to_string(),
            Self::ConnectionFailed { .. } => "Connection failed".to_string(),
            Self::ConnectionTimeout { .. } => "Connection timeout".to_string(),
            Self::ConnectionClosed { .. } => "Connection closed".to_string(),
            Self::Handshake { .. } => "Protocol error".to_string(),
            Self::Send { .. } => "Send failed".to_string(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
