//! JSON-кодек сообщения.
//!
//! Формат кадра:
//!
//! ```text
//! {"event": {"type": <i64>, "dict": {...}} | null, "extra": {...} | null}
//! ```

use eventcast_error::CodecError;
use tracing::trace;

use super::Message;

/// Сериализует сообщение в текстовый кадр.
pub fn encode(message: &Message) -> Result<String, CodecError> {
    serde_json::to_string(message).map_err(|e| CodecError::Encode {
        reason: e.to_string(),
    })
}

/// Разбирает текстовый кадр в сообщение.
///
/// Частично корректный кадр не превращается в сообщение: любая ошибка
/// разбора возвращается целиком.
pub fn decode(frame: &str) -> Result<Message, CodecError> {
    serde_json::from_str(frame).map_err(|e| {
        trace!(len = frame.len(), error = %e, "Rejected frame");
        CodecError::Malformed {
            reason: e.to_string(),
        }
    })
}

impl Message {
    /// См. [`encode`].
    pub fn encode(&self) -> Result<String, CodecError> {
        encode(self)
    }

    /// См. [`decode`].
    pub fn decode(frame: &str) -> Result<Self, CodecError> {
        decode(frame)
    }
}
