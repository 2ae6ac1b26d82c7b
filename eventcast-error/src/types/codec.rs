use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки кодека сообщений.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Входной кадр не является корректным сообщением.
    #[error("Malformed frame: {reason}")]
    Malformed { reason: String },
    /// Сообщение не удалось сериализовать.
    #[error("Encoding failed: {reason}")]
    Encode { reason: String },
}

impl ErrorExt for CodecError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Malformed { .. } => StatusCode::DecodingError,
            Self::Encode { .. } => StatusCode::EncodingError,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
