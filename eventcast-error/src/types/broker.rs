use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки брокера.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    /// Канал издателя уже занят другим соединением.
    #[error("Publisher already assigned")]
    PublisherAlreadyAssigned { current: u32 },
    /// Кадр не удалось передать одному подписчику.
    #[error("Delivery to connection {connection_id} failed: {reason}")]
    DeliveryFailed { connection_id: u32, reason: String },
}

impl ErrorExt for BrokerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::PublisherAlreadyAssigned { .. } => StatusCode::AlreadyExists,
            Self::DeliveryFailed { .. } => StatusCode::WriteFailed,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
