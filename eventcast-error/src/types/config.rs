use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки загрузки и проверки конфигурации.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Источник конфигурации не удалось прочитать или разобрать.
    #[error("Failed to load configuration: {reason}")]
    Load { reason: String },
    /// Значение поля недопустимо.
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid { field: String, reason: String },
}

impl ErrorExt for ConfigError {
    fn status_code(&self) -> StatusCode {
        StatusCode::InvalidConfig
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
