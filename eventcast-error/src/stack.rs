use std::{error::Error, fmt, panic::Location, sync::Arc};

use crate::{ErrorExt, LogLevel, StatusCode};

/// Ошибка с цепочкой контекстов, накопленных по пути вверх по стеку.
///
/// Корневая ошибка хранится за `Arc`, поэтому клонирование дешёвое.
#[derive(Clone)]
pub struct StackError {
    inner: Arc<dyn ErrorExt>,
    contexts: Vec<ErrorContext>,
}

/// Одна запись контекста и место, где её добавили.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub message: String,
    pub location: &'static Location<'static>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl StackError {
    pub fn new<E: ErrorExt>(err: E) -> Self {
        Self {
            inner: Arc::new(err),
            contexts: Vec::new(),
        }
    }

    /// Добавляет контекст; место вызова запоминается.
    #[track_caller]
    pub fn context(
        mut self,
        msg: impl Into<String>,
    ) -> Self {
        self.contexts.push(ErrorContext {
            message: msg.into(),
            location: Location::caller(),
        });
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.inner.status_code()
    }

    pub fn client_message(&self) -> String {
        self.inner.client_message()
    }

    pub fn log_level(&self) -> LogLevel {
        self.status_code().log_level()
    }

    pub fn contexts(&self) -> &[ErrorContext] {
        &self.contexts
    }

    pub fn downcast_ref<T: ErrorExt>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для StackError
////////////////////////////////////////////////////////////////////////////////

impl fmt::Debug for StackError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let contexts: Vec<String> = self
            .contexts
            .iter()
            .map(|c| format!("{} ({}:{})", c.message, c.location.file(), c.location.line()))
            .collect();

        f.debug_struct("StackError")
            .field("inner", &self.inner.to_string())
            .field("status_code", &self.status_code())
            .field("contexts", &contexts)
            .finish()
    }
}

impl fmt::Display for StackError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        // Внешний контекст первым.
        for ctx in self.contexts.iter().rev() {
            write!(f, "{}: ", ctx.message)?;
        }
        write!(f, "{}", self.inner)
    }
}

impl Error for StackError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl<E: ErrorExt> From<E> for StackError {
    fn from(e: E) -> Self {
        StackError::new(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BrokerError, NetworkError};

    #[test]
    fn test_context_order_in_display() {
        let err = StackError::new(NetworkError::Bind {
            address: "127.0.0.1:8000".to_string(),
            reason: "address in use".to_string(),
        })
        .context("Binding listener")
        .context("Starting server");

        assert_eq!(
            err.to_string(),
            "Starting server: Binding listener: Failed to bind 127.0.0.1:8000: address in use"
        );
        assert_eq!(err.contexts().len(), 2);
        assert!(err.contexts()[0].location.file().ends_with("stack.rs"));
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_downcast() {
        let err: StackError = BrokerError::PublisherAlreadyAssigned { current: 1 }.into();

        assert!(matches!(
            err.downcast_ref::<BrokerError>(),
            Some(BrokerError::PublisherAlreadyAssigned { current: 1 })
        ));
        assert!(err.downcast_ref::<NetworkError>().is_none());
        assert_eq!(err.status_code(), StatusCode::AlreadyExists);
        assert_eq!(err.client_message(), "Publisher already assigned");
    }
}
