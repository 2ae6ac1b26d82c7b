use std::{any::Any, error::Error};

use crate::StatusCode;

/// Общий интерфейс ошибок крейта (object-safe).
pub trait ErrorExt: Error + Send + Sync + 'static {
    /// Код статуса. По умолчанию [`StatusCode::Internal`].
    fn status_code(&self) -> StatusCode {
        StatusCode::Internal
    }

    /// Для downcast внутри [`StackError`](crate::StackError).
    fn as_any(&self) -> &dyn Any;

    /// Текст, который можно отдать удалённой стороне.
    ///
    /// Внутренние ошибки не раскрываются.
    fn client_message(&self) -> String {
        if self.status_code().is_internal() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}
