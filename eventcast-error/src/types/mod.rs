pub mod broker;
pub mod codec;
pub mod config;
pub mod network;

// Публичный экспорт всех типов ошибок из вложенных модулей, чтобы упростить
// доступ к ним из внешнего кода.
pub use broker::*;
pub use codec::*;
pub use config::*;
pub use network::*;

use std::io;

use crate::{ErrorExt, StackError, StatusCode};

/// Универсальная ошибка с кодом и сообщением.
#[derive(Debug, Clone)]
pub struct GenericError {
    code: StatusCode,
    message: String,
}

impl GenericError {
    pub fn new(
        code: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for GenericError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for GenericError {}

impl ErrorExt for GenericError {
    fn status_code(&self) -> StatusCode {
        self.code
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Ошибки ввода-вывода, пришедшие из std: сокеты, файлы, потоки.
impl From<io::Error> for StackError {
    fn from(err: io::Error) -> Self {
        StackError::new(GenericError::new(io_status(err.kind()), err.to_string()))
    }
}

fn io_status(kind: io::ErrorKind) -> StatusCode {
    use io::ErrorKind::*;

    match kind {
        NotFound => StatusCode::NotFound,
        TimedOut | WouldBlock => StatusCode::Timeout,
        AddrInUse | AddrNotAvailable => StatusCode::BindFailed,
        BrokenPipe | UnexpectedEof => StatusCode::ConnectionClosed,
        ConnectionRefused | ConnectionReset | ConnectionAborted => StatusCode::ConnectionFailed,
        _ => StatusCode::Io,
    }
}
