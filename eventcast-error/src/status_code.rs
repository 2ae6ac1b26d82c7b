use std::fmt;

use num_enum::TryFromPrimitive;

/// Коды статуса для классификации ошибок.
///
/// # Диапазоны:
/// - 1xxx: общие и внутренние ошибки
/// - 2xxx: состояние брокера и конфигурация
/// - 6xxx: сеть и IO
/// - 8xxx: кодек сообщений
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 1xxx ===
    Unknown = 1000,
    Unexpected = 1002,
    Internal = 1003,
    InvalidArgs = 1004,

    // === 2xxx ===
    NotFound = 2000,
    AlreadyExists = 2001,
    InvalidConfig = 2010,

    // === 6xxx ===
    Io = 6000,
    ConnectionClosed = 6001,
    Timeout = 6002,
    ProtocolError = 6003,
    ConnectionFailed = 6004,
    WriteFailed = 6008,
    BindFailed = 6009,

    // === 8xxx ===
    EncodingError = 8010,
    DecodingError = 8011,
}

/// Уровень, с которым ошибку стоит логировать.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl StatusCode {
    pub const fn code(self) -> u32 {
        self as u32
    }

    pub fn from_u32(v: u32) -> Option<Self> {
        Self::try_from(v).ok()
    }

    /// Ошибки, детали которых не показываются удалённой стороне.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Unknown | Self::Unexpected | Self::Internal)
    }

    /// Операцию имеет смысл повторить внешним супервизором (адаптеры
    /// сами не переподключаются).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::ConnectionFailed | Self::ConnectionClosed
        )
    }

    /// Ошибка кодека (диапазон 8xxx).
    pub fn is_protocol_error(&self) -> bool {
        (8000..=8999).contains(&self.code())
    }

    /// Штатные обрывы соединений не должны засорять журнал.
    pub fn log_level(&self) -> LogLevel {
        match self {
            Self::NotFound | Self::ConnectionClosed => LogLevel::Debug,
            Self::AlreadyExists | Self::ProtocolError => LogLevel::Info,
            Self::Internal
            | Self::Unexpected
            | Self::BindFailed
            | Self::InvalidConfig => LogLevel::Error,
            _ => LogLevel::Warn,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для StatusCode
////////////////////////////////////////////////////////////////////////////////

impl From<StatusCode> for u32 {
    fn from(c: StatusCode) -> Self {
        c.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет, какие коды можно повторять.
    #[test]
    fn test_retryable() {
        assert!(StatusCode::Timeout.is_retryable());
        assert!(StatusCode::ConnectionFailed.is_retryable());
        assert!(!StatusCode::AlreadyExists.is_retryable());
        assert!(!StatusCode::DecodingError.is_retryable());
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(StatusCode::ConnectionClosed.log_level(), LogLevel::Debug);
        assert_eq!(StatusCode::ProtocolError.log_level(), LogLevel::Info);
        assert_eq!(StatusCode::Timeout.log_level(), LogLevel::Warn);
        assert_eq!(StatusCode::BindFailed.log_level(), LogLevel::Error);
        assert!(LogLevel::Warn > LogLevel::Info);
    }

    /// Тест проверяет разбор кода из числа.
    #[test]
    fn test_from_u32() {
        assert_eq!(StatusCode::from_u32(2001), Some(StatusCode::AlreadyExists));
        assert_eq!(StatusCode::from_u32(8011), Some(StatusCode::DecodingError));
        assert_eq!(StatusCode::from_u32(4242), None);
        assert_eq!(u32::from(StatusCode::Timeout), 6002);
        assert_eq!(StatusCode::AlreadyExists.to_string(), "AlreadyExists (2001)");
    }
}
