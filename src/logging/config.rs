use std::{fmt, path::PathBuf, str::FromStr};

use serde::Deserialize;
use tracing::Level;

/// Формат консольного вывода.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Многострочный, для разработки
    Pretty,
    /// Однострочный, по умолчанию
    #[default]
    Compact,
    /// Структурированный JSON
    Json,
}

/// Конфигурация системы логирования.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Базовый уровень: trace, debug, info, warn, error
    pub level: String,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub with_target: bool,
    pub with_thread_ids: bool,
    pub file: FileConfig,
}

/// Ежедневно ротируемый файловый лог.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub enabled: bool,
    pub dir: PathBuf,
    pub prefix: String,
}

/// Ошибка проверки конфигурации логирования.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLevel(pub String);

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl LoggingConfig {
    /// Проверяет уровень и параметры файлового вывода.
    pub fn validate(&self) -> Result<(), InvalidLevel> {
        self.parsed_level().map(|_| ())?;
        if self.file.enabled && self.file.prefix.trim().is_empty() {
            return Err(InvalidLevel("file prefix must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn parsed_level(&self) -> Result<Level, InvalidLevel> {
        Level::from_str(self.level.trim()).map_err(|_| InvalidLevel(self.level.clone()))
    }

    /// Директива `EnvFilter`: базовый уровень плюс приглушённый шум
    /// WebSocket-стека.
    pub fn build_filter_directive(&self) -> String {
        let level = self.level.trim().to_lowercase();
        format!("{level},tungstenite=warn,tokio_tungstenite=warn")
    }

    /// Создаёт каталог файлового лога, если он включён.
    pub fn ensure_log_dir(&self) -> std::io::Result<()> {
        if self.file.enabled {
            std::fs::create_dir_all(&self.file.dir)?;
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            with_ansi: true,
            with_target: true,
            with_thread_ids: false,
            file: FileConfig::default(),
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: PathBuf::from("logs"),
            prefix: "eventcast.log".to_string(),
        }
    }
}

impl fmt::Display for InvalidLevel {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "invalid logging configuration: {}", self.0)
    }
}

impl std::error::Error for InvalidLevel {}
