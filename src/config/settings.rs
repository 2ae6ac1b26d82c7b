use std::path::Path;

use config::{Config, Environment, File, FileFormat, Map};
use eventcast_error::ConfigError;
use serde::Deserialize;

use crate::{client::ClientConfig, logging::LoggingConfig, network::ServerConfig};

/// Префикс переменных окружения.
pub const ENV_PREFIX: &str = "EVENTCAST";

/// Полные настройки приложения.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Загружает настройки из файла (если указан) и окружения процесса.
    ///
    /// Вложенные ключи в окружении разделяются `__`:
    /// `EVENTCAST__SERVER__LISTEN=0.0.0.0:8000`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Как [`load`](Self::load), но окружение можно подменить явным
    /// отображением.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            // Добавляем значения по умолчанию
            .set_default("server.listen", defaults.server.listen)
            .and_then(|b| b.set_default("client.url", defaults.client.url))
            .map_err(load_error)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        // Добавляем переменные окружения с префиксом EVENTCAST__
        let cfg = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .map_err(load_error)?;

        // Десериализуем конфигурацию в нашу структуру
        let settings: Settings = cfg.try_deserialize().map_err(load_error)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Проверяет значения, которые serde пропустит как корректные.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let server = &self.server;
        if server.listen.trim().is_empty() {
            return Err(invalid("server.listen", "must not be empty"));
        }
        for (field, path) in [
            ("server.publisher_path", &server.routes.publisher_path),
            ("server.subscriber_path", &server.routes.subscriber_path),
        ] {
            if !path.starts_with('/') {
                return Err(invalid(field, "must start with '/'"));
            }
        }
        if server.routes.publisher_path == server.routes.subscriber_path {
            return Err(invalid(
                "server.subscriber_path",
                "must differ from server.publisher_path",
            ));
        }
        if server.broker.history_capacity == Some(0) {
            return Err(invalid("server.broker.history_capacity", "must be positive"));
        }
        if server.handshake_timeout_ms == 0 {
            return Err(invalid("server.handshake_timeout_ms", "must be positive"));
        }

        let client = &self.client;
        if !(client.url.starts_with("ws://") || client.url.starts_with("wss://")) {
            return Err(invalid("client.url", "must use ws:// or wss://"));
        }
        if client.publisher_poll_ms == 0 || client.subscriber_poll_ms == 0 {
            return Err(invalid("client.*_poll_ms", "must be positive"));
        }

        self.logging
            .validate()
            .map_err(|e| invalid("logging", e.to_string()))
    }
}

fn load_error(e: config::ConfigError) -> ConfigError {
    ConfigError::Load {
        reason: e.to_string(),
    }
}

fn invalid(
    field: &str,
    reason: impl Into<String>,
) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.into(),
    }
}
