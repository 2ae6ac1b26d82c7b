//! Загрузка настроек: значения по умолчанию → TOML-файл → переменные
//! окружения `EVENTCAST__*`.

pub mod settings;

pub use settings::Settings;
