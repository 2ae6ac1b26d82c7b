//! Клиентские адаптеры брокера.
//!
//! - `publisher`: [`Publisher`], неблокирующая отправка событий.
//! - `subscriber`: [`Subscriber`], приём событий в локальную очередь.
//! - `state`: жизненный цикл адаптера.
//! - `config`: адреса и интервалы опроса.
//! - `connection`: подключение к WebSocket-маршруту брокера.
//!
//! Каждый адаптер работает в своём потоке (см. `start`) либо внутри
//! чужого runtime (см. `run`); с приложением он общается только через
//! локальную очередь.

mod adapter;
pub mod config;
pub mod connection;
pub mod publisher;
pub mod state;
pub mod subscriber;

// Публичный экспорт типов из вложенных модулей, чтобы упростить доступ к ним
// из внешнего кода.
pub use config::{AdapterConfig, ClientConfig};
pub use publisher::Publisher;
pub use state::AdapterState;
pub use subscriber::Subscriber;
