//! Сетевой модуль eventcast.
//!
//! ## Подмодули
//!
//! - `server`: приём TCP-соединений и их распределение по задачам.
//! - `connection`: WebSocket-рукопожатие и обслуживание издателя или
//!   подписчика.
//! - `routes`: сопоставление пути запроса с ролью соединения.
//! - `shutdown`: сигнал graceful shutdown.

pub mod connection;
pub mod routes;
pub mod server;
pub mod shutdown;

// Publicly re-export all network types from the submodules to simplify access
// from external code.
pub use connection::ConnectionHandler;
pub use routes::{Route, Routes};
pub use server::{Server, ServerConfig};
pub use shutdown::ShutdownHandle;
