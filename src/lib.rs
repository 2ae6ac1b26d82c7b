/// Broker: single publisher slot, subscriber fan-out, history replay.
pub mod broker;
/// Publisher and subscriber adapters.
pub mod client;
/// Settings loading (defaults, TOML file, environment).
pub mod config;
/// Flexible logging (formatting, filters, sinks).
pub mod logging;
/// Message model and its JSON wire codec.
pub mod message;
/// WebSocket server: routing, connections, graceful shutdown.
pub mod network;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Broker API.
pub use broker::{
    Broker, BrokerConfig, BrokerStats, ChannelSink, ConnectionId, Frame, PublishReport,
    SubscriberSink,
};
/// Adapters.
pub use client::{AdapterConfig, AdapterState, ClientConfig, Publisher, Subscriber};
/// config
pub use config::Settings;
/// Operation errors and result types.
pub use eventcast_error::{
    BrokerError, CodecError, ConfigError, EventcastResult, NetworkError, StackError, StatusCode,
};
/// Logging.
pub use logging::{init_logging, LoggingConfig, LoggingHandle};
/// Data model.
pub use message::{Event, EventType, Message, Payload};
/// Network server.
pub use network::{Server, ServerConfig, ShutdownHandle};
