//! Брокер: единственный издатель, множество подписчиков, история кадров.
//!
//! - `broker`: [`Broker`] и его состояние.
//! - `sink`: трейт [`SubscriberSink`] и канальная реализация.
//!
//! Брокер работает только с сырыми текстовыми кадрами и никогда их не
//! разбирает.

pub mod broker;
pub mod sink;

use std::{fmt, sync::Arc};

// Publicly re-export all broker types from the submodules to simplify access
// from external code.
pub use broker::*;
pub use sink::*;

/// Сырой текстовый кадр в том виде, в каком его прислал издатель.
///
/// Один кадр разделяется между историей и всеми очередями подписчиков.
pub type Frame = Arc<str>;

/// Идентификатор соединения, уникальный в пределах одного брокера.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u32);

impl fmt::Display for ConnectionId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
