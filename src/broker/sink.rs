use eventcast_error::BrokerError;
use tokio::sync::mpsc;

use super::{ConnectionId, Frame};

/// Получатель кадров на стороне брокера.
///
/// `send_text` вызывается под блокировкой брокера, поэтому реализация
/// обязана только поставить кадр в очередь и не ждать сети.
pub trait SubscriberSink: Send + Sync {
    fn id(&self) -> ConnectionId;

    fn send_text(
        &self,
        frame: &Frame,
    ) -> Result<(), BrokerError>;
}

/// Sink поверх неограниченного `mpsc`-канала.
///
/// Вторая половина канала принадлежит задаче-писателю соединения, которая
/// пишет кадры в сокет в порядке постановки.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<Frame>,
}

impl ChannelSink {
    /// Создаёт sink и принимающую сторону его канала.
    pub fn new(id: ConnectionId) -> (Self, mpsc::UnboundedReceiver<Frame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { id, tx }, rx)
    }

    /// `true`, если писатель соединения уже завершился.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl SubscriberSink for ChannelSink {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn send_text(
        &self,
        frame: &Frame,
    ) -> Result<(), BrokerError> {
        self.tx
            .send(frame.clone())
            .map_err(|_| BrokerError::DeliveryFailed {
                connection_id: self.id.0,
                reason: "writer closed".to_string(),
            })
    }
}
