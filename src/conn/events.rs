use crate::ChangeEvent;
use tokio::sync::mpsc;

/// The receiving end of a connection's event queue, as returned by
/// [`Connection::register`](crate::Connection::register).
///
/// The queue is bounded; when the subscriber does not keep up, further
/// events are dropped until there is room again.
#[derive(Debug)]
pub struct EventSubscription {
    receiver: mpsc::Receiver<ChangeEvent>,
}

impl EventSubscription {
    pub(crate) fn new(receiver: mpsc::Receiver<ChangeEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next event.
    ///
    /// Returns `None` when the connection is closed and all buffered
    /// events are consumed.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.receiver.recv().await
    }

    /// Returns the next buffered event without waiting.
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        self.receiver.try_recv().ok()
    }
}
