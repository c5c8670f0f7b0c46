use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

/// Consumer-side "new data available" signal.
///
/// Called from worker threads. Implementations must only hand the signal
/// over to the consumer's own thread; the consumer then calls
/// `update_data` to fetch whatever is current.
pub trait UpdateReceiver: Send + Sync {
    fn data_updated(&self);
}

/// Forwards notifications into a single-slot channel.
///
/// A notification sent while the slot is full is dropped; the one already
/// waiting covers it.
#[derive(Debug, Clone)]
pub struct ChannelReceiver {
    sender: Sender<()>,
}

impl ChannelReceiver {
    /// Creates the receiver and the consumer's end of its channel.
    #[must_use]
    pub fn channel() -> (Self, Receiver<()>) {
        let (sender, receiver) = bounded(1);

        (Self { sender }, receiver)
    }
}

impl UpdateReceiver for ChannelReceiver {
    fn data_updated(&self) {
        match self.sender.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) | Err(TrySendError::Disconnected(())) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifications_collapse_into_one_slot() {
        let (receiver, notifications) = ChannelReceiver::channel();

        receiver.data_updated();
        receiver.data_updated();
        receiver.data_updated();

        assert_eq!(notifications.try_recv(), Ok(()));
        assert!(notifications.try_recv().is_err());
    }

    #[test]
    fn test_disconnected_consumer_is_ignored() {
        let (receiver, notifications) = ChannelReceiver::channel();
        drop(notifications);

        receiver.data_updated();
    }
}
