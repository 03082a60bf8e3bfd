//! In-process channel backed by `std::sync::mpsc`.

use std::sync::{Mutex, mpsc};

use thiserror::Error;

use crate::channel::{EventChannel, Subscription};

#[derive(Debug, Error)]
pub enum InMemoryChannelError {
    /// A publisher panicked while holding the subscriber list.
    #[error("channel subscriber list is poisoned")]
    Poisoned,
}

/// In-memory fan-out channel. No IO, no async.
#[derive(Debug)]
pub struct InMemoryChannel<M> {
    subscribers: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M> InMemoryChannel<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of subscriptions still alive as of the last publish.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|subs| subs.len()).unwrap_or(0)
    }
}

impl<M> Default for InMemoryChannel<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<M> EventChannel<M> for InMemoryChannel<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryChannelError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut subs = self
            .subscribers
            .lock()
            .map_err(|_| InMemoryChannelError::Poisoned)?;

        // Dropped subscriptions fail to receive; forget them.
        subs.retain(|tx| tx.send(message.clone()).is_ok());
        tracing::trace!(subscribers = subs.len(), "published channel message");

        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();

        match self.subscribers.lock() {
            Ok(mut subs) => subs.push(tx),
            Err(_) => tracing::error!("channel poisoned; subscription will never receive"),
        }

        Subscription::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn every_subscriber_receives_each_message() {
        let channel = InMemoryChannel::new();
        let first = channel.subscribe();
        let second = channel.subscribe();

        channel.publish(1u32).unwrap();
        channel.publish(2u32).unwrap();

        assert_eq!(first.drain(), vec![1, 2]);
        assert_eq!(second.drain(), vec![1, 2]);
        assert!(first.try_recv().is_err());
    }

    #[test]
    fn late_subscribers_do_not_see_earlier_messages() {
        let channel = InMemoryChannel::new();
        channel.publish("early").unwrap();

        let late = channel.subscribe();
        channel.publish("late").unwrap();

        assert_eq!(late.drain(), vec!["late"]);
    }

    #[test]
    fn dropped_subscriptions_are_pruned_on_publish() {
        let channel = InMemoryChannel::new();
        let kept = channel.subscribe();
        drop(channel.subscribe());
        assert_eq!(channel.subscriber_count(), 2);

        channel.publish(()).unwrap();

        assert_eq!(channel.subscriber_count(), 1);
        assert_eq!(kept.drain().len(), 1);
    }

    #[test]
    fn shared_handle_publishes_to_the_same_subscribers() {
        let channel = Arc::new(InMemoryChannel::new());
        let sub = channel.subscribe();
        let publisher = Arc::clone(&channel);

        publisher.publish(7u8).unwrap();

        assert_eq!(sub.drain(), vec![7]);
    }

    #[test]
    fn publishing_with_no_subscribers_is_fine() {
        let channel: InMemoryChannel<u8> = InMemoryChannel::new();
        assert!(channel.publish(1).is_ok());
    }
}
