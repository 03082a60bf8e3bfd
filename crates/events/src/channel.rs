//! Publish/subscribe seam between components that do not share a parent.
//!
//! The saved-filter registry and the list controllers of a page are mounted
//! independently; both receive the same channel handle explicitly.
//!
//! Semantics:
//!
//! - **Fan-out**: every live subscription receives a copy of each message.
//! - **Fire-and-forget**: `publish` does not wait for, or report, consumption.
//! - **No replay**: a subscription only sees messages published after it was
//!   created.
//! - **Pull-based consumption**: subscribers drain their queue on their own
//!   schedule (typically once per UI tick), so handlers never run re-entrantly
//!   inside `publish`.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

/// Receiving end of a channel.
///
/// Dropping the subscription unsubscribes; the channel prunes it on the next
/// publish.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Take the next queued message, if any, without blocking.
    pub fn try_recv(&self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Take every message queued so far, oldest first.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Transport-agnostic publish/subscribe channel.
pub trait EventChannel<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, C> EventChannel<M> for Arc<C>
where
    C: EventChannel<M> + ?Sized,
{
    type Error = C::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
