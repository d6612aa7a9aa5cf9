// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2026 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Bounded per-subscriber message queues.
//!
//! An inbox is a bounded thread-safe queue of canonical messages. A message
//! occupies a permit from enqueue until the consuming loop dequeues it, so a
//! producer blocks once a subscriber falls `capacity` messages behind - that
//! blocking *is* the backpressure contract, it is never reported as an error.

use thiserror::Error;
use threatbus_model::Message;
use tokio::sync::mpsc;

/// The default high-water mark for a subscriber inbox.
pub const DEFAULT_INBOX_CAPACITY: usize = 512;

/// The error returned when enqueuing into an inbox whose receiver is gone.
///
/// Producers treat this as "subscriber concurrently removed" and silently
/// discard the message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("Inbox closed: receiver dropped")]
pub struct InboxClosed;

/// The result of a non-blocking dequeue attempt.
#[derive(Debug)]
pub enum TryRecv {
    /// A message was dequeued.
    Message(Message),
    /// The inbox is currently empty but still has live senders.
    Empty,
    /// The inbox is empty and every sender has been dropped.
    Closed,
}

/// Factory for bounded inbox channel halves.
#[derive(Debug)]
pub struct Inbox;

impl Inbox {
    /// Creates a new bounded inbox with the given high-water mark.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn bounded(capacity: usize) -> (InboxSender, InboxReceiver) {
        let (tx, rx) = mpsc::channel(capacity);
        (InboxSender { tx }, InboxReceiver { rx })
    }
}

/// The producer half of an inbox, held by the dispatch registry.
#[derive(Clone, Debug)]
pub struct InboxSender {
    tx: mpsc::Sender<Message>,
}

impl InboxSender {
    /// Enqueues a message, blocking while the inbox is at its high-water mark.
    ///
    /// # Errors
    ///
    /// Returns [`InboxClosed`] if the receiver was dropped.
    pub async fn send(&self, message: Message) -> Result<(), InboxClosed> {
        self.tx.send(message).await.map_err(|_| InboxClosed)
    }

    /// Returns whether `self` and `other` enqueue into the same inbox.
    #[must_use]
    pub fn same_channel(&self, other: &Self) -> bool {
        self.tx.same_channel(&other.tx)
    }

    /// Returns whether the receiving half has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Returns the high-water mark of the inbox.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

/// The consumer half of an inbox, held by the owning app adapter.
#[derive(Debug)]
pub struct InboxReceiver {
    rx: mpsc::Receiver<Message>,
}

impl InboxReceiver {
    /// Dequeues the next message, waiting until one is available.
    ///
    /// Returns `None` once the inbox is closed and drained.
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    /// Attempts to dequeue a message without waiting.
    pub fn try_recv(&mut self) -> TryRecv {
        match self.rx.try_recv() {
            Ok(message) => TryRecv::Message(message),
            Err(mpsc::error::TryRecvError::Empty) => TryRecv::Empty,
            Err(mpsc::error::TryRecvError::Disconnected) => TryRecv::Closed,
        }
    }

    /// Closes the inbox for new writes; queued messages remain consumable.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
