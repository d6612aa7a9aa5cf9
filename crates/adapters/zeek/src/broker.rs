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

//! The typed interface to a Zeek broker endpoint.
//!
//! The concrete wire library is an external collaborator; the adapter only
//! depends on the event shape (a name plus positional typed arguments) and
//! the publish/subscribe operations defined here.

use async_trait::async_trait;
use indexmap::IndexMap;
use threatbus_core::{DurationNanos, UnixNanos};
use threatbus_common::errors::TransportError;
use tokio::sync::mpsc;
use ustr::Ustr;

/// A typed value carried as a broker event argument.
#[derive(Clone, Debug, PartialEq)]
pub enum BrokerData {
    /// A string value.
    Str(String),
    /// An unsigned count value.
    Count(u64),
    /// A point in time.
    Timestamp(UnixNanos),
    /// A time interval in nanoseconds.
    Duration(DurationNanos),
    /// A table of named values.
    Table(IndexMap<String, BrokerData>),
}

impl From<&str> for BrokerData {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for BrokerData {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<u64> for BrokerData {
    fn from(value: u64) -> Self {
        Self::Count(value)
    }
}

impl From<UnixNanos> for BrokerData {
    fn from(value: UnixNanos) -> Self {
        Self::Timestamp(value)
    }
}

/// A named broker event with positional arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct ZeekEvent {
    /// The qualified event name, e.g. `Tenzir::intel`.
    pub name: String,
    /// The positional event arguments.
    pub args: Vec<BrokerData>,
}

impl ZeekEvent {
    /// Creates a new [`ZeekEvent`] instance.
    #[must_use]
    pub fn new<T: Into<String>>(name: T, args: Vec<BrokerData>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// A stream of `(topic, event)` pairs received from the endpoint.
#[derive(Debug)]
pub struct BrokerSubscriber {
    rx: mpsc::UnboundedReceiver<(Ustr, ZeekEvent)>,
}

impl BrokerSubscriber {
    /// Creates a new [`BrokerSubscriber`] instance over a delivery channel.
    #[must_use]
    pub fn new(rx: mpsc::UnboundedReceiver<(Ustr, ZeekEvent)>) -> Self {
        Self { rx }
    }

    /// Receives the next event, waiting until one arrives.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] once the peer tears the endpoint
    /// down.
    pub async fn next(&mut self) -> Result<(Ustr, ZeekEvent), TransportError> {
        self.rx.recv().await.ok_or(TransportError::Closed)
    }
}

/// A bidirectional broker endpoint to one Zeek instance.
#[async_trait]
pub trait BrokerEndpoint: Send + Sync + 'static {
    /// Starts listening for the peer on the given interface.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the listener cannot be established.
    async fn listen(&self, host: &str, port: u16) -> Result<(), TransportError>;

    /// Publishes an event on a topic.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the event could not be handed to the
    /// transport.
    async fn publish(&self, topic: &str, event: ZeekEvent) -> Result<(), TransportError>;

    /// Subscribes to the given topic prefixes.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the subscription cannot be
    /// established.
    async fn subscribe(&self, topics: &[&str]) -> Result<BrokerSubscriber, TransportError>;
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_broker_data_conversions() {
        assert_eq!(BrokerData::from("a"), BrokerData::Str("a".to_string()));
        assert_eq!(BrokerData::from(3_u64), BrokerData::Count(3));
        assert_eq!(
            BrokerData::from(UnixNanos::from(7)),
            BrokerData::Timestamp(UnixNanos::from(7))
        );
    }

    #[tokio::test]
    async fn test_subscriber_closed_when_sender_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut subscriber = BrokerSubscriber::new(rx);

        tx.send((Ustr::from("threatbus/manage"), ZeekEvent::new("ping", vec![])))
            .unwrap();
        let (topic, event) = subscriber.next().await.unwrap();
        assert_eq!(topic.as_str(), "threatbus/manage");
        assert_eq!(event.name, "ping");

        drop(tx);
        assert_eq!(subscriber.next().await, Err(TransportError::Closed));
    }
}
