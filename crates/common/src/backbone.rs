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

//! The backbone adapter interface and the in-memory reference variant.
//!
//! A backbone moves canonical messages between bus nodes. The in-memory
//! variant is a single-node identity: the dispatcher's own fan-out already
//! provisions every subscriber, so the variant exists to satisfy the adapter
//! interface when no external transport is desired. Durable multi-node
//! variants (e.g. the RabbitMQ backbone) live in their own crates.

use async_trait::async_trait;

use crate::dispatch::{Dispatcher, InboxSender};

/// The interface every backbone variant implements.
#[async_trait]
pub trait Backbone: Send + Sync {
    /// The backbone's registered name.
    fn name(&self) -> &str;

    /// Connects transports and spawns the backbone's workers.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport connection or declarations fail.
    async fn start(&self) -> anyhow::Result<()>;

    /// Stops the backbone's workers.
    ///
    /// # Errors
    ///
    /// Returns an error if a worker failed to shut down cleanly.
    async fn stop(&self) -> anyhow::Result<()>;

    /// Registers an app inbox for several originating topics at once.
    ///
    /// # Errors
    ///
    /// Returns an error if any topic is invalid.
    async fn subscribe(&self, topics: &[&str], sender: &InboxSender) -> anyhow::Result<()>;

    /// Removes the registrations of an app inbox for the given topics.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry is unavailable.
    async fn unsubscribe(&self, topics: &[&str], sender: &InboxSender) -> anyhow::Result<()>;
}

/// The single-node in-memory backbone.
///
/// Subscription state is the dispatcher's registry itself; `start`/`stop`
/// are no-ops beyond the dispatcher's own lifecycle.
#[derive(Clone, Debug)]
pub struct InMemoryBackbone {
    dispatcher: Dispatcher,
}

impl InMemoryBackbone {
    /// Creates a new [`InMemoryBackbone`] instance.
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl Backbone for InMemoryBackbone {
    fn name(&self) -> &str {
        "inmem"
    }

    async fn start(&self) -> anyhow::Result<()> {
        log::info!("In-memory backbone started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        log::info!("In-memory backbone stopped");
        Ok(())
    }

    async fn subscribe(&self, topics: &[&str], sender: &InboxSender) -> anyhow::Result<()> {
        self.dispatcher.subscribe_multi(topics, sender)?;
        Ok(())
    }

    async fn unsubscribe(&self, topics: &[&str], sender: &InboxSender) -> anyhow::Result<()> {
        self.dispatcher.unsubscribe_inbox(topics, sender);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::rstest;
    use threatbus_core::UnixNanos;
    use threatbus_model::{Indicator, IndicatorId, Message};

    use super::*;
    use crate::dispatch::{Inbox, TryRecv};

    fn indicator() -> Message {
        Message::from(Indicator::new(
            IndicatorId::new("ind-1"),
            UnixNanos::from(1),
            "[domain-name:value = 'evil.com']",
            None,
        ))
    }

    #[rstest]
    fn test_name() {
        let backbone = InMemoryBackbone::new(Dispatcher::default());
        assert_eq!(backbone.name(), "inmem");
    }

    #[tokio::test]
    async fn test_subscribe_multiple_topics_and_provision() {
        let dispatcher = Dispatcher::default();
        dispatcher.start().unwrap();
        let backbone = InMemoryBackbone::new(dispatcher.clone());
        backbone.start().await.unwrap();

        let (tx, mut rx) = Inbox::bounded(8);
        backbone
            .subscribe(&["threatbus/intel", "threatbus/sighting"], &tx)
            .await
            .unwrap();
        assert_eq!(dispatcher.subscriptions_count(), 2);

        dispatcher.publish(indicator()).await.unwrap();
        let received = tokio::time::timeout(Duration::from_millis(500), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received.topic(), "threatbus/intel");

        backbone
            .unsubscribe(&["threatbus/intel", "threatbus/sighting"], &tx)
            .await
            .unwrap();
        assert_eq!(dispatcher.subscriptions_count(), 0);

        dispatcher.publish(indicator()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(matches!(rx.try_recv(), TryRecv::Empty | TryRecv::Closed));

        backbone.stop().await.unwrap();
        dispatcher.stop().await.unwrap();
    }
}
