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

//! The dispatch core: subscriber registry, inbound queue and fan-out worker.
//!
//! # Architecture
//!
//! The [`Dispatcher`] is a cheaply clonable handle over shared state, created
//! once per process and passed explicitly to every adapter - there are no
//! process-wide globals. Its lifecycle is explicit: [`Dispatcher::start`]
//! spawns the fan-out worker, [`Dispatcher::stop`] closes the inbound queue,
//! drains the registry and joins the worker.
//!
//! # Routing
//!
//! Producers enqueue messages on a single bounded inbound queue. The fan-out
//! worker dequeues one message at a time, snapshots the matching subscriber
//! senders under the registry mutex, releases the lock, then performs the
//! possibly blocking inbox enqueues. Matching is byte-wise topic prefix
//! comparison only.
//!
//! # Ordering
//!
//! Registrations and accepted messages draw from one shared sequence, so a
//! message is never delivered to a subscription that arrived after the
//! message was published, and a single producer's messages reach any given
//! subscriber in publish order.

pub mod inbox;
pub mod matching;
pub mod registry;

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use smallvec::SmallVec;
use threatbus_core::{DurationNanos, UUID4, correctness::check_valid_string, string::rand_suffix};
use threatbus_model::{Message, SnapshotRequest};
use tokio::sync::mpsc;
use ustr::Ustr;

pub use self::{
    inbox::{DEFAULT_INBOX_CAPACITY, Inbox, InboxClosed, InboxReceiver, InboxSender, TryRecv},
    registry::{Origin, SubscriberEntry, SubscriberKind},
};
use self::registry::{Registry, TARGET_BUFFER_CAP};
use crate::logging::{log_task_started, log_task_stopped};

/// The length of the opaque suffix appended to an originating topic to mint
/// a point-to-point topic.
pub const P2P_SUFFIX_LEN: usize = 10;

const REGISTRY_POISONED: &str = "Registry lock poisoned";

/// Configuration for a [`Dispatcher`] instance.
#[derive(Clone, Copy, Debug)]
pub struct DispatcherConfig {
    /// The bound of the inbound queue; producers block above it.
    pub inbound_capacity: usize,
}

impl Default for DispatcherConfig {
    /// Creates a new default [`DispatcherConfig`] instance.
    fn default() -> Self {
        Self {
            inbound_capacity: 1024,
        }
    }
}

#[derive(Debug)]
enum Envelope {
    Message {
        seq: u64,
        origin: Origin,
        message: Message,
    },
    Close,
}

#[derive(Debug)]
struct DispatcherInner {
    registry: Mutex<Registry>,
    sequence: AtomicU64,
    closed: AtomicBool,
    inbound_tx: mpsc::Sender<Envelope>,
    inbound_rx: Mutex<Option<mpsc::Receiver<Envelope>>>,
    worker: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

/// The process-wide message dispatcher.
///
/// Clones share the same registry and inbound queue.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl Default for Dispatcher {
    /// Creates a new default [`Dispatcher`] instance.
    fn default() -> Self {
        Self::new(DispatcherConfig::default())
    }
}

impl Dispatcher {
    /// Creates a new [`Dispatcher`] instance.
    #[must_use]
    pub fn new(config: DispatcherConfig) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel(config.inbound_capacity);
        Self {
            inner: Arc::new(DispatcherInner {
                registry: Mutex::new(Registry::default()),
                sequence: AtomicU64::new(0),
                closed: AtomicBool::new(false),
                inbound_tx,
                inbound_rx: Mutex::new(Some(inbound_rx)),
                worker: Mutex::new(None),
            }),
        }
    }

    /// Spawns the fan-out worker on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatcher was already started.
    pub fn start(&self) -> anyhow::Result<()> {
        let rx = self
            .inner
            .inbound_rx
            .lock()
            .expect(REGISTRY_POISONED)
            .take()
            .ok_or_else(|| anyhow::anyhow!("Dispatcher already started"))?;

        let inner = self.inner.clone();
        let handle = tokio::spawn(async move { Self::run_fanout(inner, rx).await });
        *self.inner.worker.lock().expect(REGISTRY_POISONED) = Some(handle);

        log::info!("Dispatcher started");
        Ok(())
    }

    /// Closes the inbound queue, drains the registry and joins the worker.
    ///
    /// Idempotent; pending messages accepted before the stop are still
    /// fanned out.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker task panicked.
    pub async fn stop(&self) -> anyhow::Result<()> {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let _ = self.inner.inbound_tx.send(Envelope::Close).await;

        let handle = self.inner.worker.lock().expect(REGISTRY_POISONED).take();
        if let Some(handle) = handle {
            handle
                .await
                .map_err(|e| anyhow::anyhow!("Fan-out worker panicked: {e}"))?;
        } else {
            self.inner.registry.lock().expect(REGISTRY_POISONED).clear();
        }

        log::info!("Dispatcher stopped");
        Ok(())
    }

    /// Registers a subscription and returns its freshly minted p2p topic.
    ///
    /// When `snapshot_delta` is positive, a [`SnapshotRequest`] carrying the
    /// originating topic and a fresh request ID is enqueued inbound for
    /// snapshot-capable adapters to answer.
    ///
    /// # Errors
    ///
    /// Returns an error if `topic` is empty or the dispatcher is stopped
    /// while enqueuing the snapshot request.
    pub async fn subscribe(
        &self,
        topic: &str,
        sender: InboxSender,
        snapshot_delta: DurationNanos,
    ) -> anyhow::Result<Ustr> {
        check_valid_string(topic, stringify!(topic))?;
        let p2p_topic = self.register(topic, sender, SubscriberKind::App);
        log::info!("Registered subscription for topic '{topic}' as '{p2p_topic}'");

        if snapshot_delta > 0 {
            let request = SnapshotRequest::new(snapshot_delta, topic, UUID4::new());
            self.publish(Message::from(request)).await?;
        }

        Ok(p2p_topic)
    }

    /// Removes the subscription registered under `p2p_topic`.
    ///
    /// Idempotent: unknown handles are ignored. After this returns, the
    /// fan-out no longer snapshots the entry, so no further messages are
    /// enqueued into its inbox.
    pub fn unsubscribe(&self, p2p_topic: &str) {
        let removed = self
            .inner
            .registry
            .lock()
            .expect(REGISTRY_POISONED)
            .remove(p2p_topic);
        match removed {
            Some(entry) => {
                log::info!(
                    "Removed subscription '{p2p_topic}' for topic '{}'",
                    entry.topic
                );
            }
            None => log::debug!("Ignoring unsubscription for unknown handle '{p2p_topic}'"),
        }
    }

    /// Registers one app inbox for several originating topics at once.
    ///
    /// # Errors
    ///
    /// Returns an error if any topic is empty.
    pub fn subscribe_multi(
        &self,
        topics: &[&str],
        sender: &InboxSender,
    ) -> anyhow::Result<Vec<Ustr>> {
        for topic in topics {
            check_valid_string(topic, stringify!(topic))?;
        }
        Ok(topics
            .iter()
            .map(|topic| self.register(topic, sender.clone(), SubscriberKind::App))
            .collect())
    }

    /// Removes every registration of `sender` under the given topics.
    pub fn unsubscribe_inbox(&self, topics: &[&str], sender: &InboxSender) {
        let mut registry = self.inner.registry.lock().expect(REGISTRY_POISONED);
        for key in registry.keys_for_inbox(topics, sender) {
            registry.remove(key.as_str());
        }
    }

    /// Registers a backbone tap receiving every local-origin message
    /// matching the given topic prefixes.
    ///
    /// Remote-origin messages are never delivered to taps, so a message
    /// arriving over a fan-out exchange is not echoed back onto it.
    ///
    /// # Errors
    ///
    /// Returns an error if any topic is empty.
    pub fn register_tap(
        &self,
        topics: &[&str],
        sender: &InboxSender,
    ) -> anyhow::Result<Vec<Ustr>> {
        for topic in topics {
            check_valid_string(topic, stringify!(topic))?;
        }
        Ok(topics
            .iter()
            .map(|topic| self.register(topic, sender.clone(), SubscriberKind::Backbone))
            .collect())
    }

    /// Enqueues a locally produced message, blocking while the inbound
    /// queue is full.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatcher is stopped.
    pub async fn publish(&self, message: Message) -> anyhow::Result<()> {
        self.enqueue(Origin::Local, message).await
    }

    /// Enqueues a message delivered by a backbone transport from another
    /// node.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatcher is stopped.
    pub async fn publish_remote(&self, message: Message) -> anyhow::Result<()> {
        self.enqueue(Origin::Remote, message).await
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscriptions_count(&self) -> usize {
        self.inner.registry.lock().expect(REGISTRY_POISONED).len()
    }

    /// Returns the originating topics of all live subscriptions.
    #[must_use]
    pub fn topics(&self) -> Vec<Ustr> {
        self.inner.registry.lock().expect(REGISTRY_POISONED).topics()
    }

    fn register(&self, topic: &str, sender: InboxSender, kind: SubscriberKind) -> Ustr {
        let since = self.next_seq();
        let p2p_topic = Ustr::from(&format!("{topic}{}", rand_suffix(P2P_SUFFIX_LEN)));
        let entry = SubscriberEntry {
            p2p_topic,
            topic: Ustr::from(topic),
            sender,
            kind,
            since,
        };
        self.inner
            .registry
            .lock()
            .expect(REGISTRY_POISONED)
            .insert(entry);
        p2p_topic
    }

    async fn enqueue(&self, origin: Origin, message: Message) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.inner.closed.load(Ordering::SeqCst),
            "Dispatcher is stopped"
        );
        let seq = self.next_seq();
        self.inner
            .inbound_tx
            .send(Envelope::Message {
                seq,
                origin,
                message,
            })
            .await
            .map_err(|_| anyhow::anyhow!("Dispatcher inbound queue closed"))
    }

    fn next_seq(&self) -> u64 {
        self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn run_fanout(inner: Arc<DispatcherInner>, mut rx: mpsc::Receiver<Envelope>) {
        log_task_started("dispatch-fanout");

        while let Some(envelope) = rx.recv().await {
            match envelope {
                Envelope::Close => break,
                Envelope::Message {
                    seq,
                    origin,
                    message,
                } => {
                    let mut targets: SmallVec<[InboxSender; TARGET_BUFFER_CAP]> = SmallVec::new();
                    {
                        let registry = inner.registry.lock().expect(REGISTRY_POISONED);
                        registry.fill_matching(message.topic(), seq, origin, &mut targets);
                    }
                    log::debug!(
                        "Relaying {message} on '{}' to {} subscriber(s)",
                        message.topic(),
                        targets.len()
                    );
                    for sender in targets {
                        if sender.send(message.clone()).await.is_err() {
                            // Subscriber was removed concurrently; discard for it
                            log::debug!("Discarding {message} for a removed subscriber");
                        }
                    }
                }
            }
        }

        rx.close();
        inner.registry.lock().expect(REGISTRY_POISONED).clear();
        log_task_stopped("dispatch-fanout");
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use std::time::Duration;

    use threatbus_core::UnixNanos;
    use threatbus_model::{Indicator, IndicatorId, Sighting, SightingContext, topics};

    use super::*;

    fn indicator(id: &str) -> Message {
        Message::from(Indicator::new(
            IndicatorId::new(id),
            UnixNanos::from(1),
            "[domain-name:value = 'evil.com']",
            None,
        ))
    }

    fn sighting() -> Message {
        Message::from(Sighting::new(
            UnixNanos::from(1),
            IndicatorId::new("ind-1"),
            SightingContext::new(),
        ))
    }

    async fn recv_within(rx: &mut InboxReceiver, millis: u64) -> Message {
        tokio::time::timeout(Duration::from_millis(millis), rx.recv())
            .await
            .expect("Timeout waiting for message")
            .expect("Inbox closed")
    }

    #[tokio::test]
    async fn test_subscribe_mints_p2p_topic() {
        let dispatcher = Dispatcher::default();
        let (tx, _rx) = Inbox::bounded(8);

        let p2p = dispatcher.subscribe("threatbus/intel", tx, 0).await.unwrap();
        assert!(p2p.as_str().starts_with("threatbus/intel"));

        let suffix = &p2p.as_str()["threatbus/intel".len()..];
        assert_eq!(suffix.len(), P2P_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase()));
        assert_eq!(dispatcher.subscriptions_count(), 1);
    }

    #[tokio::test]
    async fn test_subscribe_rejects_empty_topic() {
        let dispatcher = Dispatcher::default();
        let (tx, _rx) = Inbox::bounded(8);
        assert!(dispatcher.subscribe("", tx, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_prefix_routing() {
        let dispatcher = Dispatcher::default();
        dispatcher.start().unwrap();

        let (tx_a, mut rx_a) = Inbox::bounded(8);
        let (tx_b, mut rx_b) = Inbox::bounded(8);
        dispatcher.subscribe("threatbus/", tx_a, 0).await.unwrap();
        dispatcher
            .subscribe("threatbus/intel", tx_b, 0)
            .await
            .unwrap();

        dispatcher.publish(sighting()).await.unwrap();

        let received = recv_within(&mut rx_a, 1000).await;
        assert_eq!(received.topic(), topics::TOPIC_SIGHTING);
        assert!(matches!(rx_b.try_recv(), TryRecv::Empty));

        dispatcher.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_single_producer_fifo_per_subscriber() {
        let dispatcher = Dispatcher::default();
        dispatcher.start().unwrap();

        let (tx, mut rx) = Inbox::bounded(8);
        dispatcher.subscribe("threatbus/intel", tx, 0).await.unwrap();

        dispatcher.publish(indicator("ind-1")).await.unwrap();
        dispatcher.publish(indicator("ind-2")).await.unwrap();
        dispatcher.publish(indicator("ind-3")).await.unwrap();

        for expected in ["ind-1", "ind-2", "ind-3"] {
            let Message::Indicator(received) = recv_within(&mut rx, 1000).await else {
                panic!("expected an indicator");
            };
            assert_eq!(received.id.as_str(), expected);
        }

        dispatcher.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_unsubscribe_is_idempotent_and_stops_delivery() {
        let dispatcher = Dispatcher::default();
        dispatcher.start().unwrap();

        let (tx, mut rx) = Inbox::bounded(8);
        let p2p = dispatcher
            .subscribe("threatbus/intel", tx, 0)
            .await
            .unwrap();

        dispatcher.unsubscribe(p2p.as_str());
        dispatcher.unsubscribe(p2p.as_str()); // second call is a no-op
        assert_eq!(dispatcher.subscriptions_count(), 0);

        dispatcher.publish(indicator("ind-1")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(matches!(rx.try_recv(), TryRecv::Empty | TryRecv::Closed));

        dispatcher.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_no_delivery_to_later_subscription() {
        let dispatcher = Dispatcher::default();

        // Accept a message before the subscription exists, with the worker
        // intentionally not yet running
        dispatcher.publish(indicator("early")).await.unwrap();

        let (tx, mut rx) = Inbox::bounded(8);
        dispatcher.subscribe("threatbus/intel", tx, 0).await.unwrap();

        dispatcher.start().unwrap();
        dispatcher.publish(indicator("late")).await.unwrap();

        let Message::Indicator(received) = recv_within(&mut rx, 1000).await else {
            panic!("expected an indicator");
        };
        assert_eq!(received.id.as_str(), "late");

        dispatcher.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_positive_snapshot_delta_emits_request() {
        let dispatcher = Dispatcher::default();
        dispatcher.start().unwrap();

        let (tx_snap, mut rx_snap) = Inbox::bounded(8);
        dispatcher
            .subscribe(topics::TOPIC_SNAPSHOT_REQUEST, tx_snap, 0)
            .await
            .unwrap();

        let (tx, _rx) = Inbox::bounded(8);
        dispatcher
            .subscribe("threatbus/intel", tx, 30_000_000_000)
            .await
            .unwrap();

        let Message::SnapshotRequest(request) = recv_within(&mut rx_snap, 1000).await else {
            panic!("expected a snapshot request");
        };
        assert_eq!(request.topic, "threatbus/intel");
        assert_eq!(request.snapshot_delta, 30_000_000_000);

        dispatcher.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_zero_snapshot_delta_emits_nothing() {
        let dispatcher = Dispatcher::default();
        dispatcher.start().unwrap();

        let (tx_snap, mut rx_snap) = Inbox::bounded(8);
        dispatcher
            .subscribe(topics::TOPIC_SNAPSHOT_REQUEST, tx_snap, 0)
            .await
            .unwrap();

        let (tx, _rx) = Inbox::bounded(8);
        dispatcher.subscribe("threatbus/intel", tx, 0).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(matches!(rx_snap.try_recv(), TryRecv::Empty));

        dispatcher.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_remote_messages_skip_backbone_taps() {
        let dispatcher = Dispatcher::default();
        dispatcher.start().unwrap();

        let (tap_tx, mut tap_rx) = Inbox::bounded(8);
        dispatcher
            .register_tap(&["threatbus/"], &tap_tx)
            .unwrap();

        let (app_tx, mut app_rx) = Inbox::bounded(8);
        dispatcher
            .subscribe("threatbus/intel", app_tx, 0)
            .await
            .unwrap();

        dispatcher.publish_remote(indicator("remote")).await.unwrap();
        let Message::Indicator(received) = recv_within(&mut app_rx, 1000).await else {
            panic!("expected an indicator");
        };
        assert_eq!(received.id.as_str(), "remote");
        assert!(matches!(tap_rx.try_recv(), TryRecv::Empty));

        dispatcher.publish(indicator("local")).await.unwrap();
        let received = recv_within(&mut tap_rx, 1000).await;
        assert_eq!(received.topic(), topics::TOPIC_INTEL);

        dispatcher.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_subscribe_multi_and_unsubscribe_inbox() {
        let dispatcher = Dispatcher::default();

        let (tx, _rx) = Inbox::bounded(8);
        let handles = dispatcher
            .subscribe_multi(&["threatbus/intel", "threatbus/sighting"], &tx)
            .unwrap();
        assert_eq!(handles.len(), 2);
        assert_eq!(dispatcher.subscriptions_count(), 2);
        assert_eq!(
            dispatcher.topics(),
            vec![Ustr::from("threatbus/intel"), Ustr::from("threatbus/sighting")]
        );

        dispatcher.unsubscribe_inbox(&["threatbus/intel"], &tx);
        assert_eq!(dispatcher.subscriptions_count(), 1);

        dispatcher.unsubscribe_inbox(&["threatbus/sighting"], &tx);
        assert_eq!(dispatcher.subscriptions_count(), 0);
    }

    #[tokio::test]
    async fn test_stop_joins_worker_and_rejects_publish() {
        let dispatcher = Dispatcher::default();
        dispatcher.start().unwrap();

        dispatcher.stop().await.unwrap();
        dispatcher.stop().await.unwrap(); // idempotent

        assert!(dispatcher.publish(indicator("ind-1")).await.is_err());
        assert_eq!(dispatcher.subscriptions_count(), 0);
    }
}
