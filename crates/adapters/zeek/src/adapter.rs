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

//! The Zeek app adapter.
//!
//! After the endpoint starts listening, three workers run concurrently:
//!
//! 1. The intel/sighting listener translates inbound tool events into
//!    canonical messages and forwards them to the dispatcher.
//! 2. The management listener negotiates subscriptions: it registers with
//!    the dispatcher (which mints the p2p topic), acknowledges over
//!    `threatbus/manage` and tracks the per-subscription inbox locally.
//! 3. The outbound fan-out multiplexes the local inboxes onto the endpoint,
//!    dequeuing at most one message per inbox per cycle with a bounded
//!    50 ms wait so fresh subscriptions are picked up promptly.
//!
//! A transport close observed by any worker shuts the siblings down via a
//! shared shutdown signal.

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use indexmap::IndexMap;
use threatbus_common::{
    dispatch::{Dispatcher, Inbox, InboxReceiver, P2P_SUFFIX_LEN, TryRecv},
    enums::SubscriptionState,
    errors::TransportError,
    logging::{log_task_started, log_task_stopped},
    plugins::{Component, ComponentFactory},
};
use threatbus_model::{Message, Subscription, Unsubscription, topics};
use tokio::sync::watch;
use ustr::Ustr;

use crate::{
    broker::{BrokerEndpoint, BrokerSubscriber},
    config::{COMPONENT, ZeekConfig},
    mapping::{self, ManagementCommand},
};

/// The bounded wait of the outbound fan-out loop.
const FANOUT_WAIT_MILLIS: u64 = 50;

const STATE_POISONED: &str = "Subscription map lock poisoned";

/// A live subscription tracked by the adapter.
#[derive(Debug)]
struct LocalSubscription {
    receiver: InboxReceiver,
    state: SubscriptionState,
}

type SubscriptionMap = Arc<Mutex<IndexMap<Ustr, LocalSubscription>>>;

/// The app adapter owning one bidirectional endpoint to a Zeek instance.
#[derive(Debug)]
pub struct ZeekApp<E: BrokerEndpoint> {
    config: ZeekConfig,
    dispatcher: Dispatcher,
    endpoint: Arc<E>,
    subscriptions: SubscriptionMap,
    shutdown_tx: Arc<watch::Sender<bool>>,
    tasks: Mutex<Vec<tokio::task::JoinHandle<()>>>,
    started: AtomicBool,
}

impl<E: BrokerEndpoint> ZeekApp<E> {
    /// Creates a new [`ZeekApp`] instance.
    #[must_use]
    pub fn new(config: ZeekConfig, dispatcher: Dispatcher, endpoint: Arc<E>) -> Self {
        let (shutdown_tx, _shutdown_rx) = watch::channel(false);
        Self {
            config,
            dispatcher,
            endpoint,
            subscriptions: Arc::new(Mutex::new(IndexMap::new())),
            shutdown_tx: Arc::new(shutdown_tx),
            tasks: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
        }
    }

    /// Starts listening on the configured interface and spawns the workers.
    ///
    /// # Errors
    ///
    /// Returns an error if the adapter was already started or the endpoint
    /// cannot listen or subscribe.
    pub async fn start(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.started.swap(true, Ordering::SeqCst),
            "Zeek app already started"
        );

        self.endpoint
            .listen(&self.config.host, self.config.port)
            .await?;

        let intel_subscriber = self
            .endpoint
            .subscribe(&[topics::TOPIC_INTEL, topics::TOPIC_SIGHTING])
            .await?;
        let manage_subscriber = self.endpoint.subscribe(&[topics::TOPIC_MANAGE]).await?;

        let namespace = self.config.module_namespace.clone();

        let mut tasks = self.tasks.lock().expect(STATE_POISONED);
        tasks.push(tokio::spawn(run_listen(
            intel_subscriber,
            namespace.clone(),
            self.dispatcher.clone(),
            self.shutdown_tx.clone(),
        )));
        tasks.push(tokio::spawn(run_manage(
            manage_subscriber,
            self.endpoint.clone(),
            namespace.clone(),
            self.dispatcher.clone(),
            self.subscriptions.clone(),
            self.config.inbox_capacity,
            self.shutdown_tx.clone(),
        )));
        tasks.push(tokio::spawn(run_publish(
            self.endpoint.clone(),
            namespace,
            self.subscriptions.clone(),
            self.shutdown_tx.clone(),
        )));

        log::info!(
            "Zeek app started on {}:{}",
            self.config.host,
            self.config.port
        );
        Ok(())
    }

    /// Signals the workers to stop and joins them.
    pub async fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
        let tasks: Vec<_> = {
            let mut guard = self.tasks.lock().expect(STATE_POISONED);
            guard.drain(..).collect()
        };
        for task in tasks {
            let _ = task.await;
        }
        log::info!("Zeek app stopped");
    }

    /// Returns the number of live subscriptions tracked by the adapter.
    #[must_use]
    pub fn subscriptions_count(&self) -> usize {
        self.subscriptions.lock().expect(STATE_POISONED).len()
    }
}

#[async_trait]
impl<E: BrokerEndpoint> Component for ZeekApp<E> {
    fn name(&self) -> &str {
        COMPONENT
    }

    async fn start(&self) -> anyhow::Result<()> {
        ZeekApp::start(self).await
    }

    async fn stop(&self) -> anyhow::Result<()> {
        ZeekApp::stop(self).await;
        Ok(())
    }
}

/// Returns a constructor for the component registry.
///
/// The endpoint factory is supplied by the embedding process since concrete
/// broker transports are external collaborators.
pub fn component_factory<E, F>(make_endpoint: F) -> ComponentFactory
where
    E: BrokerEndpoint,
    F: Fn() -> Arc<E> + Send + Sync + 'static,
{
    Box::new(move |config, dispatcher| {
        let config = ZeekConfig::from_value(config)?;
        Ok(Box::new(ZeekApp::new(config, dispatcher.clone(), make_endpoint()))
            as Box<dyn Component>)
    })
}

async fn run_listen(
    mut subscriber: BrokerSubscriber,
    namespace: String,
    dispatcher: Dispatcher,
    shutdown: Arc<watch::Sender<bool>>,
) {
    log_task_started("zeek-listen");
    let mut shutdown_rx = shutdown.subscribe();

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,
            received = subscriber.next() => match received {
                Ok((_topic, event)) => {
                    if let Some(message) = mapping::map_to_internal(&event, &namespace)
                        && dispatcher.publish(message).await.is_err()
                    {
                        break;
                    }
                }
                Err(TransportError::Closed) => {
                    log::warn!("Intel/sighting endpoint closed by peer");
                    let _ = shutdown.send(true);
                    break;
                }
                Err(e) => log::warn!("Intel/sighting transport error: {e}"),
            }
        }
    }

    log_task_stopped("zeek-listen");
}

async fn run_manage<E: BrokerEndpoint>(
    mut subscriber: BrokerSubscriber,
    endpoint: Arc<E>,
    namespace: String,
    dispatcher: Dispatcher,
    subscriptions: SubscriptionMap,
    inbox_capacity: usize,
    shutdown: Arc<watch::Sender<bool>>,
) {
    log_task_started("zeek-manage");
    let mut shutdown_rx = shutdown.subscribe();

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,
            received = subscriber.next() => match received {
                Ok((_topic, event)) => {
                    match mapping::map_management_message(&event, &namespace) {
                        Some(ManagementCommand::Subscribe(subscription)) => {
                            handle_subscribe(
                                endpoint.as_ref(),
                                &namespace,
                                &dispatcher,
                                &subscriptions,
                                inbox_capacity,
                                subscription,
                            )
                            .await;
                        }
                        Some(ManagementCommand::Unsubscribe(unsubscription)) => {
                            handle_unsubscribe(&dispatcher, &subscriptions, &unsubscription);
                        }
                        None => {}
                    }
                }
                Err(TransportError::Closed) => {
                    log::warn!("Management endpoint closed by peer");
                    let _ = shutdown.send(true);
                    break;
                }
                Err(e) => log::warn!("Management transport error: {e}"),
            }
        }
    }

    log_task_stopped("zeek-manage");
}

async fn handle_subscribe<E: BrokerEndpoint>(
    endpoint: &E,
    namespace: &str,
    dispatcher: &Dispatcher,
    subscriptions: &SubscriptionMap,
    inbox_capacity: usize,
    subscription: Subscription,
) {
    log::info!("Received subscription for topic: {}", subscription.topic);

    // Point-to-point topic and inbox for this particular subscription; the
    // dispatcher mints the topic so the acknowledged handle and the
    // registered handle are one and the same
    let (sender, receiver) = Inbox::bounded(inbox_capacity);
    let p2p_topic = match dispatcher
        .subscribe(&subscription.topic, sender, subscription.snapshot_delta)
        .await
    {
        Ok(p2p_topic) => p2p_topic,
        Err(e) => {
            log::warn!(
                "Rejecting subscription for topic '{}': {e}",
                subscription.topic
            );
            return;
        }
    };

    let mut local = LocalSubscription {
        receiver,
        state: SubscriptionState::New,
    };

    let ack = mapping::subscription_acknowledged(namespace, p2p_topic.as_str());
    if let Err(e) = endpoint.publish(topics::TOPIC_MANAGE, ack).await {
        log::warn!("Failed to acknowledge subscription '{p2p_topic}': {e}");
        dispatcher.unsubscribe(p2p_topic.as_str());
        local.state = SubscriptionState::Removed;
        return;
    }
    local.state = SubscriptionState::Active;

    subscriptions
        .lock()
        .expect(STATE_POISONED)
        .insert(p2p_topic, local);
}

fn handle_unsubscribe(
    dispatcher: &Dispatcher,
    subscriptions: &SubscriptionMap,
    unsubscription: &Unsubscription,
) {
    // The p2p topic is the canonical key; the originating topic is derived
    // only for logging
    let p2p_topic = unsubscription.topic.as_str();
    let mut subscriptions = subscriptions.lock().expect(STATE_POISONED);
    let Some(local) = subscriptions.get_mut(&Ustr::from(p2p_topic)) else {
        log::debug!("Ignoring unsubscription for unknown topic '{p2p_topic}'");
        return;
    };

    let originating = &p2p_topic[..p2p_topic.len().saturating_sub(P2P_SUFFIX_LEN)];
    log::info!("Received unsubscription from topic: {originating}");

    dispatcher.unsubscribe(p2p_topic);
    // The inbox is now closed for new writes; the fan-out loop drains the
    // remainder and deletes the entry
    local.state = SubscriptionState::Draining;
}

async fn run_publish<E: BrokerEndpoint>(
    endpoint: Arc<E>,
    namespace: String,
    subscriptions: SubscriptionMap,
    shutdown: Arc<watch::Sender<bool>>,
) {
    log_task_started("zeek-publish");
    let mut shutdown_rx = shutdown.subscribe();

    'outer: loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let mut batch: Vec<(Ustr, Message)> = Vec::new();
        {
            // At most one dequeue per inbox per cycle keeps the fan-out
            // fair; the lock is released before any transport I/O
            let mut subscriptions = subscriptions.lock().expect(STATE_POISONED);
            let mut drained: Vec<Ustr> = Vec::new();
            for (p2p_topic, local) in subscriptions.iter_mut() {
                match local.receiver.try_recv() {
                    TryRecv::Message(message) => batch.push((*p2p_topic, message)),
                    TryRecv::Empty => {}
                    TryRecv::Closed => {
                        local.state = SubscriptionState::Removed;
                        drained.push(*p2p_topic);
                    }
                }
            }
            for p2p_topic in drained {
                subscriptions.shift_remove(&p2p_topic);
                log::debug!("Deleted drained subscription '{p2p_topic}'");
            }
        }

        if batch.is_empty() {
            tokio::select! {
                _ = shutdown_rx.changed() => break,
                () = tokio::time::sleep(Duration::from_millis(FANOUT_WAIT_MILLIS)) => {}
            }
            continue;
        }

        for (p2p_topic, message) in batch {
            let Some(event) = mapping::map_to_broker(&message, &namespace) else {
                continue;
            };
            match endpoint.publish(p2p_topic.as_str(), event).await {
                Ok(()) => log::debug!("Published {message} on topic {p2p_topic}"),
                Err(TransportError::Closed) => {
                    log::warn!("Outbound endpoint closed by peer");
                    let _ = shutdown.send(true);
                    break 'outer;
                }
                Err(e) => log::warn!("Failed to publish {message} on topic {p2p_topic}: {e}"),
            }
        }
    }

    log_task_stopped("zeek-publish");
}
