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

//! The RabbitMQ backbone implementation.
//!
//! On start the backbone declares one fan-out exchange per message kind and
//! one durable, non-auto-delete queue per exchange named
//! `<exchange>-<hostname>`, then runs one consumer worker per queue plus one
//! producer worker draining the dispatcher tap. Deliveries are acknowledged
//! after the dispatch call returns, giving at-least-once semantics from the
//! transport into the dispatcher; decode failures are acknowledged too so
//! poison messages never stall a queue.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use futures::StreamExt;
use lapin::{
    BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind,
    options::{
        BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, ExchangeDeclareOptions,
        QueueBindOptions, QueueDeclareOptions,
    },
    types::FieldTable,
};
use strum::IntoEnumIterator;
use threatbus_common::{
    backbone::Backbone,
    dispatch::{Dispatcher, Inbox, InboxReceiver, InboxSender},
    logging::{log_task_started, log_task_stopped},
    plugins::{Component, ComponentFactory},
};
use threatbus_model::{MessageKind, codec, topics};
use ustr::Ustr;

use crate::config::{COMPONENT, RabbitMqConfig};

const STATE_POISONED: &str = "Backbone state lock poisoned";

/// Returns the fan-out exchange carrying messages of the given kind.
#[must_use]
pub const fn exchange_for(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Indicator => "threatbus-intel",
        MessageKind::Sighting => "threatbus-sighting",
        MessageKind::SnapshotRequest => "threatbus-snapshot-requests",
        MessageKind::SnapshotEnvelope => "threatbus-snapshot-envelopes",
    }
}

/// Returns this node's queue name for the given kind.
#[must_use]
pub fn queue_name(kind: MessageKind, hostname: &str) -> String {
    format!("{}-{hostname}", exchange_for(kind))
}

/// Decodes a delivery with the codec matching its queue's kind and hands it
/// to the dispatcher.
///
/// Returns whether the message was dispatched. The caller acknowledges the
/// delivery regardless of the outcome, so poison messages never stall the
/// queue.
pub async fn provision(kind: MessageKind, body: &[u8], dispatcher: &Dispatcher) -> bool {
    match codec::decode_expecting(kind, body) {
        Ok(message) => {
            log::debug!("Relaying message from RabbitMQ: {message}");
            if let Err(e) = dispatcher.publish_remote(message).await {
                log::warn!("Failed to dispatch delivery from '{kind}' queue: {e}");
                false
            } else {
                true
            }
        }
        Err(e) => {
            log::warn!("Error decoding message from '{kind}' queue: {e}");
            false
        }
    }
}

/// The durable-exchange backbone over RabbitMQ.
pub struct RabbitMqBackbone {
    config: RabbitMqConfig,
    dispatcher: Dispatcher,
    connection: Mutex<Option<Connection>>,
    tap_sender: Mutex<Option<InboxSender>>,
    tap_handles: Mutex<Vec<Ustr>>,
    tasks: Mutex<Vec<tokio::task::JoinHandle<()>>>,
    started: AtomicBool,
}

impl RabbitMqBackbone {
    /// Creates a new [`RabbitMqBackbone`] instance.
    #[must_use]
    pub fn new(config: RabbitMqConfig, dispatcher: Dispatcher) -> Self {
        Self {
            config,
            dispatcher,
            connection: Mutex::new(None),
            tap_sender: Mutex::new(None),
            tap_handles: Mutex::new(Vec::new()),
            tasks: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
        }
    }

    /// Connects to the broker, declares the exchanges and queues, and spawns
    /// the consumer and producer workers.
    ///
    /// # Errors
    ///
    /// Returns an error if the backbone was already started, or the
    /// connection or any declaration fails.
    pub async fn start(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.started.swap(true, Ordering::SeqCst),
            "RabbitMQ backbone already started"
        );

        let options = ConnectionProperties::default()
            .with_executor(tokio_executor_trait::Tokio::current())
            .with_reactor(tokio_reactor_trait::Tokio);
        let connection = Connection::connect(&self.config.amqp_uri(), options).await?;
        let channel = connection.create_channel().await?;

        let hostname = sysinfo::System::host_name().unwrap_or_else(|| "localhost".to_string());
        let mut tasks = Vec::new();

        for kind in MessageKind::iter() {
            let exchange = exchange_for(kind);
            channel
                .exchange_declare(
                    exchange,
                    ExchangeKind::Fanout,
                    ExchangeDeclareOptions::default(),
                    FieldTable::default(),
                )
                .await?;

            let queue = queue_name(kind, &hostname);
            channel
                .queue_declare(
                    &queue,
                    QueueDeclareOptions {
                        durable: true,
                        auto_delete: false,
                        ..QueueDeclareOptions::default()
                    },
                    FieldTable::default(),
                )
                .await?;
            channel
                .queue_bind(
                    &queue,
                    exchange,
                    "",
                    QueueBindOptions::default(),
                    FieldTable::default(),
                )
                .await?;

            let consumer = channel
                .basic_consume(
                    &queue,
                    &format!("threatbus-{kind}"),
                    BasicConsumeOptions::default(),
                    FieldTable::default(),
                )
                .await?;
            tasks.push(tokio::spawn(run_consume(
                kind,
                consumer,
                self.dispatcher.clone(),
            )));
        }

        // The tap receives every locally published message for
        // re-publication to other nodes
        let (sender, receiver) = Inbox::bounded(self.config.outbound_capacity);
        let handles = self.dispatcher.register_tap(&[topics::TOPIC_ALL], &sender)?;
        *self.tap_handles.lock().expect(STATE_POISONED) = handles;
        *self.tap_sender.lock().expect(STATE_POISONED) = Some(sender);

        let publish_channel = connection.create_channel().await?;
        tasks.push(tokio::spawn(run_publish(publish_channel, receiver)));

        *self.connection.lock().expect(STATE_POISONED) = Some(connection);
        self.tasks.lock().expect(STATE_POISONED).extend(tasks);

        log::info!("RabbitMQ backbone started");
        Ok(())
    }

    /// Unregisters the tap, closes the connection and joins the workers.
    ///
    /// # Errors
    ///
    /// Returns an error if a worker task panicked.
    pub async fn stop(&self) -> anyhow::Result<()> {
        let handles: Vec<Ustr> = self.tap_handles.lock().expect(STATE_POISONED).drain(..).collect();
        for handle in handles {
            self.dispatcher.unsubscribe(handle.as_str());
        }
        // Dropping the tap sender ends the producer worker once drained
        drop(self.tap_sender.lock().expect(STATE_POISONED).take());

        let connection = self.connection.lock().expect(STATE_POISONED).take();
        if let Some(connection) = connection {
            if let Err(e) = connection.close(0, "shutdown").await {
                log::warn!("Error closing RabbitMQ connection: {e}");
            }
        }

        let tasks: Vec<_> = {
            let mut guard = self.tasks.lock().expect(STATE_POISONED);
            guard.drain(..).collect()
        };
        for task in tasks {
            task.await
                .map_err(|e| anyhow::anyhow!("Backbone worker panicked: {e}"))?;
        }

        log::info!("RabbitMQ backbone stopped");
        Ok(())
    }
}

#[async_trait]
impl Backbone for RabbitMqBackbone {
    fn name(&self) -> &str {
        COMPONENT
    }

    async fn start(&self) -> anyhow::Result<()> {
        RabbitMqBackbone::start(self).await
    }

    async fn stop(&self) -> anyhow::Result<()> {
        RabbitMqBackbone::stop(self).await
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

#[async_trait]
impl Component for RabbitMqBackbone {
    fn name(&self) -> &str {
        COMPONENT
    }

    async fn start(&self) -> anyhow::Result<()> {
        RabbitMqBackbone::start(self).await
    }

    async fn stop(&self) -> anyhow::Result<()> {
        RabbitMqBackbone::stop(self).await
    }
}

/// Returns a constructor for the component registry.
#[must_use]
pub fn component_factory() -> ComponentFactory {
    Box::new(|config, dispatcher| {
        let config = RabbitMqConfig::from_value(config)?;
        Ok(Box::new(RabbitMqBackbone::new(config, dispatcher.clone())) as Box<dyn Component>)
    })
}

async fn run_consume(kind: MessageKind, mut consumer: lapin::Consumer, dispatcher: Dispatcher) {
    let task_name = format!("rabbitmq-consume-{kind}");
    log_task_started(&task_name);

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                provision(kind, &delivery.data, &dispatcher).await;
                // Acknowledge after the dispatch call returns; decode
                // failures are acknowledged too
                if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
                    log::warn!("Failed to acknowledge delivery on '{kind}' queue: {e}");
                }
            }
            Err(e) => log::warn!("Consumer error on '{kind}' queue: {e}"),
        }
    }

    log_task_stopped(&task_name);
}

async fn run_publish(channel: Channel, mut receiver: InboxReceiver) {
    log_task_started("rabbitmq-publish");

    while let Some(message) = receiver.recv().await {
        let exchange = exchange_for(message.kind());
        let body = codec::encode(&message);
        log::debug!("Forwarding message to RabbitMQ: {message}");
        if let Err(e) = channel
            .basic_publish(
                exchange,
                "",
                BasicPublishOptions::default(),
                body.as_ref(),
                BasicProperties::default(),
            )
            .await
        {
            log::warn!("Failed to publish {message} to exchange '{exchange}': {e}");
        }
    }

    log_task_stopped("rabbitmq-publish");
}
