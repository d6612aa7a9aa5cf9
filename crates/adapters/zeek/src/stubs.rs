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

//! Stub broker endpoint for testing the adapter without a live Zeek.

use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use threatbus_common::errors::TransportError;
use tokio::sync::mpsc;
use ustr::Ustr;

use crate::broker::{BrokerEndpoint, BrokerSubscriber, ZeekEvent};

const STATE_POISONED: &str = "Stub endpoint lock poisoned";

/// A channel-backed [`BrokerEndpoint`] double.
///
/// Tests inject tool-side events with [`StubEndpoint::inject`] and observe
/// adapter-side publications with [`StubEndpoint::published`]. Dropping the
/// delivery senders via [`StubEndpoint::close`] simulates the peer tearing
/// the transport down.
#[derive(Debug, Default)]
pub struct StubEndpoint {
    listening: Mutex<Option<(String, u16)>>,
    subscribers: Mutex<Vec<(Vec<Ustr>, mpsc::UnboundedSender<(Ustr, ZeekEvent)>)>>,
    published: Mutex<Vec<(Ustr, ZeekEvent)>>,
    fail_publish: AtomicBool,
    fail_listen: AtomicBool,
}

impl StubEndpoint {
    /// Creates a new [`StubEndpoint`] instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers a tool-side event to every subscriber with a matching
    /// topic prefix.
    pub fn inject(&self, topic: &str, event: ZeekEvent) {
        let topic = Ustr::from(topic);
        let subscribers = self.subscribers.lock().expect(STATE_POISONED);
        for (topics, tx) in subscribers.iter() {
            if topics.iter().any(|t| topic.as_str().starts_with(t.as_str())) {
                let _ = tx.send((topic, event.clone()));
            }
        }
    }

    /// Returns every event the adapter published so far.
    #[must_use]
    pub fn published(&self) -> Vec<(Ustr, ZeekEvent)> {
        self.published.lock().expect(STATE_POISONED).clone()
    }

    /// Returns the events the adapter published on `topic`.
    #[must_use]
    pub fn published_on(&self, topic: &str) -> Vec<ZeekEvent> {
        self.published
            .lock()
            .expect(STATE_POISONED)
            .iter()
            .filter(|(t, _)| t.as_str() == topic)
            .map(|(_, e)| e.clone())
            .collect()
    }

    /// Makes subsequent publishes fail with a transport I/O error.
    pub fn set_fail_publish(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::SeqCst);
    }

    /// Makes [`BrokerEndpoint::listen`] fail with a transport I/O error.
    pub fn set_fail_listen(&self, fail: bool) {
        self.fail_listen.store(fail, Ordering::SeqCst);
    }

    /// Returns the interface the adapter listens on, if any.
    #[must_use]
    pub fn listening(&self) -> Option<(String, u16)> {
        self.listening.lock().expect(STATE_POISONED).clone()
    }

    /// Simulates the peer closing the transport.
    pub fn close(&self) {
        self.subscribers.lock().expect(STATE_POISONED).clear();
    }
}

#[async_trait]
impl BrokerEndpoint for StubEndpoint {
    async fn listen(&self, host: &str, port: u16) -> Result<(), TransportError> {
        if self.fail_listen.load(Ordering::SeqCst) {
            return Err(TransportError::Io("listen refused".to_string()));
        }
        *self.listening.lock().expect(STATE_POISONED) = Some((host.to_string(), port));
        Ok(())
    }

    async fn publish(&self, topic: &str, event: ZeekEvent) -> Result<(), TransportError> {
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(TransportError::Io("publish refused".to_string()));
        }
        self.published
            .lock()
            .expect(STATE_POISONED)
            .push((Ustr::from(topic), event));
        Ok(())
    }

    async fn subscribe(&self, topics: &[&str]) -> Result<BrokerSubscriber, TransportError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .expect(STATE_POISONED)
            .push((topics.iter().map(|t| Ustr::from(t)).collect(), tx));
        Ok(BrokerSubscriber::new(rx))
    }
}
