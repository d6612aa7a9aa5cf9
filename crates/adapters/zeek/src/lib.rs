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

//! Zeek network monitor app adapter for the Threat Bus message broker.
//!
//! The adapter owns a bidirectional broker endpoint to one Zeek instance:
//! management events negotiate point-to-point subscription topics, inbound
//! intel and sighting events are translated into the canonical model and
//! forwarded to the dispatcher, and an outbound fan-out loop multiplexes the
//! per-subscription inboxes back onto the endpoint.
//!
//! The concrete Zeek broker wire protocol is an external collaborator; the
//! adapter speaks to it through the [`broker::BrokerEndpoint`] interface.

pub mod adapter;
pub mod broker;
pub mod config;
pub mod mapping;

#[cfg(any(test, feature = "stubs"))]
pub mod stubs;

pub use crate::{
    adapter::ZeekApp,
    broker::{BrokerData, BrokerEndpoint, BrokerSubscriber, ZeekEvent},
    config::ZeekConfig,
};
