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

//! RabbitMQ (AMQP 0-9-1) durable backbone for the Threat Bus message broker.
//!
//! Canonical messages are moved between bus nodes over one fan-out exchange
//! per message kind, with one durable queue per exchange per node. Consumed
//! deliveries are decoded and handed to the dispatcher with at-least-once
//! semantics; locally published messages are drained from a dispatcher tap
//! and re-published onto the exchanges.

pub mod backbone;
pub mod config;

pub use crate::{backbone::RabbitMqBackbone, config::RabbitMqConfig};
