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

//! Common functionality for the Threat Bus message broker.
//!
//! This crate owns the dispatch core: the topic-indexed subscriber registry,
//! the bounded per-subscriber inboxes and the prefix-matched fan-out worker.
//! Around it sit the ambient concerns every adapter shares: the logging
//! subsystem, the tokio runtime, configuration validation, the backbone
//! interface with its in-memory reference variant, and the component
//! registry adapters register their constructors with.

pub mod backbone;
pub mod config;
pub mod dispatch;
pub mod enums;
pub mod errors;
pub mod logging;
pub mod plugins;
pub mod runtime;
pub mod testing;

pub use crate::{
    backbone::{Backbone, InMemoryBackbone},
    dispatch::{Dispatcher, DispatcherConfig, Inbox, InboxReceiver, InboxSender},
    errors::{ConfigError, TransportError},
    plugins::{Component, ComponentRegistry},
};
