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

//! Configuration for the Zeek app adapter.

use serde_json::Value;
use threatbus_common::{
    config::ConfigReader, dispatch::DEFAULT_INBOX_CAPACITY, errors::ConfigError,
};
use threatbus_core::correctness::FAILED;

/// The component name the adapter registers under.
pub const COMPONENT: &str = "zeek";

/// Configuration for a [`crate::ZeekApp`] instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZeekConfig {
    /// The interface to listen on for the Zeek broker endpoint.
    pub host: String,
    /// The port to listen on for the Zeek broker endpoint.
    pub port: u16,
    /// The Zeek script namespace qualifying event names (may be empty).
    pub module_namespace: String,
    /// The high-water mark for per-subscription inboxes.
    pub inbox_capacity: usize,
}

impl ZeekConfig {
    /// Creates a new [`ZeekConfig`] instance.
    #[must_use]
    pub fn new<H: Into<String>, N: Into<String>>(host: H, port: u16, module_namespace: N) -> Self {
        Self {
            host: host.into(),
            port,
            module_namespace: module_namespace.into(),
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
        }
    }

    /// Validates and builds a configuration from a parsed config section.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] carrying every missing or invalid key.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let mut reader = ConfigReader::new(COMPONENT, value);
        let host = reader.required_str("host");
        let port = reader.required_port("port");
        let module_namespace = reader.optional_str("module_namespace");
        let inbox_capacity = reader.optional_capacity("inbox_capacity", DEFAULT_INBOX_CAPACITY);
        reader.finish()?;

        Ok(Self {
            host: host.expect(FAILED),
            port: port.expect(FAILED),
            module_namespace,
            inbox_capacity,
        })
    }
}
