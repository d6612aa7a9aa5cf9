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

//! Configuration for the RabbitMQ backbone.

use serde_json::Value;
use threatbus_common::{
    config::ConfigReader, dispatch::DEFAULT_INBOX_CAPACITY, errors::ConfigError,
};
use threatbus_core::correctness::FAILED;

/// The component name the backbone registers under.
pub const COMPONENT: &str = "rabbitmq";

/// Configuration for a [`crate::RabbitMqBackbone`] instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RabbitMqConfig {
    /// The broker host to connect to.
    pub host: String,
    /// The broker port to connect to.
    pub port: u16,
    /// The high-water mark for the outbound tap inbox.
    pub outbound_capacity: usize,
}

impl RabbitMqConfig {
    /// Creates a new [`RabbitMqConfig`] instance.
    #[must_use]
    pub fn new<H: Into<String>>(host: H, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            outbound_capacity: DEFAULT_INBOX_CAPACITY,
        }
    }

    /// Returns the AMQP URI for the configured broker.
    #[must_use]
    pub fn amqp_uri(&self) -> String {
        format!("amqp://{}:{}", self.host, self.port)
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
        let outbound_capacity =
            reader.optional_capacity("outbound_capacity", DEFAULT_INBOX_CAPACITY);
        reader.finish()?;

        Ok(Self {
            host: host.expect(FAILED),
            port: port.expect(FAILED),
            outbound_capacity,
        })
    }
}
