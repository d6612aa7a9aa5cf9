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

//! Error types shared across adapters.
//!
//! Codec errors live with the codecs in `threatbus-model`; backpressure is
//! never an error (a full inbox blocks the producer).

use thiserror::Error;

/// Represents a failure of a transport endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TransportError {
    /// A recoverable I/O failure; the owning worker retries by re-reading.
    #[error("Transport I/O error: {0}")]
    Io(String),
    /// The peer closed the transport; the owning worker exits and its
    /// adapter shuts down its siblings.
    #[error("Transport closed by peer")]
    Closed,
}

impl TransportError {
    /// Returns whether the owning worker should keep reading.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// Represents an invalid component configuration.
///
/// Validation collects every missing or invalid key before failing, so a
/// single startup error reports everything the operator has to fix.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("Invalid config for '{}': {}", .component, .issues.join("; "))]
pub struct ConfigError {
    /// The component whose configuration was rejected.
    pub component: String,
    /// Every missing or invalid key, with a reason each.
    pub issues: Vec<String>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_transport_error_recoverable() {
        assert!(TransportError::Io("connection reset".to_string()).is_recoverable());
        assert!(!TransportError::Closed.is_recoverable());
    }

    #[rstest]
    fn test_config_error_lists_all_issues() {
        let error = ConfigError {
            component: "zeek".to_string(),
            issues: vec![
                "missing key 'host'".to_string(),
                "missing key 'port'".to_string(),
            ],
        };
        assert_eq!(
            error.to_string(),
            "Invalid config for 'zeek': missing key 'host'; missing key 'port'"
        );
    }
}
