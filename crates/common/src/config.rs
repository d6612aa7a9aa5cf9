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

//! Configuration validation for adapter components.
//!
//! Configuration file parsing is an external collaborator; components
//! receive their section as an already-parsed [`serde_json::Value`] map and
//! validate it here. The reader records every missing or invalid key rather
//! than failing on the first, and [`ConfigReader::finish`] turns the
//! collected issues into one fatal [`ConfigError`].

use serde_json::Value;

use crate::errors::ConfigError;

/// Collects typed values out of a component's configuration section.
#[derive(Debug)]
pub struct ConfigReader<'a> {
    component: &'a str,
    value: &'a Value,
    issues: Vec<String>,
}

impl<'a> ConfigReader<'a> {
    /// Creates a new [`ConfigReader`] instance for the `component` section.
    #[must_use]
    pub fn new(component: &'a str, value: &'a Value) -> Self {
        let mut issues = Vec::new();
        if !value.is_object() {
            issues.push("config section must be a map".to_string());
        }
        Self {
            component,
            value,
            issues,
        }
    }

    /// Reads a required string key.
    pub fn required_str(&mut self, key: &str) -> Option<String> {
        match self.value.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                self.issues
                    .push(format!("key '{key}' must be a string, was: {other}"));
                None
            }
            None => {
                self.issues.push(format!("missing key '{key}'"));
                None
            }
        }
    }

    /// Reads a required port number key (u16).
    pub fn required_port(&mut self, key: &str) -> Option<u16> {
        match self.value.get(key) {
            Some(Value::Number(n)) => match n.as_u64().and_then(|v| u16::try_from(v).ok()) {
                Some(port) => Some(port),
                None => {
                    self.issues
                        .push(format!("key '{key}' must be a port number (0-65535), was: {n}"));
                    None
                }
            },
            Some(other) => {
                self.issues
                    .push(format!("key '{key}' must be a port number, was: {other}"));
                None
            }
            None => {
                self.issues.push(format!("missing key '{key}'"));
                None
            }
        }
    }

    /// Reads an optional string key, defaulting to the empty string.
    pub fn optional_str(&mut self, key: &str) -> String {
        match self.value.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                self.issues
                    .push(format!("key '{key}' must be a string, was: {other}"));
                String::new()
            }
            None => String::new(),
        }
    }

    /// Reads an optional positive capacity key with a default.
    pub fn optional_capacity(&mut self, key: &str, default: usize) -> usize {
        match self.value.get(key) {
            Some(Value::Number(n)) => match n.as_u64() {
                Some(v) if v > 0 => v as usize,
                _ => {
                    self.issues
                        .push(format!("key '{key}' must be a positive integer, was: {n}"));
                    default
                }
            },
            Some(other) => {
                self.issues
                    .push(format!("key '{key}' must be a positive integer, was: {other}"));
                default
            }
            None => default,
        }
    }

    /// Returns `Ok` when every read succeeded, otherwise a [`ConfigError`]
    /// carrying all collected issues.
    ///
    /// # Errors
    ///
    /// Returns an error if any key was missing or invalid.
    pub fn finish(self) -> Result<(), ConfigError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError {
                component: self.component.to_string(),
                issues: self.issues,
            })
        }
    }
}
