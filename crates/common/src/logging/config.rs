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

//! Logging configuration types and parsing.
//!
//! # Spec String Format
//!
//! The `THREATBUS_LOG` environment variable uses a semicolon-separated format:
//!
//! ```text
//! stdout=Info;threatbus_zeek=Debug;is_colored
//! ```
//!
//! ## Supported Keys
//!
//! | Key            | Type      | Description                                 |
//! |----------------|-----------|---------------------------------------------|
//! | `stdout`       | Log level | Maximum level for console output.           |
//! | `is_colored`   | Boolean   | Enable ANSI colors (default: true).         |
//! | `print_config` | Boolean   | Print config to stdout at startup.          |
//! | `<component>`  | Log level | Component-specific log level (exact match). |
//!
//! Log levels are case-insensitive (`Off`, `Error`, `Warn`, `Info`, `Debug`,
//! `Trace`). Boolean values accept a bare flag or `key=true/false/0/no`.

use std::{env, str::FromStr};

use ahash::AHashMap;
use log::LevelFilter;
use ustr::Ustr;

/// Configuration for the Threat Bus logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Maximum log level for console output.
    pub stdout_level: LevelFilter,
    /// Per-component log level overrides (exact match on the log target).
    pub component_level: AHashMap<Ustr, LevelFilter>,
    /// Use ANSI color codes in output.
    pub is_colored: bool,
    /// Print configuration to stdout at startup.
    pub print_config: bool,
}

impl Default for LoggerConfig {
    /// Creates a new default [`LoggerConfig`] instance.
    fn default() -> Self {
        Self {
            stdout_level: LevelFilter::Info,
            component_level: AHashMap::new(),
            is_colored: true,
            print_config: false,
        }
    }
}

impl LoggerConfig {
    /// Parses a configuration from a spec string.
    ///
    /// # Errors
    ///
    /// Returns an error if the spec string contains invalid syntax or log levels.
    pub fn from_spec(spec: &str) -> anyhow::Result<Self> {
        let mut config = Self::default();

        for kv in spec.split(';') {
            let kv = kv.trim();
            if kv.is_empty() {
                continue;
            }

            // Handle bare flags (without =)
            if !kv.contains('=') {
                match kv.to_lowercase().as_str() {
                    "is_colored" => config.is_colored = true,
                    "print_config" => config.print_config = true,
                    _ => anyhow::bail!("Invalid spec pair: {kv}"),
                }
                continue;
            }

            let parts: Vec<&str> = kv.splitn(2, '=').collect();
            if parts.len() != 2 {
                anyhow::bail!("Invalid spec pair: {kv}");
            }

            let k = parts[0].trim();
            let v = parts[1].trim();

            match k.to_lowercase().as_str() {
                "is_colored" => {
                    config.is_colored = parse_bool_value(v);
                }
                "print_config" => {
                    config.print_config = parse_bool_value(v);
                }
                "stdout" => {
                    config.stdout_level = parse_level(v)?;
                }
                _ => {
                    let lvl = parse_level(v)?;
                    config.component_level.insert(Ustr::from(k), lvl);
                }
            }
        }

        Ok(config)
    }

    /// Parses configuration from the `THREATBUS_LOG` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is unset or contains invalid syntax.
    pub fn from_env() -> anyhow::Result<Self> {
        let spec = env::var("THREATBUS_LOG")?;
        Self::from_spec(&spec)
    }
}

/// Parses a boolean value from a string.
///
/// Returns `true` unless the value is explicitly "false", "0", or "no" (case-insensitive).
fn parse_bool_value(v: &str) -> bool {
    !matches!(v.to_lowercase().as_str(), "false" | "0" | "no")
}

/// Parses a log level from a string.
fn parse_level(v: &str) -> anyhow::Result<LevelFilter> {
    let mut level = v.to_uppercase();
    if level == "WARNING" {
        level = "WARN".to_string();
    }
    LevelFilter::from_str(&level).map_err(|_| anyhow::anyhow!("Invalid log level: {v}"))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_default_config() {
        let config = LoggerConfig::default();
        assert_eq!(config.stdout_level, LevelFilter::Info);
        assert!(config.component_level.is_empty());
        assert!(config.is_colored);
        assert!(!config.print_config);
    }

    #[rstest]
    fn test_from_spec_stdout_level() {
        let config = LoggerConfig::from_spec("stdout=Debug").unwrap();
        assert_eq!(config.stdout_level, LevelFilter::Debug);
    }

    #[rstest]
    #[case("stdout=debug", LevelFilter::Debug)]
    #[case("STDOUT=ERROR", LevelFilter::Error)]
    #[case("stdout=Warning", LevelFilter::Warn)]
    fn test_from_spec_case_insensitive(#[case] spec: &str, #[case] expected: LevelFilter) {
        let config = LoggerConfig::from_spec(spec).unwrap();
        assert_eq!(config.stdout_level, expected);
    }

    #[rstest]
    fn test_from_spec_empty_string() {
        let config = LoggerConfig::from_spec("").unwrap();
        assert_eq!(config, LoggerConfig::default());
    }

    #[rstest]
    fn test_from_spec_with_whitespace_and_trailing_semicolon() {
        let config = LoggerConfig::from_spec("  stdout = Warn ; ").unwrap();
        assert_eq!(config.stdout_level, LevelFilter::Warn);
    }

    #[rstest]
    #[case("is_colored", true)]
    #[case("is_colored=true", true)]
    #[case("is_colored=false", false)]
    #[case("is_colored=0", false)]
    #[case("IS_COLORED=NO", false)]
    fn test_from_spec_is_colored(#[case] spec: &str, #[case] expected: bool) {
        let config = LoggerConfig::from_spec(spec).unwrap();
        assert_eq!(config.is_colored, expected);
    }

    #[rstest]
    fn test_from_spec_component_level() {
        let config = LoggerConfig::from_spec("threatbus_zeek=Debug;dispatch=Error").unwrap();
        assert_eq!(
            config.component_level[&Ustr::from("threatbus_zeek")],
            LevelFilter::Debug
        );
        assert_eq!(
            config.component_level[&Ustr::from("dispatch")],
            LevelFilter::Error
        );
    }

    #[rstest]
    fn test_from_spec_component_preserves_case() {
        let config = LoggerConfig::from_spec("MyComponent=Info").unwrap();
        assert!(
            config
                .component_level
                .contains_key(&Ustr::from("MyComponent"))
        );
    }

    #[rstest]
    fn test_from_spec_full_example() {
        let config =
            LoggerConfig::from_spec("stdout=Info;threatbus_zeek=Debug;is_colored;print_config")
                .unwrap();
        assert_eq!(config.stdout_level, LevelFilter::Info);
        assert_eq!(
            config.component_level[&Ustr::from("threatbus_zeek")],
            LevelFilter::Debug
        );
        assert!(config.is_colored);
        assert!(config.print_config);
    }

    #[rstest]
    #[case("stdout=InvalidLevel")]
    #[case("unknown_flag")]
    #[case("stdout=")]
    fn test_from_spec_invalid(#[case] spec: &str) {
        assert!(LoggerConfig::from_spec(spec).is_err());
    }
}
