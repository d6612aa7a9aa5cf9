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

//! Enumerations for common components.

use log::Level;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The log color for a log message.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Display, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogColor {
    /// The default/normal log color.
    #[default]
    Normal,
    /// The green log color, typically used with info log levels and associated with success events.
    Green,
    /// The blue log color, typically used with info log levels and associated with user actions.
    Blue,
    /// The magenta log color, typically used with info log levels.
    Magenta,
    /// The cyan log color, typically used with info log levels.
    Cyan,
    /// The yellow log color, typically used with warning log levels.
    Yellow,
    /// The red log color, typically used with the error log level.
    Red,
}

impl LogColor {
    /// Returns the ANSI escape code corresponding to the log color.
    #[must_use]
    pub const fn as_ansi(&self) -> &str {
        match self {
            Self::Normal => "",
            Self::Green => "\x1b[92m",
            Self::Blue => "\x1b[94m",
            Self::Magenta => "\x1b[35m",
            Self::Cyan => "\x1b[36m",
            Self::Yellow => "\x1b[1;33m",
            Self::Red => "\x1b[1;31m",
        }
    }
}

impl From<Level> for LogColor {
    fn from(value: Level) -> Self {
        match value {
            Level::Error => Self::Red,
            Level::Warn => Self::Yellow,
            Level::Info | Level::Debug | Level::Trace => Self::Normal,
        }
    }
}

/// The lifecycle state of a single app subscription.
#[repr(C)]
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    EnumIter,
    EnumString,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionState {
    /// The subscription request was accepted but not yet acknowledged.
    #[default]
    New,
    /// The acknowledgment event was handed to the transport endpoint.
    AckSent,
    /// The subscription is registered and receiving messages.
    Active,
    /// The subscription was revoked; the inbox is closed for new writes but
    /// may still hold queued messages.
    Draining,
    /// The subscription is gone and its inbox has been deleted.
    Removed,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Level::Error, LogColor::Red)]
    #[case(Level::Warn, LogColor::Yellow)]
    #[case(Level::Info, LogColor::Normal)]
    #[case(Level::Debug, LogColor::Normal)]
    fn test_log_color_from_level(#[case] level: Level, #[case] expected: LogColor) {
        assert_eq!(LogColor::from(level), expected);
    }

    #[rstest]
    #[case(SubscriptionState::New, "NEW")]
    #[case(SubscriptionState::AckSent, "ACK_SENT")]
    #[case(SubscriptionState::Draining, "DRAINING")]
    fn test_subscription_state_display(#[case] state: SubscriptionState, #[case] expected: &str) {
        assert_eq!(state.to_string(), expected);
        assert_eq!(SubscriptionState::from_str(expected).unwrap(), state);
    }
}
