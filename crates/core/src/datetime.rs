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

//! Common data and time functions.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::nanos::{DurationNanos, UnixNanos};

pub const NANOSECONDS_IN_SECOND: u64 = 1_000_000_000;

/// Converts a UNIX nanoseconds timestamp to an ISO 8601 (RFC 3339) format string
/// with millisecond precision.
#[inline]
#[must_use]
pub fn unix_nanos_to_iso8601_millis(unix_nanos: UnixNanos) -> String {
    let datetime = unix_nanos.to_datetime_utc();
    datetime.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Converts a UNIX nanoseconds timestamp to an ISO 8601 (RFC 3339) format string
/// with nanosecond precision.
#[inline]
#[must_use]
pub fn unix_nanos_to_iso8601(unix_nanos: UnixNanos) -> String {
    let datetime = unix_nanos.to_datetime_utc();
    datetime.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parses an ISO 8601 (RFC 3339) format string into a UNIX nanoseconds timestamp.
///
/// # Errors
///
/// Returns an error if the string is not a valid RFC 3339 timestamp.
pub fn iso8601_to_unix_nanos(timestamp: &str) -> anyhow::Result<UnixNanos> {
    let datetime = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|e| anyhow::anyhow!("Failed to parse timestamp '{timestamp}': {e}"))?
        .with_timezone(&Utc);
    Ok(UnixNanos::from(datetime))
}

/// Converts a look-back window in whole seconds to a [`DurationNanos`].
#[inline]
#[must_use]
pub const fn duration_secs_to_nanos(secs: u64) -> DurationNanos {
    secs * NANOSECONDS_IN_SECOND
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, "1970-01-01T00:00:00.000000000Z")]
    #[case(1_577_836_800_000_000_000, "2020-01-01T00:00:00.000000000Z")]
    #[case(1_577_836_800_123_456_789, "2020-01-01T00:00:00.123456789Z")]
    fn test_unix_nanos_to_iso8601(#[case] nanos: u64, #[case] expected: &str) {
        assert_eq!(unix_nanos_to_iso8601(UnixNanos::from(nanos)), expected);
    }

    #[rstest]
    #[case("2020-01-01T00:00:00Z", 1_577_836_800_000_000_000)]
    #[case("2020-01-01T00:00:00.123456789Z", 1_577_836_800_123_456_789)]
    fn test_iso8601_to_unix_nanos(#[case] timestamp: &str, #[case] expected: u64) {
        assert_eq!(iso8601_to_unix_nanos(timestamp).unwrap().as_u64(), expected);
    }

    #[rstest]
    fn test_iso8601_to_unix_nanos_invalid() {
        assert!(iso8601_to_unix_nanos("not-a-timestamp").is_err());
    }

    #[rstest]
    fn test_iso8601_round_trip() {
        let nanos = UnixNanos::from(1_707_577_123_456_789_000);
        let iso = unix_nanos_to_iso8601(nanos);
        assert_eq!(iso8601_to_unix_nanos(&iso).unwrap(), nanos);
    }
}
