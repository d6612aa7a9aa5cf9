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

//! The realtime clock for the running system.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::nanos::UnixNanos;

/// Returns the current wall-clock time as nanoseconds since the UNIX epoch.
///
/// # Panics
///
/// Panics if the system clock is set before the UNIX epoch.
#[must_use]
pub fn unix_nanos_now() -> UnixNanos {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System clock is before the UNIX epoch");
    UnixNanos::from(duration.as_nanos() as u64)
}
