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

//! Topic matching for dispatch subscriptions.
//!
//! A subscription matches a message when its originating topic is a
//! byte-wise prefix of the message's canonical topic. Prefix comparison is
//! the only matching rule - no globs, no regex - which keeps the fan-out
//! snapshot a linear scan with no compilation or backtracking.

/// Returns whether a message on `topic` is routed to a subscription with
/// originating topic `subscribed`.
///
/// The comparison is byte-wise and case-sensitive; an empty `subscribed`
/// prefix matches every topic.
#[must_use]
#[inline]
pub fn topic_matches(topic: &str, subscribed: &str) -> bool {
    topic.as_bytes().starts_with(subscribed.as_bytes())
}
