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

//! The well-known canonical topics, matched by byte-wise prefix.

/// The common prefix of every canonical topic.
pub const TOPIC_ALL: &str = "threatbus/";

/// The canonical topic for [`crate::Indicator`] messages.
pub const TOPIC_INTEL: &str = "threatbus/intel";

/// The canonical topic for [`crate::Sighting`] messages.
pub const TOPIC_SIGHTING: &str = "threatbus/sighting";

/// The canonical topic for [`crate::SnapshotRequest`] messages.
pub const TOPIC_SNAPSHOT_REQUEST: &str = "threatbus/snapshotrequest";

/// The canonical topic for [`crate::SnapshotEnvelope`] messages.
pub const TOPIC_SNAPSHOT_ENVELOPE: &str = "threatbus/snapshotenvelope";

/// The topic carrying subscription management events on app transports.
pub const TOPIC_MANAGE: &str = "threatbus/manage";
