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

//! The canonical message model for the Threat Bus message broker.
//!
//! Every app and backbone adapter speaks this model: indicators, sightings,
//! snapshot requests/envelopes and the subscription management instructions,
//! together with their self-describing JSON codecs and the STIX-2 pattern
//! inspection used by translators.

pub mod codec;
pub mod enums;
pub mod identifiers;
pub mod messages;
pub mod patterns;
pub mod topics;

pub use crate::{
    enums::{IntelOperation, IntelTag, MessageKind},
    identifiers::IndicatorId,
    messages::{
        Indicator, Message, Sighting, SightingContext, SnapshotEnvelope, SnapshotPayload,
        SnapshotRequest, Subscription, Unsubscription,
    },
};
