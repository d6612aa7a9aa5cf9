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

//! The canonical message types moved between apps and backbones.
//!
//! [`Message`] is the closed tagged variant over the four routed kinds; the
//! dispatcher, the backbones and the translators all match on it
//! exhaustively, so adding a kind fails to compile until every consumer
//! handles it.

use std::fmt::Display;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use threatbus_core::{DurationNanos, UUID4, UnixNanos, serialization::Serializable};

use crate::{
    enums::{IntelOperation, MessageKind},
    identifiers::IndicatorId,
    topics,
};

/// An opaque key-value context attached to a sighting.
///
/// Key order is preserved by the encoding; semantic equality ignores it.
pub type SightingContext = IndexMap<String, serde_json::Value>;

/// Represents an indicator of compromise (IoC) expressed as a constrained
/// equality pattern over an object path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    /// The stable identifier assigned by the producing source.
    pub id: IndicatorId,
    /// UNIX timestamp (nanoseconds) when the indicator was created.
    pub created: UnixNanos,
    /// The pattern string in the constrained STIX-2 grammar.
    pub pattern: String,
    /// The update operation, when this indicator revokes or amends a prior one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<IntelOperation>,
}

impl Indicator {
    /// Creates a new [`Indicator`] instance.
    #[must_use]
    pub fn new<T: Into<String>>(
        id: IndicatorId,
        created: UnixNanos,
        pattern: T,
        update: Option<IntelOperation>,
    ) -> Self {
        Self {
            id,
            created,
            pattern: pattern.into(),
            update,
        }
    }

    /// Returns the effective update operation, defaulting to [`IntelOperation::Add`].
    #[must_use]
    pub fn operation(&self) -> IntelOperation {
        self.update.unwrap_or_default()
    }
}

impl Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}(id={}, created={}, pattern={})",
            stringify!(Indicator),
            self.id,
            self.created,
            self.pattern,
        )
    }
}

/// Represents an observation that an indicator matched, with context.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sighting {
    /// UNIX timestamp (nanoseconds) when the sighting occurred.
    pub created: UnixNanos,
    /// The identifier of the sighted indicator (need not resolve locally).
    pub ref_id: IndicatorId,
    /// Opaque context provided by the sighting tool.
    #[serde(default)]
    pub context: SightingContext,
}

impl Sighting {
    /// Creates a new [`Sighting`] instance.
    #[must_use]
    pub fn new(created: UnixNanos, ref_id: IndicatorId, context: SightingContext) -> Self {
        Self {
            created,
            ref_id,
            context,
        }
    }
}

impl Display for Sighting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}(created={}, ref_id={})",
            stringify!(Sighting),
            self.created,
            self.ref_id,
        )
    }
}

/// Represents a request for historical republication on a topic over a
/// bounded look-back window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRequest {
    /// The look-back window in nanoseconds.
    pub snapshot_delta: DurationNanos,
    /// The topic whose history is requested.
    pub topic: String,
    /// The request correlation identifier.
    pub id: UUID4,
}

impl SnapshotRequest {
    /// Creates a new [`SnapshotRequest`] instance.
    #[must_use]
    pub fn new<T: Into<String>>(snapshot_delta: DurationNanos, topic: T, id: UUID4) -> Self {
        Self {
            snapshot_delta,
            topic: topic.into(),
            id,
        }
    }
}

impl Display for SnapshotRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}(snapshot_delta={}, topic={}, id={})",
            stringify!(SnapshotRequest),
            self.snapshot_delta,
            self.topic,
            self.id,
        )
    }
}

/// The payload of a snapshot envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotPayload {
    Indicator(Indicator),
    Sighting(Sighting),
}

/// Represents a reply to a [`SnapshotRequest`], carrying one historical message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEnvelope {
    /// The correlation identifier of the originating request.
    pub id: UUID4,
    /// The republished historical payload.
    pub payload: SnapshotPayload,
}

impl SnapshotEnvelope {
    /// Creates a new [`SnapshotEnvelope`] instance.
    #[must_use]
    pub fn new(id: UUID4, payload: SnapshotPayload) -> Self {
        Self { id, payload }
    }
}

impl Display for SnapshotEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(id={})", stringify!(SnapshotEnvelope), self.id)
    }
}

/// Represents an app's request to receive messages for a topic prefix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// The originating topic (a prefix of the canonical topics of interest).
    pub topic: String,
    /// The snapshot look-back window in nanoseconds (zero for none).
    pub snapshot_delta: DurationNanos,
}

impl Subscription {
    /// Creates a new [`Subscription`] instance.
    #[must_use]
    pub fn new<T: Into<String>>(topic: T, snapshot_delta: DurationNanos) -> Self {
        Self {
            topic: topic.into(),
            snapshot_delta,
        }
    }
}

impl Display for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}(topic={}, snapshot_delta={})",
            stringify!(Subscription),
            self.topic,
            self.snapshot_delta,
        )
    }
}

/// Represents an app's request to revoke a live subscription.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unsubscription {
    /// The point-to-point topic handle returned when the subscription was made.
    pub topic: String,
}

impl Unsubscription {
    /// Creates a new [`Unsubscription`] instance.
    #[must_use]
    pub fn new<T: Into<String>>(topic: T) -> Self {
        Self {
            topic: topic.into(),
        }
    }
}

impl Display for Unsubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(topic={})", stringify!(Unsubscription), self.topic)
    }
}

/// A routed canonical message.
///
/// These are the values that flow through the dispatcher and over backbones;
/// subscription management instructions are translated into dispatcher calls
/// by app adapters and never routed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    Indicator(Indicator),
    Sighting(Sighting),
    SnapshotRequest(SnapshotRequest),
    SnapshotEnvelope(SnapshotEnvelope),
}

impl Message {
    /// Returns the canonical topic this message is routed on.
    #[must_use]
    pub const fn topic(&self) -> &'static str {
        match self {
            Self::Indicator(_) => topics::TOPIC_INTEL,
            Self::Sighting(_) => topics::TOPIC_SIGHTING,
            Self::SnapshotRequest(_) => topics::TOPIC_SNAPSHOT_REQUEST,
            Self::SnapshotEnvelope(_) => topics::TOPIC_SNAPSHOT_ENVELOPE,
        }
    }

    /// Returns the kind of this message.
    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        match self {
            Self::Indicator(_) => MessageKind::Indicator,
            Self::Sighting(_) => MessageKind::Sighting,
            Self::SnapshotRequest(_) => MessageKind::SnapshotRequest,
            Self::SnapshotEnvelope(_) => MessageKind::SnapshotEnvelope,
        }
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Indicator(msg) => msg.fmt(f),
            Self::Sighting(msg) => msg.fmt(f),
            Self::SnapshotRequest(msg) => msg.fmt(f),
            Self::SnapshotEnvelope(msg) => msg.fmt(f),
        }
    }
}

impl Serializable for Message {}
impl Serializable for Subscription {}
impl Serializable for Unsubscription {}

impl From<Indicator> for Message {
    fn from(value: Indicator) -> Self {
        Self::Indicator(value)
    }
}

impl From<Sighting> for Message {
    fn from(value: Sighting) -> Self {
        Self::Sighting(value)
    }
}

impl From<SnapshotRequest> for Message {
    fn from(value: SnapshotRequest) -> Self {
        Self::SnapshotRequest(value)
    }
}

impl From<SnapshotEnvelope> for Message {
    fn from(value: SnapshotEnvelope) -> Self {
        Self::SnapshotEnvelope(value)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn indicator() -> Indicator {
        Indicator::new(
            IndicatorId::new("ind-1"),
            UnixNanos::from(1_577_836_800_000_000_000),
            "[domain-name:value = 'evil.com']",
            None,
        )
    }

    #[rstest]
    fn test_indicator_operation_defaults_to_add() {
        assert_eq!(indicator().operation(), IntelOperation::Add);

        let removal = Indicator::new(
            IndicatorId::new("ind-1"),
            UnixNanos::default(),
            "[ipv4-addr:value = '1.2.3.4']",
            Some(IntelOperation::Remove),
        );
        assert_eq!(removal.operation(), IntelOperation::Remove);
    }

    #[rstest]
    fn test_message_topics() {
        let msg = Message::from(indicator());
        assert_eq!(msg.topic(), "threatbus/intel");
        assert_eq!(msg.kind(), MessageKind::Indicator);

        let msg = Message::from(Sighting::new(
            UnixNanos::default(),
            IndicatorId::new("ind-1"),
            SightingContext::new(),
        ));
        assert_eq!(msg.topic(), "threatbus/sighting");

        let msg = Message::from(SnapshotRequest::new(30, "threatbus/intel", UUID4::new()));
        assert_eq!(msg.topic(), "threatbus/snapshotrequest");

        let msg = Message::from(SnapshotEnvelope::new(
            UUID4::new(),
            SnapshotPayload::Indicator(indicator()),
        ));
        assert_eq!(msg.topic(), "threatbus/snapshotenvelope");
    }

    #[rstest]
    fn test_sighting_context_equality_ignores_order() {
        let mut ctx_a = SightingContext::new();
        ctx_a.insert("source".to_string(), serde_json::json!("zeek"));
        ctx_a.insert("noisy".to_string(), serde_json::json!(true));

        let mut ctx_b = SightingContext::new();
        ctx_b.insert("noisy".to_string(), serde_json::json!(true));
        ctx_b.insert("source".to_string(), serde_json::json!("zeek"));

        let a = Sighting::new(UnixNanos::from(1), IndicatorId::new("ind-1"), ctx_a);
        let b = Sighting::new(UnixNanos::from(1), IndicatorId::new("ind-1"), ctx_b);
        assert_eq!(a, b);
    }

    #[rstest]
    fn test_display() {
        assert_eq!(
            indicator().to_string(),
            "Indicator(id=ind-1, created=1577836800000000000, pattern=[domain-name:value = 'evil.com'])"
        );
    }
}
