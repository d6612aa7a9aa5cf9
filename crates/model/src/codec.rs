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

//! Self-describing JSON codecs for the canonical message types.
//!
//! Every encoded value carries a `"type"` tag identifying its kind. Decoders
//! discriminate failures precisely: syntactically invalid bytes or a missing
//! tag are [`DecodeError::Malformed`], an unrecognized tag is
//! [`DecodeError::UnknownKind`], and a recognized tag whose fields fail to
//! deserialize is [`DecodeError::SchemaMismatch`].

use bytes::Bytes;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use threatbus_core::serialization::Serializable;

use crate::{
    enums::MessageKind,
    messages::{Message, Subscription, Unsubscription},
};

/// The field carrying the message kind tag.
pub const TAG_FIELD: &str = "type";

const TAG_SUBSCRIPTION: &str = "subscription";
const TAG_UNSUBSCRIPTION: &str = "unsubscription";

/// The tags of every encodable message type.
const KNOWN_TAGS: [&str; 6] = [
    "indicator",
    "sighting",
    "snapshot_request",
    "snapshot_envelope",
    TAG_SUBSCRIPTION,
    TAG_UNSUBSCRIPTION,
];

/// Represents a failure to decode an encoded canonical message.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The bytes were not a syntactically valid encoding, or carried no tag.
    #[error("Malformed message: {0}")]
    Malformed(String),
    /// The tag did not name any known message type.
    #[error("Unknown message kind '{0}'")]
    UnknownKind(String),
    /// The tag was recognized but the fields did not match its schema.
    #[error("Schema mismatch for message kind '{kind}': {reason}")]
    SchemaMismatch {
        /// The tag that was recognized.
        kind: String,
        /// Why deserialization failed.
        reason: String,
    },
}

/// Encodes a routed message to its tagged JSON byte form.
///
/// Encoding cannot fail for a well-typed value; the message types contain
/// only JSON-representable data.
#[must_use]
pub fn encode(message: &Message) -> Bytes {
    message
        .to_json_bytes()
        .expect("Message encoding is infallible")
}

/// Encodes a subscription instruction to its tagged JSON byte form.
#[must_use]
pub fn encode_subscription(value: &Subscription) -> Bytes {
    encode_tagged(TAG_SUBSCRIPTION, value)
}

/// Encodes an unsubscription instruction to its tagged JSON byte form.
#[must_use]
pub fn encode_unsubscription(value: &Unsubscription) -> Bytes {
    encode_tagged(TAG_UNSUBSCRIPTION, value)
}

/// Decodes a routed message from tagged JSON bytes.
///
/// # Errors
///
/// Returns a [`DecodeError`] discriminating malformed bytes, unknown tags
/// and schema mismatches. Management instruction tags are recognized but
/// not routable, and report as schema mismatches.
pub fn decode(data: &[u8]) -> Result<Message, DecodeError> {
    let (tag, value) = parse_tagged(data)?;
    match tag.as_str() {
        "indicator" | "sighting" | "snapshot_request" | "snapshot_envelope" => {
            serde_json::from_value::<Message>(value).map_err(|e| DecodeError::SchemaMismatch {
                kind: tag,
                reason: e.to_string(),
            })
        }
        TAG_SUBSCRIPTION | TAG_UNSUBSCRIPTION => Err(DecodeError::SchemaMismatch {
            kind: tag,
            reason: "management instructions are not routed messages".to_string(),
        }),
        _ => Err(DecodeError::UnknownKind(tag)),
    }
}

/// Decodes a routed message and checks it is of the expected kind.
///
/// Used by durable backbones whose queues are segregated by kind: a delivery
/// of the wrong kind on a queue is a schema mismatch, not a routing decision.
///
/// # Errors
///
/// Returns a [`DecodeError`] on any decode failure or kind mismatch.
pub fn decode_expecting(kind: MessageKind, data: &[u8]) -> Result<Message, DecodeError> {
    let message = decode(data)?;
    if message.kind() != kind {
        return Err(DecodeError::SchemaMismatch {
            kind: message.kind().to_string(),
            reason: format!("expected message kind '{kind}'"),
        });
    }
    Ok(message)
}

/// Decodes a subscription instruction from tagged JSON bytes.
///
/// # Errors
///
/// Returns a [`DecodeError`] on any decode failure.
pub fn decode_subscription(data: &[u8]) -> Result<Subscription, DecodeError> {
    decode_tagged(TAG_SUBSCRIPTION, data)
}

/// Decodes an unsubscription instruction from tagged JSON bytes.
///
/// # Errors
///
/// Returns a [`DecodeError`] on any decode failure.
pub fn decode_unsubscription(data: &[u8]) -> Result<Unsubscription, DecodeError> {
    decode_tagged(TAG_UNSUBSCRIPTION, data)
}

fn encode_tagged<T: Serialize>(tag: &str, value: &T) -> Bytes {
    let mut value = serde_json::to_value(value).expect("Message encoding is infallible");
    value
        .as_object_mut()
        .expect("Tagged messages encode as objects")
        .insert(TAG_FIELD.to_string(), serde_json::Value::String(tag.to_string()));
    Bytes::from(serde_json::to_vec(&value).expect("Message encoding is infallible"))
}

fn decode_tagged<T: DeserializeOwned>(expected_tag: &str, data: &[u8]) -> Result<T, DecodeError> {
    let (tag, value) = parse_tagged(data)?;
    if tag != expected_tag {
        return if KNOWN_TAGS.contains(&tag.as_str()) {
            Err(DecodeError::SchemaMismatch {
                kind: tag,
                reason: format!("expected message kind '{expected_tag}'"),
            })
        } else {
            Err(DecodeError::UnknownKind(tag))
        };
    }
    serde_json::from_value(value).map_err(|e| DecodeError::SchemaMismatch {
        kind: tag,
        reason: e.to_string(),
    })
}

fn parse_tagged(data: &[u8]) -> Result<(String, serde_json::Value), DecodeError> {
    let value: serde_json::Value =
        serde_json::from_slice(data).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    let tag = value
        .get(TAG_FIELD)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| DecodeError::Malformed(format!("missing '{TAG_FIELD}' tag")))?
        .to_string();
    Ok((tag, value))
}
