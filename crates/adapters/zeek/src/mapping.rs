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

//! Translation between the canonical model and Zeek broker events.
//!
//! Every function is pure and total: it returns the translated value or
//! `None` when the input is unmappable, logging the reason at debug. See the
//! Zeek Intel framework for the tool-native vocabulary:
//! <https://docs.zeek.org/en/current/scripts/base/frameworks/intel/main.zeek.html#type-Intel::Type>

use std::str::FromStr;

use indexmap::IndexMap;
use threatbus_core::{DurationNanos, datetime::duration_secs_to_nanos};
use threatbus_model::{
    Indicator, IndicatorId, IntelOperation, IntelTag, Message, Sighting, Subscription,
    Unsubscription,
    messages::SightingContext,
    patterns,
};

use crate::broker::{BrokerData, ZeekEvent};

/// The unqualified name of intel events.
pub const INTEL_EVENT: &str = "intel";

/// The unqualified name of sighting events.
pub const SIGHTING_EVENT: &str = "sighting";

/// The unqualified name of subscription requests.
pub const SUBSCRIBE_EVENT: &str = "subscribe";

/// The unqualified name of unsubscription requests.
pub const UNSUBSCRIBE_EVENT: &str = "unsubscribe";

/// The unqualified name of subscription acknowledgments.
pub const ACK_EVENT: &str = "subscription_acknowledged";

/// A management instruction translated from the app transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManagementCommand {
    /// Register a new subscription.
    Subscribe(Subscription),
    /// Revoke a live subscription by its p2p topic.
    Unsubscribe(Unsubscription),
}

/// Qualifies an event name with the module namespace, if any.
#[must_use]
pub fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}::{name}")
    }
}

/// Strips the module namespace qualifier from an event name, if present.
fn strip_namespace<'a>(name: &'a str, namespace: &str) -> &'a str {
    if namespace.is_empty() {
        return name;
    }
    name.strip_prefix(namespace)
        .and_then(|rest| rest.strip_prefix("::"))
        .unwrap_or(name)
}

/// Builds the acknowledgment event carrying a freshly minted p2p topic.
#[must_use]
pub fn subscription_acknowledged(namespace: &str, p2p_topic: &str) -> ZeekEvent {
    ZeekEvent::new(
        qualify(namespace, ACK_EVENT),
        vec![BrokerData::Str(p2p_topic.to_string())],
    )
}

/// Maps a management event to an actionable bus instruction.
///
/// Returns `None` for any event that is not a valid `subscribe` or
/// `unsubscribe` request with a non-empty topic.
#[must_use]
pub fn map_management_message(event: &ZeekEvent, namespace: &str) -> Option<ManagementCommand> {
    let name = strip_namespace(&event.name, namespace);
    match (name, event.args.as_slice()) {
        (SUBSCRIBE_EVENT, [BrokerData::Str(topic), delta]) if !topic.is_empty() => {
            let snapshot_delta = snapshot_delta(delta)?;
            Some(ManagementCommand::Subscribe(Subscription::new(
                topic.clone(),
                snapshot_delta,
            )))
        }
        (UNSUBSCRIBE_EVENT, [BrokerData::Str(topic)]) if !topic.is_empty() => Some(
            ManagementCommand::Unsubscribe(Unsubscription::new(topic.clone())),
        ),
        _ => {
            log::debug!("Skipping unknown management message: {}", event.name);
            None
        }
    }
}

/// Maps an inbound tool event to a canonical message.
///
/// Zeek produces `sighting` events for matched intel and may republish its
/// own `intel` items; everything else is unmappable.
#[must_use]
pub fn map_to_internal(event: &ZeekEvent, namespace: &str) -> Option<Message> {
    match strip_namespace(&event.name, namespace) {
        SIGHTING_EVENT => map_zeek_to_sighting(event, namespace).map(Message::from),
        INTEL_EVENT => map_zeek_to_indicator(event, namespace).map(Message::from),
        _ => {
            log::debug!("Discarding broker event with unknown type: {}", event.name);
            None
        }
    }
}

/// Maps an outbound canonical message to a broker event.
///
/// Snapshot plumbing is not representable in the Zeek Intel vocabulary and
/// is dropped here.
#[must_use]
pub fn map_to_broker(message: &Message, namespace: &str) -> Option<ZeekEvent> {
    match message {
        Message::Indicator(indicator) => map_indicator_to_zeek(indicator, namespace),
        Message::Sighting(sighting) => Some(map_sighting_to_zeek(sighting, namespace)),
        Message::SnapshotRequest(_) | Message::SnapshotEnvelope(_) => {
            log::debug!("Discarding message not representable as a Zeek event: {message}");
            None
        }
    }
}

/// Maps an indicator to a Zeek intel event.
///
/// Zeek only supports point-IoCs; compound patterns and object paths
/// without a Zeek intel type are unmappable.
#[must_use]
pub fn map_indicator_to_zeek(indicator: &Indicator, namespace: &str) -> Option<ZeekEvent> {
    let Some(comparison) = patterns::as_point_equality(&indicator.pattern) else {
        log::debug!(
            "Zeek only supports point-IoCs. Cannot map compound pattern to a Zeek Intel item: {}",
            indicator.pattern
        );
        return None;
    };

    let Some(mut tag) = zeek_intel_tag(&comparison.object_path) else {
        log::debug!(
            "No matching Zeek intel type found for object path '{}'",
            comparison.object_path
        );
        return None;
    };

    let mut value = comparison.value;
    if tag == IntelTag::Url {
        // Remove one leading scheme, if any
        if let Some(stripped) = value
            .strip_prefix("http://")
            .or_else(|| value.strip_prefix("https://"))
        {
            value = stripped.to_string();
        }
    } else if tag == IntelTag::Addr && is_cidr_like(&value) {
        tag = IntelTag::Subnet;
    }

    Some(ZeekEvent::new(
        qualify(namespace, INTEL_EVENT),
        vec![
            BrokerData::Timestamp(indicator.created),
            BrokerData::Str(indicator.id.to_string()),
            BrokerData::Str(tag.to_string()),
            BrokerData::Str(value),
            BrokerData::Str(indicator.operation().to_string()),
        ],
    ))
}

/// Maps a sighting to a Zeek sighting event.
#[must_use]
pub fn map_sighting_to_zeek(sighting: &Sighting, namespace: &str) -> ZeekEvent {
    ZeekEvent::new(
        qualify(namespace, SIGHTING_EVENT),
        vec![
            BrokerData::Timestamp(sighting.created),
            BrokerData::Str(sighting.ref_id.to_string()),
            BrokerData::Table(context_to_table(&sighting.context)),
        ],
    )
}

/// Maps a Zeek sighting event to a canonical sighting.
#[must_use]
pub fn map_zeek_to_sighting(event: &ZeekEvent, namespace: &str) -> Option<Sighting> {
    if strip_namespace(&event.name, namespace) != SIGHTING_EVENT {
        log::debug!("Discarding broker event with unknown type: {}", event.name);
        return None;
    }
    match event.args.as_slice() {
        [
            BrokerData::Timestamp(timestamp),
            BrokerData::Str(ioc_id),
            BrokerData::Table(context),
        ] if !ioc_id.is_empty() => Some(Sighting::new(
            *timestamp,
            IndicatorId::new(ioc_id),
            table_to_context(context),
        )),
        _ => {
            log::debug!("Discarding malformed sighting event: {}", event.name);
            None
        }
    }
}

/// Maps a Zeek intel event back to a canonical indicator.
#[must_use]
pub fn map_zeek_to_indicator(event: &ZeekEvent, namespace: &str) -> Option<Indicator> {
    if strip_namespace(&event.name, namespace) != INTEL_EVENT {
        log::debug!("Discarding broker event with unknown type: {}", event.name);
        return None;
    }
    match event.args.as_slice() {
        [
            BrokerData::Timestamp(created),
            BrokerData::Str(id),
            BrokerData::Str(tag),
            BrokerData::Str(value),
            BrokerData::Str(operation),
        ] if !id.is_empty() => {
            let tag = IntelTag::from_str(tag).ok()?;
            let operation = IntelOperation::from_str(operation).ok()?;
            let pattern = format!("[{} = '{value}']", object_path_for(tag, value));
            let update = match operation {
                IntelOperation::Add => None,
                IntelOperation::Remove => Some(IntelOperation::Remove),
            };
            Some(Indicator::new(
                IndicatorId::new(id),
                *created,
                pattern,
                update,
            ))
        }
        _ => {
            log::debug!("Discarding malformed intel event: {}", event.name);
            None
        }
    }
}

/// Returns the Zeek intel type for a STIX-2 object path, if supported.
#[must_use]
pub fn zeek_intel_tag(object_path: &str) -> Option<IntelTag> {
    Some(match object_path {
        "domain-name:value" => IntelTag::Domain,
        "email-addr:value" => IntelTag::Email,
        "file:name" => IntelTag::FileName,
        "file:hashes.MD5"
        | "file:hashes.'SHA-1'"
        | "file:hashes.'SHA-256'"
        | "file:hashes.'SHA-512'"
        | "file:hashes.'SHA3-256'"
        | "file:hashes.'SHA3-512'"
        | "file:hashes.SSDEEP"
        | "file:hashes.TLSH" => IntelTag::FileHash,
        "ipv4-addr:value" | "ipv6-addr:value" => IntelTag::Addr,
        "software:name" => IntelTag::Software,
        "url:value" => IntelTag::Url,
        "user:user_id" | "user:account_login" => IntelTag::UserName,
        // Zeek only supports SHA-1 certificate hashes
        "x509-certificate:hashes.'SHA-1'" => IntelTag::CertHash,
        _ => return None,
    })
}

/// Returns the canonical STIX-2 object path for a Zeek intel type.
fn object_path_for(tag: IntelTag, value: &str) -> &'static str {
    match tag {
        IntelTag::Domain => "domain-name:value",
        IntelTag::Email => "email-addr:value",
        IntelTag::FileName => "file:name",
        IntelTag::FileHash => "file:hashes.'SHA-256'",
        IntelTag::Addr | IntelTag::Subnet => {
            if value.contains(':') {
                "ipv6-addr:value"
            } else {
                "ipv4-addr:value"
            }
        }
        IntelTag::Software => "software:name",
        IntelTag::Url => "url:value",
        IntelTag::UserName => "user:user_id",
        IntelTag::CertHash => "x509-certificate:hashes.'SHA-1'",
    }
}

fn snapshot_delta(data: &BrokerData) -> Option<DurationNanos> {
    match data {
        BrokerData::Duration(nanos) => Some(*nanos),
        BrokerData::Count(secs) => Some(duration_secs_to_nanos(*secs)),
        _ => None,
    }
}

fn is_cidr_like(value: &str) -> bool {
    value
        .split_once('/')
        .is_some_and(|(addr, prefix)| !addr.is_empty() && !prefix.is_empty())
}

fn context_to_table(context: &SightingContext) -> IndexMap<String, BrokerData> {
    context
        .iter()
        .map(|(key, value)| (key.clone(), json_to_broker(value)))
        .collect()
}

fn table_to_context(table: &IndexMap<String, BrokerData>) -> SightingContext {
    table
        .iter()
        .map(|(key, value)| (key.clone(), broker_to_json(value)))
        .collect()
}

fn json_to_broker(value: &serde_json::Value) -> BrokerData {
    match value {
        serde_json::Value::String(s) => BrokerData::Str(s.clone()),
        serde_json::Value::Number(n) if n.is_u64() => {
            BrokerData::Count(n.as_u64().unwrap_or_default())
        }
        serde_json::Value::Object(map) => BrokerData::Table(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_broker(v)))
                .collect(),
        ),
        other => BrokerData::Str(other.to_string()),
    }
}

fn broker_to_json(value: &BrokerData) -> serde_json::Value {
    match value {
        BrokerData::Str(s) => serde_json::Value::String(s.clone()),
        BrokerData::Count(n) => serde_json::Value::from(*n),
        BrokerData::Timestamp(t) => serde_json::Value::from(t.as_u64()),
        BrokerData::Duration(d) => serde_json::Value::from(*d),
        BrokerData::Table(table) => serde_json::Value::Object(
            table
                .iter()
                .map(|(k, v)| (k.clone(), broker_to_json(v)))
                .collect(),
        ),
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;
    use threatbus_core::UnixNanos;

    use super::*;

    fn indicator(pattern: &str, update: Option<IntelOperation>) -> Indicator {
        Indicator::new(
            IndicatorId::new("ind-1"),
            UnixNanos::from(1_577_836_800_000_000_000),
            pattern,
            update,
        )
    }

    fn intel_args(event: &ZeekEvent) -> (&str, &str, &str) {
        let [_, _, BrokerData::Str(tag), BrokerData::Str(value), BrokerData::Str(operation)] =
            event.args.as_slice()
        else {
            panic!("expected an intel argument tuple");
        };
        (tag, value, operation)
    }

    #[rstest]
    #[case("Tenzir", "Tenzir::subscribe", true)]
    #[case("Tenzir", "subscribe", true)]
    #[case("", "subscribe", true)]
    #[case("Tenzir", "Other::subscribe", false)]
    fn test_management_subscribe_namespaces(
        #[case] namespace: &str,
        #[case] name: &str,
        #[case] mapped: bool,
    ) {
        let event = ZeekEvent::new(
            name,
            vec![BrokerData::from("threatbus/intel"), BrokerData::Count(0)],
        );
        let command = map_management_message(&event, namespace);
        assert_eq!(command.is_some(), mapped);
    }

    #[rstest]
    fn test_management_subscribe_with_snapshot() {
        let event = ZeekEvent::new(
            "Tenzir::subscribe",
            vec![BrokerData::from("threatbus/intel"), BrokerData::Count(30)],
        );
        let Some(ManagementCommand::Subscribe(subscription)) =
            map_management_message(&event, "Tenzir")
        else {
            panic!("expected a subscription");
        };
        assert_eq!(subscription.topic, "threatbus/intel");
        assert_eq!(subscription.snapshot_delta, 30_000_000_000);
    }

    #[rstest]
    fn test_management_unsubscribe() {
        let event = ZeekEvent::new(
            "Tenzir::unsubscribe",
            vec![BrokerData::from("threatbus/intelabcdefghij")],
        );
        let Some(ManagementCommand::Unsubscribe(unsubscription)) =
            map_management_message(&event, "Tenzir")
        else {
            panic!("expected an unsubscription");
        };
        assert_eq!(unsubscription.topic, "threatbus/intelabcdefghij");
    }

    #[rstest]
    // Empty topics
    #[case(ZeekEvent::new("subscribe", vec![BrokerData::from(""), BrokerData::Count(0)]))]
    #[case(ZeekEvent::new("unsubscribe", vec![BrokerData::from("")]))]
    // Wrong arity
    #[case(ZeekEvent::new("subscribe", vec![BrokerData::from("threatbus/intel")]))]
    #[case(ZeekEvent::new("unsubscribe", vec![]))]
    // Unknown names
    #[case(ZeekEvent::new("subscription_acknowledged", vec![BrokerData::from("t")]))]
    #[case(ZeekEvent::new("ping", vec![]))]
    fn test_management_unmappable(#[case] event: ZeekEvent) {
        assert_eq!(map_management_message(&event, ""), None);
    }

    #[rstest]
    #[case("[domain-name:value = 'evil.com']", "DOMAIN", "evil.com")]
    #[case("[email-addr:value = 'foo@evil.com']", "EMAIL", "foo@evil.com")]
    #[case("[file:name = 'dropper.exe']", "FILE_NAME", "dropper.exe")]
    #[case("[file:hashes.MD5 = 'd41d8cd9']", "FILE_HASH", "d41d8cd9")]
    #[case("[file:hashes.'SHA-256' = 'deadbeef']", "FILE_HASH", "deadbeef")]
    #[case("[file:hashes.SSDEEP = '3:abc:def']", "FILE_HASH", "3:abc:def")]
    #[case("[ipv4-addr:value = '6.6.6.6']", "ADDR", "6.6.6.6")]
    #[case("[ipv6-addr:value = '::1']", "ADDR", "::1")]
    #[case("[software:name = 'nginx']", "SOFTWARE", "nginx")]
    #[case("[user:user_id = 'root']", "USER_NAME", "root")]
    #[case("[user:account_login = 'admin']", "USER_NAME", "admin")]
    #[case("[x509-certificate:hashes.'SHA-1' = 'cafe']", "CERT_HASH", "cafe")]
    fn test_intel_translation_table(
        #[case] pattern: &str,
        #[case] expected_tag: &str,
        #[case] expected_value: &str,
    ) {
        let event = map_indicator_to_zeek(&indicator(pattern, None), "Tenzir").unwrap();
        assert_eq!(event.name, "Tenzir::intel");
        let (tag, value, operation) = intel_args(&event);
        assert_eq!(tag, expected_tag);
        assert_eq!(value, expected_value);
        assert_eq!(operation, "ADD");
    }

    #[rstest]
    #[case("[url:value = 'https://evil.example/']", "evil.example/")]
    #[case("[url:value = 'http://evil.example/x']", "evil.example/x")]
    #[case("[url:value = 'evil.example/x']", "evil.example/x")]
    // Scheme stripping is case-sensitive and applied at most once
    #[case("[url:value = 'HTTP://evil.example/']", "HTTP://evil.example/")]
    #[case("[url:value = 'http://https://evil.example/']", "https://evil.example/")]
    fn test_url_scheme_stripping(#[case] pattern: &str, #[case] expected_value: &str) {
        let event = map_indicator_to_zeek(&indicator(pattern, None), "").unwrap();
        let (tag, value, _) = intel_args(&event);
        assert_eq!(tag, "URL");
        assert_eq!(value, expected_value);
    }

    #[rstest]
    #[case("[ipv4-addr:value = '10.0.0.0/8']", "SUBNET", "10.0.0.0/8")]
    #[case("[ipv4-addr:value = '10.0.0.1']", "ADDR", "10.0.0.1")]
    #[case("[ipv6-addr:value = 'fe80::/10']", "SUBNET", "fe80::/10")]
    fn test_addr_subnet_elevation(
        #[case] pattern: &str,
        #[case] expected_tag: &str,
        #[case] expected_value: &str,
    ) {
        let event = map_indicator_to_zeek(&indicator(pattern, None), "").unwrap();
        let (tag, value, _) = intel_args(&event);
        assert_eq!(tag, expected_tag);
        assert_eq!(value, expected_value);
    }

    #[rstest]
    fn test_remove_operation() {
        let event = map_indicator_to_zeek(
            &indicator("[ipv4-addr:value = '1.2.3.4']", Some(IntelOperation::Remove)),
            "",
        )
        .unwrap();
        let (tag, value, operation) = intel_args(&event);
        assert_eq!(tag, "ADDR");
        assert_eq!(value, "1.2.3.4");
        assert_eq!(operation, "REMOVE");
    }

    #[rstest]
    // Compound patterns
    #[case("[url:value='x'] AND [file:name='y']")]
    #[case("[domain-name:value = 'a.com'] AND [url:value = 'x']")]
    // Unsupported object paths
    #[case("[autonomous-system:number = '42']")]
    #[case("[windows-registry-key:key = 'HKLM']")]
    fn test_intel_unmappable(#[case] pattern: &str) {
        assert_eq!(map_indicator_to_zeek(&indicator(pattern, None), ""), None);
    }

    #[rstest]
    fn test_sighting_round_trip_through_broker_form() {
        let mut context = SightingContext::new();
        context.insert("noisy".to_string(), serde_json::json!("true"));
        context.insert("count".to_string(), serde_json::json!(3));
        let sighting = Sighting::new(
            UnixNanos::from(1_577_836_800_000_000_000),
            IndicatorId::new("ind-1"),
            context,
        );

        let event = map_sighting_to_zeek(&sighting, "Tenzir");
        assert_eq!(event.name, "Tenzir::sighting");

        let mapped = map_zeek_to_sighting(&event, "Tenzir").unwrap();
        assert_eq!(mapped, sighting);
    }

    #[rstest]
    // Wrong arity
    #[case(ZeekEvent::new("sighting", vec![BrokerData::Timestamp(UnixNanos::from(1)), BrokerData::from("ind-1")]))]
    // Wrong argument types
    #[case(ZeekEvent::new("sighting", vec![BrokerData::from("now"), BrokerData::from("ind-1"), BrokerData::Table(IndexMap::new())]))]
    // Wrong name
    #[case(ZeekEvent::new("observation", vec![BrokerData::Timestamp(UnixNanos::from(1)), BrokerData::from("ind-1"), BrokerData::Table(IndexMap::new())]))]
    fn test_sighting_unmappable(#[case] event: ZeekEvent) {
        assert_eq!(map_zeek_to_sighting(&event, ""), None);
    }

    #[rstest]
    #[case("[domain-name:value = 'evil.com']")]
    #[case("[ipv4-addr:value = '10.0.0.0/8']")]
    #[case("[url:value = 'evil.example/x']")]
    #[case("[file:hashes.'SHA-256' = 'deadbeef']")]
    fn test_intel_round_trip_preserves_tag_and_value(#[case] pattern: &str) {
        let original = indicator(pattern, None);
        let event = map_indicator_to_zeek(&original, "Tenzir").unwrap();

        let mapped = map_zeek_to_indicator(&event, "Tenzir").unwrap();
        assert_eq!(mapped.id, original.id);
        assert_eq!(mapped.created, original.created);

        let event_again = map_indicator_to_zeek(&mapped, "Tenzir").unwrap();
        assert_eq!(intel_args(&event_again), intel_args(&event));
    }

    #[rstest]
    fn test_map_to_broker_drops_snapshot_plumbing() {
        let message = Message::from(threatbus_model::SnapshotRequest::new(
            1,
            "threatbus/intel",
            threatbus_core::UUID4::new(),
        ));
        assert_eq!(map_to_broker(&message, ""), None);
    }

    #[rstest]
    fn test_subscription_acknowledged_event() {
        let event = subscription_acknowledged("Tenzir", "threatbus/intelabcdefghij");
        assert_eq!(event.name, "Tenzir::subscription_acknowledged");
        assert_eq!(
            event.args,
            vec![BrokerData::from("threatbus/intelabcdefghij")]
        );
    }

    #[rstest]
    fn test_qualify_with_empty_namespace() {
        assert_eq!(qualify("", INTEL_EVENT), "intel");
        assert_eq!(qualify("Tenzir", INTEL_EVENT), "Tenzir::intel");
    }
}
