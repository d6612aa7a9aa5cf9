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

//! Enumerations for the canonical message model.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The closed set of tool-native intelligence tags an indicator can translate to.
///
/// The variants mirror the Zeek Intel framework types; other app adapters map
/// the same set onto their own vocabularies.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntelTag {
    /// A domain name, e.g. `evil.com`.
    Domain,
    /// An email address.
    Email,
    /// A file name (without path).
    FileName,
    /// A file content hash (MD5, SHA family, SSDEEP, TLSH).
    FileHash,
    /// A single IP address (v4 or v6).
    Addr,
    /// A software product name.
    Software,
    /// A URL with the scheme stripped.
    Url,
    /// A user name or account login.
    UserName,
    /// An X.509 certificate SHA-1 hash.
    CertHash,
    /// An IP subnet in CIDR notation, elevated from [`IntelTag::Addr`].
    Subnet,
}

/// The update operation carried by an indicator.
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
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntelOperation {
    /// Add the intelligence item.
    #[default]
    Add,
    /// Remove a previously added intelligence item.
    Remove,
}

/// The kind of a routed canonical message.
///
/// Backbones select exchanges and queue names by exhaustive match on this
/// enum, so a new message kind fails to compile until every transport
/// handles it.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Indicator,
    Sighting,
    SnapshotRequest,
    SnapshotEnvelope,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(IntelTag::Domain, "DOMAIN")]
    #[case(IntelTag::FileName, "FILE_NAME")]
    #[case(IntelTag::FileHash, "FILE_HASH")]
    #[case(IntelTag::Addr, "ADDR")]
    #[case(IntelTag::Url, "URL")]
    #[case(IntelTag::UserName, "USER_NAME")]
    #[case(IntelTag::CertHash, "CERT_HASH")]
    #[case(IntelTag::Subnet, "SUBNET")]
    fn test_intel_tag_wire_form(#[case] tag: IntelTag, #[case] expected: &str) {
        assert_eq!(tag.to_string(), expected);
        assert_eq!(IntelTag::from_str(expected).unwrap(), tag);
        assert_eq!(
            serde_json::to_string(&tag).unwrap(),
            format!("\"{expected}\"")
        );
    }

    #[rstest]
    #[case(IntelOperation::Add, "ADD")]
    #[case(IntelOperation::Remove, "REMOVE")]
    fn test_intel_operation_wire_form(#[case] op: IntelOperation, #[case] expected: &str) {
        assert_eq!(op.to_string(), expected);
        assert_eq!(IntelOperation::from_str(expected).unwrap(), op);
    }

    #[rstest]
    fn test_intel_operation_default_is_add() {
        assert_eq!(IntelOperation::default(), IntelOperation::Add);
    }

    #[rstest]
    #[case(MessageKind::Indicator, "indicator")]
    #[case(MessageKind::SnapshotRequest, "snapshot_request")]
    fn test_message_kind_wire_form(#[case] kind: MessageKind, #[case] expected: &str) {
        assert_eq!(kind.to_string(), expected);
    }
}
