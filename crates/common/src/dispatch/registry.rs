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

//! The topic-indexed subscriber registry.

use indexmap::IndexMap;
use smallvec::SmallVec;
use ustr::Ustr;

use super::{inbox::InboxSender, matching::topic_matches};

/// Inline capacity for fan-out target buffers before heap allocation.
pub(crate) const TARGET_BUFFER_CAP: usize = 8;

/// The kind of a registered subscriber.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SubscriberKind {
    /// An app subscription created over the management channel.
    App,
    /// A backbone tap re-publishing local messages to other bus nodes.
    Backbone,
}

/// Where a published message entered this node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Produced by an app connected to this node.
    Local,
    /// Delivered by a backbone transport from another node.
    Remote,
}

/// Represents one live subscription.
#[derive(Clone, Debug)]
pub struct SubscriberEntry {
    /// The unique point-to-point topic serving as the subscription handle.
    pub p2p_topic: Ustr,
    /// The originating topic the subscription matches by prefix.
    pub topic: Ustr,
    /// The producer half of the subscriber's inbox.
    pub sender: InboxSender,
    /// The kind of subscriber.
    pub kind: SubscriberKind,
    /// The registration sequence number; messages accepted earlier are
    /// never delivered to this entry.
    pub since: u64,
}

/// The registry mapping `p2p_topic` to its [`SubscriberEntry`].
///
/// All access is serialized by the dispatcher's registry mutex; the fan-out
/// worker snapshots matching senders under the lock and releases it before
/// enqueuing, so a blocked subscriber cannot hold up registration.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    entries: IndexMap<Ustr, SubscriberEntry>,
}

impl Registry {
    /// Adds an entry keyed by its p2p topic.
    pub fn insert(&mut self, entry: SubscriberEntry) {
        debug_assert!(
            !self.entries.contains_key(&entry.p2p_topic),
            "Duplicate p2p topic registered"
        );
        self.entries.insert(entry.p2p_topic, entry);
    }

    /// Removes and returns the entry for `p2p_topic`, if present.
    pub fn remove(&mut self, p2p_topic: &str) -> Option<SubscriberEntry> {
        self.entries.shift_remove(&Ustr::from(p2p_topic))
    }

    /// Fills `buf` with the senders of every entry matching a message.
    ///
    /// An entry matches when its originating topic is a prefix of `topic`
    /// and it was registered before the message was accepted. Backbone taps
    /// never match remote-origin messages, so a delivery arriving over a
    /// fan-out exchange is not echoed back onto it.
    pub fn fill_matching(
        &self,
        topic: &str,
        seq: u64,
        origin: Origin,
        buf: &mut SmallVec<[InboxSender; TARGET_BUFFER_CAP]>,
    ) {
        for entry in self.entries.values() {
            if origin == Origin::Remote && entry.kind == SubscriberKind::Backbone {
                continue;
            }
            if entry.since < seq && topic_matches(topic, entry.topic.as_str()) {
                buf.push(entry.sender.clone());
            }
        }
    }

    /// Returns the originating topics of all live entries.
    pub fn topics(&self) -> Vec<Ustr> {
        self.entries.values().map(|e| e.topic).collect()
    }

    /// Returns the p2p handles of every registration of `sender` under the
    /// given originating topics.
    pub fn keys_for_inbox(&self, topics: &[&str], sender: &InboxSender) -> Vec<Ustr> {
        self.entries
            .values()
            .filter(|e| topics.contains(&e.topic.as_str()) && e.sender.same_channel(sender))
            .map(|e| e.p2p_topic)
            .collect()
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the registry has no live entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry, releasing all registered senders.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::dispatch::inbox::Inbox;

    fn entry(p2p: &str, topic: &str, kind: SubscriberKind, since: u64) -> SubscriberEntry {
        let (sender, _rx) = Inbox::bounded(1);
        // Receivers leak in these tests on purpose; entries stay open
        std::mem::forget(_rx);
        SubscriberEntry {
            p2p_topic: Ustr::from(p2p),
            topic: Ustr::from(topic),
            sender,
            kind,
            since,
        }
    }

    #[rstest]
    fn test_insert_remove_idempotent() {
        let mut registry = Registry::default();
        registry.insert(entry("threatbus/intelabc", "threatbus/intel", SubscriberKind::App, 0));
        assert_eq!(registry.len(), 1);

        assert!(registry.remove("threatbus/intelabc").is_some());
        assert!(registry.remove("threatbus/intelabc").is_none());
        assert!(registry.is_empty());
    }

    #[rstest]
    fn test_fill_matching_by_prefix() {
        let mut registry = Registry::default();
        registry.insert(entry("threatbus/aaa", "threatbus/", SubscriberKind::App, 0));
        registry.insert(entry("threatbus/intelbbb", "threatbus/intel", SubscriberKind::App, 0));

        let mut buf = SmallVec::new();
        registry.fill_matching("threatbus/sighting", 1, Origin::Local, &mut buf);
        assert_eq!(buf.len(), 1);

        buf.clear();
        registry.fill_matching("threatbus/intel", 1, Origin::Local, &mut buf);
        assert_eq!(buf.len(), 2);
    }

    #[rstest]
    fn test_fill_matching_respects_registration_order() {
        let mut registry = Registry::default();
        registry.insert(entry("threatbus/aaa", "threatbus/", SubscriberKind::App, 5));

        let mut buf = SmallVec::new();
        // Message accepted before the subscription existed
        registry.fill_matching("threatbus/intel", 3, Origin::Local, &mut buf);
        assert!(buf.is_empty());

        registry.fill_matching("threatbus/intel", 6, Origin::Local, &mut buf);
        assert_eq!(buf.len(), 1);
    }

    #[rstest]
    fn test_remote_origin_skips_backbone_taps() {
        let mut registry = Registry::default();
        registry.insert(entry("threatbus/aaa", "threatbus/", SubscriberKind::Backbone, 0));
        registry.insert(entry("threatbus/bbb", "threatbus/", SubscriberKind::App, 0));

        let mut buf = SmallVec::new();
        registry.fill_matching("threatbus/intel", 1, Origin::Remote, &mut buf);
        assert_eq!(buf.len(), 1);

        buf.clear();
        registry.fill_matching("threatbus/intel", 1, Origin::Local, &mut buf);
        assert_eq!(buf.len(), 2);
    }
}
