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

//! Identifier types for the canonical message model.

use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};
use threatbus_core::correctness::check_nonempty_string;
use ustr::Ustr;

/// Represents a stable indicator identifier assigned by the producing source.
///
/// The value is opaque to the bus; a sighting's `ref_id` need not resolve to
/// an indicator known locally.
#[repr(C)]
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndicatorId(Ustr);

impl IndicatorId {
    /// Creates a new [`IndicatorId`] instance with correctness checking.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is an empty string.
    pub fn new_checked<T: AsRef<str>>(value: T) -> anyhow::Result<Self> {
        check_nonempty_string(value.as_ref(), stringify!(value))?;
        Ok(Self(Ustr::from(value.as_ref())))
    }

    /// Creates a new [`IndicatorId`] instance.
    ///
    /// # Panics
    ///
    /// This function panics if `value` is an empty string.
    pub fn new<T: AsRef<str>>(value: T) -> Self {
        Self::new_checked(value).expect(threatbus_core::correctness::FAILED)
    }

    /// Returns the inner identifier value.
    #[must_use]
    pub fn inner(&self) -> Ustr {
        self.0
    }

    /// Returns the inner identifier value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Debug for IndicatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}('{}')", stringify!(IndicatorId), self.0)
    }
}

impl Display for IndicatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IndicatorId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for IndicatorId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
