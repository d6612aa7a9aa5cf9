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

//! Common string functions.

use rand::Rng;

/// Generates a pseudo-random lowercase-alphabetic string with the requested length.
///
/// Used to mint opaque per-subscription topic suffixes.
#[must_use]
pub fn rand_suffix(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| rng.random_range(b'a'..=b'z') as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(10)]
    fn test_rand_suffix_length(#[case] length: usize) {
        let s = rand_suffix(length);
        assert_eq!(s.len(), length);
        assert!(s.chars().all(|c| c.is_ascii_lowercase()));
    }

    #[rstest]
    fn test_rand_suffix_is_opaque() {
        // Two draws colliding over 10 alphabetic chars is vanishingly unlikely
        assert_ne!(rand_suffix(10), rand_suffix(10));
    }
}
