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

//! Inspection of STIX-2 pattern strings.
//!
//! The bus guarantees translation only for *point-equality* IoCs: patterns
//! whose inspected form contains exactly one observation, no qualifiers, no
//! observation operators, and exactly one comparison of the shape
//! `(path, '=', literal)`. Compound patterns are valid canonical data but a
//! translator may reject them.
//!
//! The inspector is a quote- and bracket-aware scanner rather than a full
//! grammar: object paths may contain quoted segments
//! (`file:hashes.'SHA-1'`) and literals may contain brackets or keywords,
//! so naive splitting is not an option.

/// The single comparison of a point-equality IoC.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointComparison {
    /// The object path on the left-hand side, e.g. `domain-name:value`.
    pub object_path: String,
    /// The literal on the right-hand side, trimmed of surrounding whitespace
    /// and one pair of single quotes.
    pub value: String,
}

/// Returns whether the pattern is a point-equality IoC.
#[must_use]
pub fn is_point_equality_ioc(pattern: &str) -> bool {
    as_point_equality(pattern).is_some()
}

/// Decomposes a point-equality IoC pattern into its single comparison.
///
/// Returns `None` for anything else: compound observations, observation
/// operators or qualifiers, non-equality comparisons, or text that is not a
/// well-formed pattern.
#[must_use]
pub fn as_point_equality(pattern: &str) -> Option<PointComparison> {
    let shape = decompose(pattern)?;
    if shape.outer_tokens || shape.observations.len() != 1 {
        return None;
    }

    let body = shape.observations[0];
    if contains_keyword(body, "AND") || contains_keyword(body, "OR") {
        return None;
    }

    let eq = find_equality(body)?;
    let object_path = body[..eq].trim();
    let literal = body[eq + 1..].trim();
    if object_path.is_empty() || literal.is_empty() {
        return None;
    }

    Some(PointComparison {
        object_path: object_path.to_string(),
        value: strip_quotes(literal).to_string(),
    })
}

struct PatternShape<'a> {
    /// The bodies of the bracketed observation expressions.
    observations: Vec<&'a str>,
    /// Whether any non-whitespace text appeared outside the observations
    /// (observation operators or qualifiers).
    outer_tokens: bool,
}

/// Splits a pattern into observation bodies and flags any surrounding tokens.
///
/// Returns `None` for unbalanced brackets or an unterminated string literal.
fn decompose(pattern: &str) -> Option<PatternShape<'_>> {
    let mut observations = Vec::new();
    let mut outer_tokens = false;
    let mut depth = 0usize;
    let mut body_start = 0usize;
    let mut in_quote = false;
    let mut escaped = false;

    for (i, c) in pattern.char_indices() {
        if in_quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '\'' {
                in_quote = false;
            }
            continue;
        }
        match c {
            '\'' => in_quote = true,
            '[' => {
                if depth == 0 {
                    body_start = i + c.len_utf8();
                }
                depth += 1;
            }
            ']' => {
                if depth == 0 {
                    return None;
                }
                depth -= 1;
                if depth == 0 {
                    observations.push(&pattern[body_start..i]);
                }
            }
            _ => {
                if depth == 0 && !c.is_whitespace() {
                    outer_tokens = true;
                }
            }
        }
    }

    if depth != 0 || in_quote {
        return None;
    }

    Some(PatternShape {
        observations,
        outer_tokens,
    })
}

/// Returns whether `body` contains `keyword` as a standalone word outside quotes.
fn contains_keyword(body: &str, keyword: &str) -> bool {
    let bytes = body.as_bytes();
    let mut in_quote = false;
    let mut escaped = false;

    for (i, c) in body.char_indices() {
        if in_quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '\'' {
                in_quote = false;
            }
            continue;
        }
        if c == '\'' {
            in_quote = true;
            continue;
        }
        if body[i..].starts_with(keyword) {
            let before_ok = i == 0 || !bytes[i - 1].is_ascii_alphanumeric();
            let after = i + keyword.len();
            let after_ok = after >= bytes.len() || !bytes[after].is_ascii_alphanumeric();
            if before_ok && after_ok {
                return true;
            }
        }
    }

    false
}

/// Finds the byte index of the single equality operator outside quotes.
///
/// Returns `None` when the first comparison operator is not a plain `=`
/// (`!=`, `<=`, `>=`, `==` are all rejected) or no operator is present.
fn find_equality(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut in_quote = false;
    let mut escaped = false;

    for (i, c) in body.char_indices() {
        if in_quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '\'' {
                in_quote = false;
            }
            continue;
        }
        match c {
            '\'' => in_quote = true,
            '=' => {
                if i > 0 && matches!(bytes[i - 1], b'!' | b'<' | b'>') {
                    return None;
                }
                if i + 1 < bytes.len() && bytes[i + 1] == b'=' {
                    return None;
                }
                return Some(i);
            }
            _ => {}
        }
    }

    None
}

/// Strips one pair of surrounding single quotes, if present.
fn strip_quotes(literal: &str) -> &str {
    if literal.len() >= 2 && literal.starts_with('\'') && literal.ends_with('\'') {
        &literal[1..literal.len() - 1]
    } else {
        literal
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("[domain-name:value = 'evil.com']", "domain-name:value", "evil.com")]
    #[case("[domain-name:value='evil.com']", "domain-name:value", "evil.com")]
    #[case("[ipv4-addr:value = '10.0.0.0/8']", "ipv4-addr:value", "10.0.0.0/8")]
    #[case(
        "[url:value = 'https://evil.example/']",
        "url:value",
        "https://evil.example/"
    )]
    #[case("[file:hashes.'SHA-1' = 'deadbeef']", "file:hashes.'SHA-1'", "deadbeef")]
    #[case(
        "[x509-certificate:hashes.'SHA-1' = 'cafe']",
        "x509-certificate:hashes.'SHA-1'",
        "cafe"
    )]
    #[case("[software:name = 'nginx']", "software:name", "nginx")]
    #[case("  [user:user_id = 'root']  ", "user:user_id", "root")]
    fn test_point_equality_accepted(
        #[case] pattern: &str,
        #[case] object_path: &str,
        #[case] value: &str,
    ) {
        let comparison = as_point_equality(pattern).unwrap();
        assert_eq!(comparison.object_path, object_path);
        assert_eq!(comparison.value, value);
    }

    #[rstest]
    // Observation operators between observations
    #[case("[domain-name:value = 'a.com'] AND [url:value = 'x']")]
    #[case("[url:value='x'] AND [file:name='y']")]
    #[case("[a:b = 'x'] OR [c:d = 'y']")]
    #[case("[a:b = 'x'] FOLLOWEDBY [c:d = 'y']")]
    // Compound comparisons inside one observation
    #[case("[domain-name:value = 'a.com' AND domain-name:resolves_to_refs = 'x']")]
    #[case("[ipv4-addr:value = '1.2.3.4' OR ipv4-addr:value = '5.6.7.8']")]
    // Qualifiers
    #[case("[domain-name:value = 'a.com'] REPEATS 5 TIMES")]
    #[case("[domain-name:value = 'a.com'] WITHIN 300 SECONDS")]
    // Non-equality comparisons
    #[case("[ipv4-addr:value != '1.2.3.4']")]
    #[case("[file:size >= '100']")]
    #[case("[file:size <= '100']")]
    #[case("[domain-name:value LIKE 'a%']")]
    // Not well-formed
    #[case("")]
    #[case("domain-name:value = 'a.com'")]
    #[case("[domain-name:value = 'a.com'")]
    #[case("[domain-name:value = 'a.com]")]
    #[case("[]")]
    #[case("[ ]")]
    #[case("[= 'a.com']")]
    #[case("[domain-name:value =]")]
    fn test_point_equality_rejected(#[case] pattern: &str) {
        assert_eq!(as_point_equality(pattern), None);
        assert!(!is_point_equality_ioc(pattern));
    }

    #[rstest]
    fn test_keywords_inside_literals_do_not_reject() {
        let comparison = as_point_equality("[domain-name:value = 'AND.OR.example']").unwrap();
        assert_eq!(comparison.value, "AND.OR.example");
    }

    #[rstest]
    fn test_brackets_inside_literals_do_not_split() {
        let comparison = as_point_equality("[file:name = 'report[1].pdf']").unwrap();
        assert_eq!(comparison.value, "report[1].pdf");
    }

    #[rstest]
    fn test_escaped_quote_in_literal() {
        let comparison = as_point_equality(r"[file:name = 'it\'s.pdf']").unwrap();
        assert_eq!(comparison.value, r"it\'s.pdf");
    }

    #[rstest]
    fn test_unquoted_literal_is_kept_verbatim() {
        let comparison = as_point_equality("[file:size = 100]").unwrap();
        assert_eq!(comparison.value, "100");
    }

    #[rstest]
    fn test_rejection_is_deterministic() {
        let pattern = "[url:value='x'] AND [file:name='y']";
        assert_eq!(as_point_equality(pattern), as_point_equality(pattern));
    }
}
