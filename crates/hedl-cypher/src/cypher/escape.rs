// Dweve HEDL - Hierarchical Entity Data Language
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Cypher string escaping and identifier validation utilities.
//!
//! Labels and property keys supplied by callers are rendered verbatim when
//! they are plain identifiers and backtick-quoted otherwise. Variable names
//! are never quoted: they must already be valid identifiers.

use crate::error::{CypherError, Result};
use std::borrow::Cow;
use unicode_normalization::UnicodeNormalization;

/// Check if a string needs escaping inside a double-quoted literal.
#[inline]
fn needs_escaping(s: &str) -> bool {
    s.chars()
        .any(|ch| matches!(ch, '\\' | '"' | '\n' | '\r' | '\t' | '\x00'))
}

/// Escape a string value for use inside a double-quoted Cypher literal.
///
/// Returns `Cow::Borrowed` when the input contains nothing to escape.
///
/// # Examples
///
/// ```
/// # use hedl_cypher::cypher::escape_string;
/// let clean = escape_string("test%");
/// assert!(matches!(clean, std::borrow::Cow::Borrowed(_)));
///
/// let dirty = escape_string(r#"a "b""#);
/// assert_eq!(dirty, r#"a \"b\""#);
/// ```
pub fn escape_string(s: &str) -> Cow<'_, str> {
    if !needs_escaping(s) {
        return Cow::Borrowed(s);
    }

    let mut escaped = String::with_capacity(s.len() + 10);
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\x00' => escaped.push_str("\\u0000"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Quote a string value for Cypher with double quotes.
pub fn quote_string(s: &str) -> String {
    format!("\"{}\"", escape_string(s))
}

/// Check if a string is a valid Cypher identifier.
///
/// Valid identifiers start with a letter or underscore, and contain only
/// letters, digits, and underscores.
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };

    if !first.is_ascii_alphabetic() && first != '_' {
        return false;
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate a variable name, or error if it cannot be used unquoted.
pub fn validate_identifier(s: &str) -> Result<&str> {
    if is_valid_identifier(s) && !is_cypher_keyword(s) {
        Ok(s)
    } else {
        Err(CypherError::InvalidIdentifier(s.to_string()))
    }
}

/// Normalize a string to NFC (Canonical Composition) form.
///
/// ```
/// # use hedl_cypher::cypher::normalize_unicode;
/// let composed = "caf\u{e9}";
/// let decomposed = "cafe\u{301}";
/// assert_eq!(normalize_unicode(composed), normalize_unicode(decomposed));
/// ```
pub fn normalize_unicode(s: &str) -> String {
    s.nfc().collect()
}

/// Control, zero-width and bidirectional formatting characters.
fn is_dangerous_unicode(c: char) -> bool {
    c.is_control()
        || matches!(
            c,
            '\u{200B}'
                | '\u{200C}'
                | '\u{200D}'
                | '\u{FEFF}'
                | '\u{202A}'
                | '\u{202B}'
                | '\u{202C}'
                | '\u{202D}'
                | '\u{202E}'
                | '\u{2066}'
                | '\u{2067}'
                | '\u{2068}'
                | '\u{2069}'
                | '\u{00AD}'
                | '\u{061C}'
                | '\u{180E}'
        )
}

fn sanitize(s: &str) -> String {
    normalize_unicode(s)
        .chars()
        .filter(|c| !is_dangerous_unicode(*c))
        .collect()
}

/// Escape a property key or map key using backticks if needed.
///
/// # Examples
///
/// ```
/// # use hedl_cypher::cypher::escape_identifier;
/// assert_eq!(escape_identifier("name"), "name");
/// assert_eq!(escape_identifier("first name"), "`first name`");
/// assert_eq!(escape_identifier("MATCH"), "`MATCH`");
/// ```
pub fn escape_identifier(s: &str) -> String {
    let sanitized = sanitize(s);

    if is_valid_identifier(&sanitized) && !is_cypher_keyword(&sanitized) {
        sanitized
    } else {
        format!("`{}`", sanitized.replace('`', "``"))
    }
}

/// Escape a node label or relationship type, including the leading `:`.
///
/// # Examples
///
/// ```
/// # use hedl_cypher::cypher::escape_label;
/// assert_eq!(escape_label("TEST"), ":TEST");
/// assert_eq!(escape_label("My-Label"), ":`My-Label`");
/// ```
pub fn escape_label(s: &str) -> String {
    format!(":{}", escape_identifier(s))
}

/// Check if a string is a Cypher reserved keyword.
fn is_cypher_keyword(s: &str) -> bool {
    matches!(
        s.to_uppercase().as_str(),
        "ALL"
            | "AND"
            | "ANY"
            | "AS"
            | "ASC"
            | "ASCENDING"
            | "BY"
            | "CALL"
            | "CASE"
            | "CONTAINS"
            | "COUNT"
            | "CREATE"
            | "DELETE"
            | "DESC"
            | "DESCENDING"
            | "DETACH"
            | "DISTINCT"
            | "DROP"
            | "ELSE"
            | "END"
            | "ENDS"
            | "EXISTS"
            | "FALSE"
            | "FOREACH"
            | "IN"
            | "IS"
            | "LIKE"
            | "LIMIT"
            | "MATCH"
            | "MERGE"
            | "NOT"
            | "NULL"
            | "ON"
            | "OPTIONAL"
            | "OR"
            | "ORDER"
            | "REMOVE"
            | "RETURN"
            | "SET"
            | "SKIP"
            | "STARTS"
            | "THEN"
            | "TRUE"
            | "UNION"
            | "UNWIND"
            | "WHEN"
            | "WHERE"
            | "WITH"
            | "XOR"
            | "YIELD"
    )
}
