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

//! Execution contexts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cypher::CypherValue;
use crate::error::Result;

/// Key/value input supplied when a query is compiled or executed.
///
/// The same context drives option selection and parameter binding. It is
/// never stored on the query, so one query can be compiled against any
/// number of contexts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    values: BTreeMap<String, CypherValue>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, replacing any previous value under the same key.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<CypherValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<CypherValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Load a context from a JSON object.
    ///
    /// ```
    /// # use hedl_cypher::{Context, CypherValue};
    /// let ctx = Context::from_json(r#"{"thing": 123}"#).unwrap();
    /// assert_eq!(ctx.get("thing"), Some(&CypherValue::Int(123)));
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&CypherValue> {
        self.values.get(key)
    }

    /// Whether `key` selects an option variant (present, not null, not false).
    pub fn selects(&self, key: &str) -> bool {
        self.get(key).is_some_and(CypherValue::is_selecting)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the context is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CypherValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Context
where
    K: Into<String>,
    V: Into<CypherValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = Context::new();
        ctx.extend(iter);
        ctx
    }
}

impl<K, V> Extend<(K, V)> for Context
where
    K: Into<String>,
    V: Into<CypherValue>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CypherError;

    #[test]
    fn test_builder_and_lookup() {
        let ctx = Context::new().with("thing", "of course").with("n", 3i64);
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.get("thing").and_then(CypherValue::as_str), Some("of course"));
        assert_eq!(ctx.get("missing"), None);
    }

    #[test]
    fn test_selects() {
        let ctx: Context = [
            ("yes", CypherValue::Bool(true)),
            ("zero", CypherValue::Int(0)),
            ("no", CypherValue::Bool(false)),
            ("nothing", CypherValue::Null),
        ]
        .into_iter()
        .collect();
        assert!(ctx.selects("yes"));
        assert!(ctx.selects("zero"));
        assert!(!ctx.selects("no"));
        assert!(!ctx.selects("nothing"));
        assert!(!ctx.selects("absent"));
    }

    #[test]
    fn test_from_json() {
        let ctx = Context::from_json(r#"{"name": "Testing Test", "flag": false}"#).unwrap();
        assert_eq!(ctx.get("name"), Some(&CypherValue::from("Testing Test")));
        assert!(!ctx.selects("flag"));
        assert!(Context::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_from_json_rejects_oversized_integer() {
        let err = Context::from_json(r#"{"id": 18446744073709551615}"#).unwrap_err();
        assert!(matches!(err, CypherError::JsonError(_)));

        let ctx = Context::from_json(r#"{"id": 9223372036854775807}"#).unwrap();
        assert_eq!(ctx.get("id"), Some(&CypherValue::Int(i64::MAX)));
    }
}
