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

//! Option groups: choices between named variants deferred until execution.
//!
//! A group is resolved against the execution context every time the query
//! is compiled. Resolution scans keys in declaration order and picks the
//! first key the context selects; when none is selected the first variant
//! wins, so every template compiles against an empty context.
//!
//! Occurrences are resolved independently. Two groups declaring the same
//! keys agree because they are resolved against the same context, not
//! because they share state.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::context::Context;
use crate::error::{CypherError, Result};

/// An ordered, non-empty set of named variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "RawOptionGroup<T>",
    bound(deserialize = "T: Deserialize<'de>")
)]
pub struct OptionGroup<T> {
    variants: Vec<(String, T)>,
}

#[derive(Deserialize)]
struct RawOptionGroup<T> {
    variants: Vec<(String, T)>,
}

impl<T> TryFrom<RawOptionGroup<T>> for OptionGroup<T> {
    type Error = CypherError;

    fn try_from(raw: RawOptionGroup<T>) -> Result<Self> {
        Self::new(raw.variants)
    }
}

/// The outcome of resolving an [`OptionGroup`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection<'a, T> {
    /// Key of the chosen variant.
    pub key: &'a str,
    /// The chosen variant.
    pub value: &'a T,
    /// True when no key was selected and the first variant was used.
    pub defaulted: bool,
}

impl<T> OptionGroup<T> {
    /// Build a group from `(key, variant)` pairs in declaration order.
    ///
    /// Fails with [`CypherError::EmptyOptionGroup`] when no variants are given.
    pub fn new<I, K>(variants: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
    {
        let variants: Vec<(String, T)> = variants
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .collect();
        if variants.is_empty() {
            return Err(CypherError::EmptyOptionGroup);
        }
        Ok(Self { variants })
    }

    /// Keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|(k, _)| k.as_str())
    }

    /// Variants in declaration order.
    pub fn variants(&self) -> &[(String, T)] {
        &self.variants
    }

    /// Number of variants (always at least one).
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Pick the variant for `ctx`.
    pub fn select(&self, ctx: &Context) -> Selection<'_, T> {
        let (index, defaulted) = match self.variants.iter().position(|(k, _)| ctx.selects(k)) {
            Some(i) => (i, false),
            None => (0, true),
        };
        let (key, value) = &self.variants[index];
        trace!(key = %key, defaulted, "resolved option group");
        Selection {
            key,
            value,
            defaulted,
        }
    }

    /// Pick the variant for `ctx`, discarding the selection metadata.
    pub fn resolve(&self, ctx: &Context) -> &T {
        self.select(ctx).value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> OptionGroup<&'static str> {
        OptionGroup::new([("name", "by name"), ("thing", "by thing")]).unwrap()
    }

    #[test]
    fn test_empty_group_rejected() {
        let result = OptionGroup::<i32>::new(Vec::<(String, i32)>::new());
        assert!(matches!(result, Err(CypherError::EmptyOptionGroup)));
    }

    #[test]
    fn test_defaults_to_first() {
        let g = group();
        let selection = g.select(&Context::new());
        assert_eq!(selection.key, "name");
        assert_eq!(*selection.value, "by name");
        assert!(selection.defaulted);
    }

    #[test]
    fn test_selects_present_key() {
        let ctx = Context::new().with("thing", 123i64);
        let g = group();
        let selection = g.select(&ctx);
        assert_eq!(selection.key, "thing");
        assert!(!selection.defaulted);
    }

    #[test]
    fn test_declaration_order_wins() {
        let ctx = Context::new().with("thing", true).with("name", true);
        assert_eq!(*group().resolve(&ctx), "by name");
    }

    #[test]
    fn test_false_and_null_do_not_select() {
        let ctx = Context::new()
            .with("name", false)
            .with("thing", crate::cypher::CypherValue::Null);
        let g = group();
        let selection = g.select(&ctx);
        assert_eq!(selection.key, "name");
        assert!(selection.defaulted);

        let ctx = Context::new().with("name", false).with("thing", "x");
        assert_eq!(*g.resolve(&ctx), "by thing");
    }

    #[test]
    fn test_unrelated_keys_ignored() {
        let ctx = Context::new().with("other", true);
        assert_eq!(*group().resolve(&ctx), "by name");
    }

    #[test]
    fn test_deserialize_rejects_empty() {
        let ok: OptionGroup<i64> =
            serde_json::from_str(r#"{"variants": [["a", 1], ["b", 2]]}"#).unwrap();
        assert_eq!(ok.keys().collect::<Vec<_>>(), ["a", "b"]);
        let err = serde_json::from_str::<OptionGroup<i64>>(r#"{"variants": []}"#);
        assert!(err.is_err());
    }
}
