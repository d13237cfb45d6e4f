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

//! Parameter and literal values.

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A value bound to a parameter, stored in an execution context, or embedded
/// as a literal in a query.
///
/// Deserializes from plain JSON-like data. Integers outside the `i64` range
/// are rejected instead of being widened to floats.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CypherValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// String value.
    String(String),
    /// List value.
    List(Vec<CypherValue>),
    /// Map/object value.
    Map(BTreeMap<String, CypherValue>),
}

impl<'de> Deserialize<'de> for CypherValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(CypherValueVisitor)
    }
}

struct CypherValueVisitor;

impl<'de> Visitor<'de> for CypherValueVisitor {
    type Value = CypherValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("null, a boolean, a number, a string, a list or a map")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<CypherValue, E> {
        Ok(CypherValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<CypherValue, E> {
        Ok(CypherValue::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> std::result::Result<CypherValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        CypherValue::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<CypherValue, E> {
        Ok(CypherValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<CypherValue, E> {
        Ok(CypherValue::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<CypherValue, E> {
        i64::try_from(v)
            .map(CypherValue::Int)
            .map_err(|_| E::custom(format!("integer {v} is out of range for a Cypher integer")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<CypherValue, E> {
        Ok(CypherValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<CypherValue, E> {
        Ok(CypherValue::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<CypherValue, E> {
        Ok(CypherValue::String(v))
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<CypherValue, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(CypherValue::List(items))
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<CypherValue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, CypherValue>()? {
            entries.insert(key, value);
        }
        Ok(CypherValue::Map(entries))
    }
}

impl From<bool> for CypherValue {
    fn from(v: bool) -> Self {
        CypherValue::Bool(v)
    }
}

impl From<i64> for CypherValue {
    fn from(v: i64) -> Self {
        CypherValue::Int(v)
    }
}

impl From<i32> for CypherValue {
    fn from(v: i32) -> Self {
        CypherValue::Int(v as i64)
    }
}

impl From<u32> for CypherValue {
    fn from(v: u32) -> Self {
        CypherValue::Int(v as i64)
    }
}

impl From<f64> for CypherValue {
    fn from(v: f64) -> Self {
        CypherValue::Float(v)
    }
}

impl From<String> for CypherValue {
    fn from(v: String) -> Self {
        CypherValue::String(v)
    }
}

impl From<&str> for CypherValue {
    fn from(v: &str) -> Self {
        CypherValue::String(v.to_string())
    }
}

impl<T: Into<CypherValue>> From<Vec<T>> for CypherValue {
    fn from(v: Vec<T>) -> Self {
        CypherValue::List(v.into_iter().map(|x| x.into()).collect())
    }
}

impl<T: Into<CypherValue>> From<Option<T>> for CypherValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(x) => x.into(),
            None => CypherValue::Null,
        }
    }
}

impl CypherValue {
    /// Convert to Cypher literal syntax.
    ///
    /// Strings are double-quoted, matching the form used for `LIKE` patterns.
    pub fn to_cypher_literal(&self) -> String {
        match self {
            CypherValue::Null => "null".to_string(),
            CypherValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            CypherValue::Int(i) => i.to_string(),
            CypherValue::Float(f) => {
                if f.is_nan() {
                    "0.0/0.0".to_string()
                } else if f.is_infinite() {
                    if *f > 0.0 {
                        "1.0/0.0".to_string()
                    } else {
                        "-1.0/0.0".to_string()
                    }
                } else {
                    let s = f.to_string();
                    if s.contains('.') || s.contains('e') || s.contains('E') {
                        s
                    } else {
                        format!("{}.0", s)
                    }
                }
            }
            CypherValue::String(s) => super::escape::quote_string(s),
            CypherValue::List(items) => {
                let inner: Vec<String> = items.iter().map(|v| v.to_cypher_literal()).collect();
                format!("[{}]", inner.join(", "))
            }
            CypherValue::Map(map) => {
                let pairs: Vec<String> = map
                    .iter()
                    .map(|(k, v)| {
                        format!(
                            "{}: {}",
                            super::escape::escape_identifier(k),
                            v.to_cypher_literal()
                        )
                    })
                    .collect();
                format!("{{{}}}", pairs.join(", "))
            }
        }
    }

    /// Whether this value selects an option key.
    ///
    /// Every value except `Null` and `false` selects, including `0` and `""`.
    pub fn is_selecting(&self) -> bool {
        !matches!(self, CypherValue::Null | CypherValue::Bool(false))
    }

    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, CypherValue::Null)
    }

    /// Try to get as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CypherValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CypherValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CypherValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}
