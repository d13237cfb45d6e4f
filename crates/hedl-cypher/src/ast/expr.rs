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

//! Predicate and value expressions.

use serde::{Deserialize, Serialize};

use super::option::OptionGroup;
use crate::cypher::CypherValue;
use crate::error::Result;

/// A value or predicate expression.
///
/// Expressions are plain data; nothing is evaluated until compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// `entity.property`
    Property {
        /// Variable name of the entity.
        entity: String,
        /// Property key.
        property: String,
    },
    /// An inline literal value.
    Literal(CypherValue),
    /// A named parameter bound from the execution context.
    Param(String),
    /// `inner AS name`
    Alias {
        /// The projected expression.
        inner: Box<Expression>,
        /// The output column name.
        name: String,
    },
    /// `left = right`
    Eq(Box<Expression>, Box<Expression>),
    /// `left LIKE "pattern"`
    Like(Box<Expression>, String),
    /// Operands joined by `AND`.
    And(Vec<Expression>),
    /// A variant chosen at execution time.
    Opt(OptionGroup<Expression>),
}

impl Expression {
    /// `self = other`
    pub fn equals(self, other: impl Into<Expression>) -> Expression {
        Expression::Eq(Box::new(self), Box::new(other.into()))
    }

    /// `self LIKE "pattern"`
    pub fn like(self, pattern: impl Into<String>) -> Expression {
        Expression::Like(Box::new(self), pattern.into())
    }

    /// `self AND other`, flattened.
    pub fn and(self, other: impl Into<Expression>) -> Expression {
        and([self, other.into()])
    }

    /// `self AS name`
    pub fn alias(self, name: impl Into<String>) -> Expression {
        Expression::Alias {
            inner: Box::new(self),
            name: name.into(),
        }
    }
}

impl From<CypherValue> for Expression {
    fn from(value: CypherValue) -> Self {
        Expression::Literal(value)
    }
}

impl From<OptionGroup<Expression>> for Expression {
    fn from(group: OptionGroup<Expression>) -> Self {
        Expression::Opt(group)
    }
}

/// Equality predicate.
pub fn eql(left: impl Into<Expression>, right: impl Into<Expression>) -> Expression {
    left.into().equals(right)
}

/// Pattern-match predicate against a literal `LIKE` pattern.
pub fn like(left: impl Into<Expression>, pattern: impl Into<String>) -> Expression {
    left.into().like(pattern)
}

/// Conjunction of predicates.
///
/// Nested conjunctions are flattened into one list, left to right. Operands
/// are kept as given: no reordering and no de-duplication.
pub fn and<I, E>(operands: I) -> Expression
where
    I: IntoIterator<Item = E>,
    E: Into<Expression>,
{
    let mut flat = Vec::new();
    for operand in operands {
        match operand.into() {
            Expression::And(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }
    Expression::And(flat)
}

/// Parameter placeholder, bound from the execution context.
pub fn param(name: impl Into<String>) -> Expression {
    Expression::Param(name.into())
}

/// Projection with an output name.
pub fn alias(inner: impl Into<Expression>, name: impl Into<String>) -> Expression {
    inner.into().alias(name)
}

/// Inline literal value.
pub fn lit(value: impl Into<CypherValue>) -> Expression {
    Expression::Literal(value.into())
}

/// Expression-level option group.
///
/// ```
/// # use hedl_cypher::{node, opt};
/// let c = node("c");
/// let field = opt([("name", c.prop("name")), ("thing", c.prop("thing"))]).unwrap();
/// # let _ = field;
/// ```
pub fn opt<I, K>(variants: I) -> Result<Expression>
where
    I: IntoIterator<Item = (K, Expression)>,
    K: Into<String>,
{
    OptionGroup::new(variants).map(Expression::Opt)
}
