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

//! Top-level clauses and the query container.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::entity::Pattern;
use super::expr::Expression;
use super::option::OptionGroup;
use crate::error::{CypherError, Result};

/// Sort direction for an ORDER BY field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// `asc`
    Ascending,
    /// `desc`
    Descending,
}

impl Direction {
    /// The lower-case token rendered after a sort field.
    pub fn token(self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }
}

impl FromStr for Direction {
    type Err = CypherError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Direction::Ascending),
            "desc" | "descending" => Ok(Direction::Descending),
            other => Err(CypherError::InvalidOrderBy(format!(
                "unknown direction '{}'",
                other
            ))),
        }
    }
}

/// One element of an interleaved ORDER BY sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderToken {
    /// A sort field.
    Field(Expression),
    /// Direction for the immediately preceding field.
    Direction(Direction),
}

impl From<Expression> for OrderToken {
    fn from(expr: Expression) -> Self {
        OrderToken::Field(expr)
    }
}

impl From<Direction> for OrderToken {
    fn from(direction: Direction) -> Self {
        OrderToken::Direction(direction)
    }
}

/// ORDER BY as an interleaved sequence of fields and directions.
///
/// A direction applies only to the field right before it; fields without a
/// direction render with no token.
///
/// ```
/// # use hedl_cypher::{node, order_by};
/// let c = node("c");
/// let order = order_by().field(c.prop("name")).desc().field(c.prop("stuff"));
/// # let _ = order;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    tokens: Vec<OrderToken>,
}

impl OrderBy {
    /// Create an empty ORDER BY.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an already interleaved token sequence.
    pub fn from_tokens<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OrderToken>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a sort field.
    pub fn field(mut self, expr: impl Into<Expression>) -> Self {
        self.tokens.push(OrderToken::Field(expr.into()));
        self
    }

    /// Append a direction token.
    pub fn direction(mut self, direction: Direction) -> Self {
        self.tokens.push(OrderToken::Direction(direction));
        self
    }

    /// Mark the preceding field ascending.
    pub fn asc(self) -> Self {
        self.direction(Direction::Ascending)
    }

    /// Mark the preceding field descending.
    pub fn desc(self) -> Self {
        self.direction(Direction::Descending)
    }

    /// The raw token sequence.
    pub fn tokens(&self) -> &[OrderToken] {
        &self.tokens
    }

    /// Pair each field with the direction that follows it, if any.
    ///
    /// Fails when a direction has no field to attach to, either because it
    /// comes first or because it follows another direction.
    pub fn sort_keys(&self) -> Result<Vec<(&Expression, Option<Direction>)>> {
        let mut keys: Vec<(&Expression, Option<Direction>)> = Vec::new();
        for token in &self.tokens {
            match token {
                OrderToken::Field(expr) => keys.push((expr, None)),
                OrderToken::Direction(direction) => match keys.last_mut() {
                    Some((_, slot @ None)) => *slot = Some(*direction),
                    Some((_, Some(_))) => {
                        return Err(CypherError::InvalidOrderBy(format!(
                            "direction '{}' follows another direction",
                            direction.token()
                        )))
                    }
                    None => {
                        return Err(CypherError::InvalidOrderBy(format!(
                            "direction '{}' has no preceding field",
                            direction.token()
                        )))
                    }
                },
            }
        }
        Ok(keys)
    }
}

/// A top-level query clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Clause {
    /// `MATCH pattern, ...`
    Match(Vec<Pattern>),
    /// `WHERE predicate`
    Where(Expression),
    /// `RETURN projection, ...`
    Return(Vec<Expression>),
    /// `ORDER BY field [dir], ...`
    OrderBy(OrderBy),
    /// `LIMIT n`
    Limit(u64),
    /// A clause chosen at execution time.
    Opt(OptionGroup<Clause>),
}

impl From<OrderBy> for Clause {
    fn from(order: OrderBy) -> Self {
        Clause::OrderBy(order)
    }
}

impl From<OptionGroup<Clause>> for Clause {
    fn from(group: OptionGroup<Clause>) -> Self {
        Clause::Opt(group)
    }
}

/// MATCH clause.
pub fn match_<I, P>(patterns: I) -> Clause
where
    I: IntoIterator<Item = P>,
    P: Into<Pattern>,
{
    Clause::Match(patterns.into_iter().map(Into::into).collect())
}

/// WHERE clause.
pub fn where_(predicate: impl Into<Expression>) -> Clause {
    Clause::Where(predicate.into())
}

/// RETURN clause.
pub fn return_<I, E>(projections: I) -> Clause
where
    I: IntoIterator<Item = E>,
    E: Into<Expression>,
{
    Clause::Return(projections.into_iter().map(Into::into).collect())
}

/// Start an ORDER BY clause.
pub fn order_by() -> OrderBy {
    OrderBy::new()
}

/// LIMIT clause.
pub fn limit(n: u64) -> Clause {
    Clause::Limit(n)
}

/// Clause-level option group.
pub fn opt_clause<I, K>(variants: I) -> Result<Clause>
where
    I: IntoIterator<Item = (K, Clause)>,
    K: Into<String>,
{
    OptionGroup::new(variants).map(Clause::Opt)
}

/// A query template: an ordered, immutable list of clauses.
///
/// The same value can be compiled any number of times, from any number of
/// threads, with different contexts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cypher {
    clauses: Vec<Clause>,
}

impl Cypher {
    /// Assemble a query from clauses in rendering order.
    pub fn new<I, C>(clauses: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Clause>,
    {
        Self {
            clauses: clauses.into_iter().map(Into::into).collect(),
        }
    }

    /// A query with no clauses. Compiles to an empty string.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start a fluent builder.
    pub fn builder() -> CypherBuilder {
        CypherBuilder::default()
    }

    /// The clauses in declaration order.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Load a template previously serialized with serde_json.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize this template to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Fluent builder for [`Cypher`].
#[derive(Debug, Default)]
pub struct CypherBuilder {
    clauses: Vec<Clause>,
}

impl CypherBuilder {
    /// Append a MATCH clause.
    pub fn match_<I, P>(self, patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Pattern>,
    {
        self.clause(match_(patterns))
    }

    /// Append a WHERE clause.
    pub fn where_(self, predicate: impl Into<Expression>) -> Self {
        self.clause(where_(predicate))
    }

    /// Append a RETURN clause.
    pub fn return_<I, E>(self, projections: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        self.clause(return_(projections))
    }

    /// Append an ORDER BY clause.
    pub fn order_by(self, order: OrderBy) -> Self {
        self.clause(order)
    }

    /// Append a LIMIT clause.
    pub fn limit(self, n: u64) -> Self {
        self.clause(limit(n))
    }

    /// Append any clause, including option groups.
    pub fn clause(mut self, clause: impl Into<Clause>) -> Self {
        self.clauses.push(clause.into());
        self
    }

    /// Finish the query.
    pub fn build(self) -> Cypher {
        Cypher {
            clauses: self.clauses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::entity::node;

    #[test]
    fn test_direction_parse() {
        assert_eq!("desc".parse::<Direction>().unwrap(), Direction::Descending);
        assert_eq!(
            "Descending".parse::<Direction>().unwrap(),
            Direction::Descending
        );
        assert_eq!("ASC".parse::<Direction>().unwrap(), Direction::Ascending);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_direction_applies_to_preceding_field_only() {
        let c = node("c");
        let order = order_by()
            .field(c.prop("name"))
            .desc()
            .field(c.prop("stuff"));
        let keys = order.sort_keys().unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].1, Some(Direction::Descending));
        assert_eq!(keys[1].1, None);
    }

    #[test]
    fn test_from_tokens() {
        let c = node("c");
        let order = OrderBy::from_tokens([
            OrderToken::from(c.prop("a")),
            Direction::Ascending.into(),
            c.prop("b").into(),
        ]);
        assert_eq!(order.tokens().len(), 3);
        let keys = order.sort_keys().unwrap();
        assert_eq!(keys[0].1, Some(Direction::Ascending));
        assert_eq!(keys[1].1, None);
    }

    #[test]
    fn test_dangling_directions_rejected() {
        let c = node("c");
        assert!(matches!(
            order_by().desc().sort_keys(),
            Err(CypherError::InvalidOrderBy(_))
        ));
        assert!(matches!(
            order_by().field(c.prop("a")).desc().asc().sort_keys(),
            Err(CypherError::InvalidOrderBy(_))
        ));
    }

    #[test]
    fn test_builder_matches_new() {
        let c = node("c");
        let built = Cypher::builder()
            .match_([&c])
            .return_([c.prop("name")])
            .limit(10)
            .build();
        let direct = Cypher::new([
            match_([&c]),
            return_([c.prop("name")]),
            limit(10),
        ]);
        assert_eq!(built, direct);
        assert_eq!(built.clauses().len(), 3);
        assert!(Cypher::empty().clauses().is_empty());
    }

    #[test]
    fn test_json_round_trip_preserves_template() {
        let c = node("c").with_label("what");
        let query = Cypher::new([
            match_([&c]),
            opt_clause([
                ("name", return_([c.prop("name")])),
                ("thing", return_([c.prop("thing")])),
            ])
            .unwrap(),
        ]);
        let json = query.to_json().unwrap();
        assert_eq!(Cypher::from_json(&json).unwrap(), query);
    }
}
