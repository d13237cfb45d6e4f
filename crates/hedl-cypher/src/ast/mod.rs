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

//! Query template AST.
//!
//! Entities and patterns, expressions, option groups and clauses. Everything
//! here is immutable data built by the fluent constructors and consumed by
//! the compiler.

pub mod clause;
pub mod entity;
pub mod expr;
pub mod option;

pub use clause::{
    limit, match_, opt_clause, order_by, return_, where_, Clause, Cypher, CypherBuilder,
    Direction, OrderBy, OrderToken,
};
pub use entity::{node, rel, Entity, EntityKind, Pattern, PendingRelationship};
pub use expr::{alias, and, eql, like, lit, opt, param, Expression};
pub use option::{OptionGroup, Selection};
