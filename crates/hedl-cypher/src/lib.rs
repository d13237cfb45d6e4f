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

//! Composable Cypher query templates with execution-time option resolution.
//!
//! This crate provides functionality to:
//! - Build Cypher queries from typed entities, patterns and expressions
//! - Defer choices between clause or expression variants until execution
//! - Compile a template plus an execution context into query text and a
//!   parameter map
//! - Hand the compiled pair to any driver through the [`Adapter`] trait
//!
//! # Example
//!
//! ```rust
//! use hedl_cypher::{
//!     and, eql, like, match_, node, order_by, param, rel, return_, where_, limit, alias,
//!     Context, Cypher, Pattern,
//! };
//!
//! fn example() -> Result<(), hedl_cypher::CypherError> {
//!     let c = node("c").with_label("what");
//!     let v = node("v").with_label("other");
//!     let n = node("n");
//!     let r = rel("r");
//!
//!     let query = Cypher::new([
//!         match_([r.from(&c).to(&n), Pattern::from(&v)]),
//!         where_(and([
//!             eql(c.prop("stuff"), param("thing")),
//!             like(c.prop("staff"), "test%"),
//!         ])),
//!         return_([c.prop("name"), alias(c.prop("stuff"), "something")]),
//!         order_by().field(c.prop("name")).desc().field(c.prop("stuff")).into(),
//!         limit(10),
//!     ]);
//!
//!     let compiled = query.compile(&Context::new().with("thing", "of course"))?;
//!     assert_eq!(
//!         compiled.query,
//!         "MATCH (c:what)-[r]->(n), (v:other) \
//!          WHERE c.stuff = {thing} AND c.staff LIKE \"test%\" \
//!          RETURN c.name AS name, c.stuff AS something \
//!          ORDER BY c.name desc, c.stuff LIMIT 10"
//!     );
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! # Option groups
//!
//! An option group names several variants; the execution context picks one.
//! The first declared key with a value other than `null` or `false` in the
//! context wins, and the first variant is used when none matches.
//!
//! ```rust
//! use hedl_cypher::{match_, node, opt_clause, return_, Context, Cypher, RecordingAdapter};
//!
//! let c = node("c");
//! let query = Cypher::new([
//!     match_([&c]),
//!     opt_clause([
//!         ("name", return_([c.prop("name")])),
//!         ("thing", return_([c.prop("thing")])),
//!     ])
//!     .unwrap(),
//! ]);
//!
//! let mut adapter = RecordingAdapter::new();
//! query.execute(&mut adapter, &Context::new().with("thing", 123)).unwrap();
//! assert_eq!(adapter.last().unwrap().query, "MATCH (c) RETURN c.thing AS thing");
//!
//! query.execute(&mut adapter, &Context::new()).unwrap();
//! assert_eq!(adapter.last().unwrap().query, "MATCH (c) RETURN c.name AS name");
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod adapter;
pub mod ast;
pub mod compile;
pub mod config;
pub mod context;
pub mod cypher;
pub mod error;

// Re-export main types at crate root for convenience
pub use adapter::{Adapter, BoundQuery, RecordedCall, RecordingAdapter};
pub use ast::{
    alias, and, eql, like, limit, lit, match_, node, opt, opt_clause, order_by, param, rel,
    return_, where_, Clause, Cypher, CypherBuilder, Direction, Entity, EntityKind, Expression,
    OptionGroup, OrderBy, OrderToken, Pattern, PendingRelationship, Selection,
};
pub use compile::{compile, compile_with, CompiledQuery};
pub use config::{CompileConfig, CompileConfigBuilder, ParamStyle};
pub use context::Context;
pub use cypher::CypherValue;
pub use error::{CypherError, ExecuteError, Result};
