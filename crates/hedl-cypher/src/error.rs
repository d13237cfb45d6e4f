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

//! Error types for building, compiling and executing Cypher templates.

use thiserror::Error;

/// Error type for query compilation.
#[derive(Debug, Error)]
pub enum CypherError {
    /// A relationship pattern is missing one of its endpoints.
    #[error("incomplete pattern: relationship '{name}' has no '{missing}' endpoint")]
    IncompletePattern {
        /// The relationship variable name.
        name: String,
        /// Which endpoint is unbound (`from` or `to`).
        missing: &'static str,
    },

    /// An option group was declared without any variants.
    #[error("option group declared with no variants")]
    EmptyOptionGroup,

    /// A parameter referenced by the query is absent from the execution context.
    #[error("unbound parameter '{0}'")]
    UnboundParam(String),

    /// Two different entities share the same variable name.
    #[error("duplicate entity name '{0}'")]
    DuplicateEntityName(String),

    /// A pattern combines entities of the wrong kind.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// A clause that needs at least one item has none.
    #[error("{0} clause has no items")]
    EmptyClause(&'static str),

    /// An ORDER BY token sequence is malformed.
    #[error("invalid ORDER BY: {0}")]
    InvalidOrderBy(String),

    /// A variable name is not a valid Cypher identifier.
    #[error("invalid Cypher identifier: '{0}'")]
    InvalidIdentifier(String),

    /// Serialization error from serde_json.
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for query compilation.
pub type Result<T> = std::result::Result<T, CypherError>;

/// Error returned when executing a query through an adapter.
///
/// Compilation errors are carried unchanged; the adapter is never invoked
/// when compilation fails.
#[derive(Debug, Error)]
pub enum ExecuteError<E> {
    /// The query failed to compile against the supplied context.
    #[error(transparent)]
    Compile(#[from] CypherError),

    /// The adapter rejected the compiled query.
    #[error("adapter error: {0}")]
    Adapter(E),
}
