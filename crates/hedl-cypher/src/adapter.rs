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

//! Dispatching compiled queries to a database adapter.
//!
//! The crate never talks to a database itself. An [`Adapter`] receives the
//! compiled text and parameter map; whatever it returns is handed back to the
//! caller untouched.

use std::collections::BTreeMap;
use std::convert::Infallible;
use tracing::debug;

use crate::ast::Cypher;
use crate::compile::compile_with;
use crate::config::CompileConfig;
use crate::context::Context;
use crate::cypher::CypherValue;
use crate::error::ExecuteError;

/// The single operation a database driver must provide.
pub trait Adapter {
    /// Driver-defined result of running a query.
    type Output;
    /// Driver-defined failure.
    type Error;

    /// Run `query` with `parameters`.
    fn execute(
        &mut self,
        query: &str,
        parameters: &BTreeMap<String, CypherValue>,
    ) -> Result<Self::Output, Self::Error>;
}

impl<A: Adapter + ?Sized> Adapter for &mut A {
    type Output = A::Output;
    type Error = A::Error;

    fn execute(
        &mut self,
        query: &str,
        parameters: &BTreeMap<String, CypherValue>,
    ) -> Result<Self::Output, Self::Error> {
        (**self).execute(query, parameters)
    }
}

fn dispatch<A: Adapter>(
    query: &Cypher,
    adapter: &mut A,
    ctx: &Context,
    config: &CompileConfig,
) -> Result<A::Output, ExecuteError<A::Error>> {
    let compiled = compile_with(query, ctx, config)?;
    debug!(
        query = %compiled.query,
        parameters = compiled.parameters.len(),
        "dispatching query to adapter"
    );
    adapter
        .execute(&compiled.query, &compiled.parameters)
        .map_err(ExecuteError::Adapter)
}

impl Cypher {
    /// Compile against `ctx` and run the result on `adapter`.
    ///
    /// Compilation errors are returned before the adapter is called.
    pub fn execute<A: Adapter>(
        &self,
        adapter: &mut A,
        ctx: &Context,
    ) -> Result<A::Output, ExecuteError<A::Error>> {
        dispatch(self, adapter, ctx, &CompileConfig::default())
    }

    /// Bind this template to an adapter for repeated execution.
    pub fn bind<'a, A: Adapter>(&'a self, adapter: &'a mut A) -> BoundQuery<'a, A> {
        BoundQuery {
            query: self,
            adapter,
            config: CompileConfig::default(),
        }
    }
}

/// A template bound to an adapter; each `execute` compiles afresh.
pub struct BoundQuery<'a, A> {
    query: &'a Cypher,
    adapter: &'a mut A,
    config: CompileConfig,
}

impl<'a, A: Adapter> BoundQuery<'a, A> {
    /// Use a custom compile configuration.
    pub fn with_config(mut self, config: CompileConfig) -> Self {
        self.config = config;
        self
    }

    /// Compile against `ctx` and run on the bound adapter.
    pub fn execute(&mut self, ctx: &Context) -> Result<A::Output, ExecuteError<A::Error>> {
        dispatch(self.query, self.adapter, ctx, &self.config)
    }

    /// Execute with an empty context: every option group takes its first variant.
    pub fn execute_default(&mut self) -> Result<A::Output, ExecuteError<A::Error>> {
        self.execute(&Context::new())
    }
}

/// One call received by a [`RecordingAdapter`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// The query text.
    pub query: String,
    /// The parameter map.
    pub parameters: BTreeMap<String, CypherValue>,
}

/// An adapter that records every call instead of running it.
///
/// Useful for tests, dry runs and logging pipelines.
#[derive(Debug, Default)]
pub struct RecordingAdapter {
    calls: Vec<RecordedCall>,
}

impl RecordingAdapter {
    /// Create an adapter with no recorded calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call in order.
    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// The most recent call.
    pub fn last(&self) -> Option<&RecordedCall> {
        self.calls.last()
    }
}

impl Adapter for RecordingAdapter {
    type Output = ();
    type Error = Infallible;

    fn execute(
        &mut self,
        query: &str,
        parameters: &BTreeMap<String, CypherValue>,
    ) -> Result<(), Infallible> {
        self.calls.push(RecordedCall {
            query: query.to_string(),
            parameters: parameters.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{eql, match_, node, param, return_, where_};
    use crate::error::CypherError;

    struct FailingAdapter;

    impl Adapter for FailingAdapter {
        type Output = ();
        type Error = String;

        fn execute(
            &mut self,
            _query: &str,
            _parameters: &BTreeMap<String, CypherValue>,
        ) -> Result<(), String> {
            Err("connection refused".to_string())
        }
    }

    #[test]
    fn test_execute_records_call() {
        let c = node("c");
        let query = Cypher::new([match_([&c]), return_([c.prop("name")])]);
        let mut adapter = RecordingAdapter::new();
        query.execute(&mut adapter, &Context::new()).unwrap();
        let call = adapter.last().unwrap();
        assert_eq!(call.query, "MATCH (c) RETURN c.name AS name");
        assert!(call.parameters.is_empty());
    }

    #[test]
    fn test_compile_error_skips_adapter() {
        let c = node("c");
        let query = Cypher::new([where_(eql(c.prop("a"), param("missing")))]);
        let mut adapter = RecordingAdapter::new();
        let err = query.execute(&mut adapter, &Context::new()).unwrap_err();
        assert!(matches!(
            err,
            ExecuteError::Compile(CypherError::UnboundParam(_))
        ));
        assert!(adapter.calls().is_empty());
    }

    #[test]
    fn test_adapter_error_passed_through() {
        let query = Cypher::empty();
        let err = query
            .execute(&mut FailingAdapter, &Context::new())
            .unwrap_err();
        assert!(matches!(err, ExecuteError::Adapter(ref msg) if msg == "connection refused"));
    }

    #[test]
    fn test_bound_query_reuse() {
        let c = node("c");
        let query = Cypher::new([match_([&c]), where_(eql(c.prop("name"), param("name")))]);
        let mut adapter = RecordingAdapter::new();
        {
            let mut bound = query.bind(&mut adapter);
            bound.execute(&Context::new().with("name", "a")).unwrap();
            bound.execute(&Context::new().with("name", "b")).unwrap();
        }
        let values: Vec<_> = adapter
            .calls()
            .iter()
            .map(|call| call.parameters["name"].clone())
            .collect();
        assert_eq!(values, [CypherValue::from("a"), CypherValue::from("b")]);
    }

    #[test]
    fn test_bound_query_with_config() {
        let c = node("c");
        let query = Cypher::new([where_(eql(c.prop("name"), param("name")))]);
        let mut adapter = RecordingAdapter::new();
        query
            .bind(&mut adapter)
            .with_config(CompileConfig::new().with_dollar_params())
            .execute(&Context::new().with("name", "x"))
            .unwrap();
        assert_eq!(adapter.last().unwrap().query, "WHERE c.name = $name");
    }
}
