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

//! Example: one template, several execution contexts.
//!
//! Run with `RUST_LOG=hedl_cypher=trace cargo run -p hedl-cypher --example option_templates`
//! to see option resolution and dispatch logs.

use hedl_cypher::{
    eql, match_, node, opt, opt_clause, param, return_, where_, Adapter, CompileConfig, Context,
    Cypher, CypherValue,
};
use std::collections::BTreeMap;
use std::convert::Infallible;
use tracing_subscriber::EnvFilter;

/// Prints every query instead of sending it to a server.
struct StdoutAdapter;

impl Adapter for StdoutAdapter {
    type Output = ();
    type Error = Infallible;

    fn execute(
        &mut self,
        query: &str,
        parameters: &BTreeMap<String, CypherValue>,
    ) -> Result<(), Infallible> {
        println!("   query:  {}", query);
        println!("   params: {:?}", parameters);
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let c = node("c").with_label("Customer");

    // The same key vocabulary is used in WHERE and RETURN.
    let lookup = Cypher::new([
        match_([&c]),
        where_(opt([
            ("name", eql(c.prop("name"), param("name"))),
            ("thing", eql(c.prop("thing"), param("thing"))),
        ])?),
        return_([opt([("name", c.prop("name")), ("thing", c.prop("thing"))])?]),
    ]);

    println!("1. Lookup by name:");
    lookup.execute(&mut StdoutAdapter, &Context::new().with("name", "Testing Test"))?;

    println!("2. Lookup by thing:");
    lookup.execute(&mut StdoutAdapter, &Context::new().with("thing", 123))?;

    println!("3. Context loaded from JSON, $-style parameters:");
    let ctx = Context::from_json(r#"{"thing": 7, "unused": "dropped"}"#)?;
    lookup
        .bind(&mut StdoutAdapter)
        .with_config(CompileConfig::new().with_dollar_params())
        .execute(&ctx)?;

    println!("4. Clause-level option, empty context takes the first variant:");
    let projection = Cypher::new([
        match_([&c]),
        opt_clause([
            ("name", return_([c.prop("name")])),
            ("thing", return_([c.prop("thing")])),
        ])?,
    ]);
    projection.bind(&mut StdoutAdapter).execute_default()?;

    Ok(())
}
