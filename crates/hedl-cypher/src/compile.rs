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

//! Compilation of query templates into Cypher text and parameters.
//!
//! Compilation is a pure function of the template, the execution context and
//! the configuration. Option groups are resolved as they are reached, and
//! only parameters that end up in the rendered text are collected.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::ast::{Clause, Cypher, Entity, EntityKind, Expression, Pattern};
use crate::config::{CompileConfig, ParamStyle};
use crate::context::Context;
use crate::cypher::{
    escape_identifier, escape_label, is_valid_identifier, quote_string, validate_identifier,
    CypherValue,
};
use crate::error::{CypherError, Result};

/// A compiled query: Cypher text plus the parameters it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledQuery {
    /// The Cypher query text.
    pub query: String,
    /// Parameters referenced by the query, with their context values.
    pub parameters: BTreeMap<String, CypherValue>,
    /// Placeholder syntax used in `query`.
    pub param_style: ParamStyle,
}

impl CompiledQuery {
    /// Check if this query has parameters.
    pub fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }

    /// Render the query with parameter values inlined as literals.
    ///
    /// Use this only for logging or for drivers without parameter support.
    /// The text is scanned once: placeholders inside string literals or
    /// backticked names are left alone, and substituted values are never
    /// scanned again.
    pub fn render_inline(&self) -> String {
        let mut out = String::with_capacity(self.query.len());
        let mut rest = self.query.as_str();

        while let Some(ch) = rest.chars().next() {
            let consumed = match ch {
                '"' | '`' => {
                    let len = quoted_len(rest, ch);
                    out.push_str(&rest[..len]);
                    len
                }
                _ => match self.placeholder_at(rest) {
                    Some((value, len)) => {
                        out.push_str(&value.to_cypher_literal());
                        len
                    }
                    None => {
                        out.push(ch);
                        ch.len_utf8()
                    }
                },
            };
            rest = &rest[consumed..];
        }
        out
    }

    /// The bound value and byte length of a placeholder at the start of `text`.
    fn placeholder_at(&self, text: &str) -> Option<(&CypherValue, usize)> {
        let (name, len) = match self.param_style {
            ParamStyle::Braces => {
                let body = text.strip_prefix('{')?;
                let name = &body[..identifier_len(body)];
                body[name.len()..].strip_prefix('}')?;
                (name, name.len() + 2)
            }
            ParamStyle::Dollar => {
                let body = text.strip_prefix('$')?;
                let name = &body[..identifier_len(body)];
                (name, name.len() + 1)
            }
        };
        if name.is_empty() {
            return None;
        }
        self.parameters.get(name).map(|value| (value, len))
    }

    /// Serialize the parameter map as a JSON object.
    pub fn parameters_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.parameters)?)
    }
}

/// Byte length of the leading run of identifier characters.
fn identifier_len(text: &str) -> usize {
    text.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len())
}

/// Byte length of the quoted section opening `text`, closing quote included.
///
/// Double-quoted literals use backslash escapes; backticked names escape a
/// backtick by doubling it. An unterminated section runs to the end.
fn quoted_len(text: &str, quote: char) -> usize {
    let mut chars = text.char_indices().skip(1).peekable();
    while let Some((i, ch)) = chars.next() {
        if quote == '"' && ch == '\\' {
            chars.next();
        } else if ch == quote {
            if quote == '`' && matches!(chars.peek(), Some((_, '`'))) {
                chars.next();
            } else {
                return i + ch.len_utf8();
            }
        }
    }
    text.len()
}

/// Compile `query` against `ctx` with the default configuration.
pub fn compile(query: &Cypher, ctx: &Context) -> Result<CompiledQuery> {
    compile_with(query, ctx, &CompileConfig::default())
}

/// Compile `query` against `ctx`.
pub fn compile_with(query: &Cypher, ctx: &Context, config: &CompileConfig) -> Result<CompiledQuery> {
    let mut renderer = Renderer::new(ctx, config);
    let mut parts = Vec::with_capacity(query.clauses().len());
    for clause in query.clauses() {
        parts.push(renderer.clause(clause)?);
    }

    let compiled = CompiledQuery {
        query: parts.join(" "),
        parameters: renderer.parameters,
        param_style: config.param_style,
    };
    debug!(
        clauses = parts.len(),
        parameters = compiled.parameters.len(),
        "compiled Cypher query"
    );
    Ok(compiled)
}

impl Cypher {
    /// Compile this template against `ctx` with the default configuration.
    pub fn compile(&self, ctx: &Context) -> Result<CompiledQuery> {
        compile(self, ctx)
    }

    /// Compile this template against `ctx` with a custom configuration.
    pub fn compile_with(&self, ctx: &Context, config: &CompileConfig) -> Result<CompiledQuery> {
        compile_with(self, ctx, config)
    }
}

fn expression_kind(expr: &Expression) -> &'static str {
    match expr {
        Expression::Property { .. } => "a property",
        Expression::Literal(_) => "a literal",
        Expression::Param(_) => "a parameter",
        Expression::Alias { .. } => "an aliased expression",
        Expression::Eq(..) => "an equality",
        Expression::Like(..) => "a LIKE predicate",
        Expression::And(_) => "a conjunction",
        Expression::Opt(_) => "an option group",
    }
}

/// Per-compilation state.
struct Renderer<'a> {
    ctx: &'a Context,
    config: &'a CompileConfig,
    parameters: BTreeMap<String, CypherValue>,
    entities: BTreeMap<&'a str, &'a Entity>,
}

impl<'a> Renderer<'a> {
    fn new(ctx: &'a Context, config: &'a CompileConfig) -> Self {
        Self {
            ctx,
            config,
            parameters: BTreeMap::new(),
            entities: BTreeMap::new(),
        }
    }

    fn clause(&mut self, clause: &'a Clause) -> Result<String> {
        match clause {
            Clause::Match(patterns) => {
                if patterns.is_empty() {
                    return Err(CypherError::EmptyClause("MATCH"));
                }
                let rendered = patterns
                    .iter()
                    .map(|p| self.pattern(p))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("MATCH {}", rendered.join(", ")))
            }
            Clause::Where(predicate) => Ok(format!("WHERE {}", self.expr(predicate)?)),
            Clause::Return(projections) => {
                if projections.is_empty() {
                    return Err(CypherError::EmptyClause("RETURN"));
                }
                let rendered = projections
                    .iter()
                    .map(|p| self.projection(p))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("RETURN {}", rendered.join(", ")))
            }
            Clause::OrderBy(order) => {
                let keys = order.sort_keys()?;
                if keys.is_empty() {
                    return Err(CypherError::EmptyClause("ORDER BY"));
                }
                let mut rendered = Vec::with_capacity(keys.len());
                for (field, direction) in keys {
                    let field = self.sort_field(field)?;
                    rendered.push(match direction {
                        Some(d) => format!("{} {}", field, d.token()),
                        None => field,
                    });
                }
                Ok(format!("ORDER BY {}", rendered.join(", ")))
            }
            Clause::Limit(n) => Ok(format!("LIMIT {}", n)),
            Clause::Opt(group) => self.clause(group.resolve(self.ctx)),
        }
    }

    fn pattern(&mut self, pattern: &'a Pattern) -> Result<String> {
        match pattern {
            Pattern::Node(node) => self.node(node),
            Pattern::Path { rel, from, to } => {
                if rel.kind() != EntityKind::Relationship {
                    return Err(CypherError::InvalidPattern(format!(
                        "'{}' is a node, not a relationship",
                        rel.name()
                    )));
                }
                let from = from.as_ref().ok_or_else(|| CypherError::IncompletePattern {
                    name: rel.name().to_string(),
                    missing: "from",
                })?;
                let to = to.as_ref().ok_or_else(|| CypherError::IncompletePattern {
                    name: rel.name().to_string(),
                    missing: "to",
                })?;

                let from = self.node(from)?;
                let rel = self.entity(rel)?;
                let to = self.node(to)?;
                Ok(format!("{}-[{}]->{}", from, rel, to))
            }
        }
    }

    fn node(&mut self, node: &'a Entity) -> Result<String> {
        if node.kind() != EntityKind::Node {
            return Err(CypherError::InvalidPattern(format!(
                "'{}' is a relationship, not a node",
                node.name()
            )));
        }
        Ok(format!("({})", self.entity(node)?))
    }

    /// Register `entity` and render `name:Label...` without delimiters.
    fn entity(&mut self, entity: &'a Entity) -> Result<String> {
        match self.entities.get(entity.name()) {
            Some(existing) if *existing != entity => {
                return Err(CypherError::DuplicateEntityName(entity.name().to_string()))
            }
            Some(_) => {}
            None => {
                self.variable(entity.name())?;
                self.entities.insert(entity.name(), entity);
            }
        }

        let labels: String = entity.labels().iter().map(|l| escape_label(l)).collect();
        Ok(format!("{}{}", entity.name(), labels))
    }

    fn variable(&self, name: &str) -> Result<()> {
        if self.config.strict_identifiers {
            validate_identifier(name)?;
        }
        Ok(())
    }

    /// A RETURN item. Bare properties get an implicit alias when configured.
    fn projection(&mut self, expr: &'a Expression) -> Result<String> {
        match self.resolve(expr) {
            Expression::Property { property, .. } if self.config.implicit_return_alias => {
                let rendered = self.expr(expr)?;
                Ok(format!("{} AS {}", rendered, escape_identifier(property)))
            }
            _ => self.expr(expr),
        }
    }

    /// An ORDER BY field: a property, parameter or literal after option resolution.
    fn sort_field(&mut self, expr: &'a Expression) -> Result<String> {
        match self.resolve(expr) {
            field @ (Expression::Property { .. }
            | Expression::Param(_)
            | Expression::Literal(_)) => self.expr(field),
            other => Err(CypherError::InvalidOrderBy(format!(
                "cannot sort by {}",
                expression_kind(other)
            ))),
        }
    }

    /// Follow option groups until a concrete expression is reached.
    fn resolve(&self, mut expr: &'a Expression) -> &'a Expression {
        while let Expression::Opt(group) = expr {
            expr = group.resolve(self.ctx);
        }
        expr
    }

    fn expr(&mut self, expr: &'a Expression) -> Result<String> {
        match expr {
            Expression::Property { entity, property } => {
                self.variable(entity)?;
                Ok(format!("{}.{}", entity, escape_identifier(property)))
            }
            Expression::Literal(value) => Ok(value.to_cypher_literal()),
            Expression::Param(name) => self.param(name),
            Expression::Alias { inner, name } => Ok(format!(
                "{} AS {}",
                self.expr(inner)?,
                escape_identifier(name)
            )),
            Expression::Eq(left, right) => {
                Ok(format!("{} = {}", self.expr(left)?, self.expr(right)?))
            }
            Expression::Like(left, pattern) => {
                Ok(format!("{} LIKE {}", self.expr(left)?, quote_string(pattern)))
            }
            Expression::And(operands) => {
                if operands.is_empty() {
                    return Ok("true".to_string());
                }
                let rendered = operands
                    .iter()
                    .map(|op| self.expr(op))
                    .collect::<Result<Vec<_>>>()?;
                Ok(rendered.join(" AND "))
            }
            Expression::Opt(group) => self.expr(group.resolve(self.ctx)),
        }
    }

    fn param(&mut self, name: &str) -> Result<String> {
        if self.config.strict_identifiers && !is_valid_identifier(name) {
            return Err(CypherError::InvalidIdentifier(name.to_string()));
        }
        let value = self
            .ctx
            .get(name)
            .ok_or_else(|| CypherError::UnboundParam(name.to_string()))?;
        self.parameters.insert(name.to_string(), value.clone());
        Ok(self.config.param_style.placeholder(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        alias, and, eql, like, limit, lit, match_, node, opt, opt_clause, order_by, param, rel,
        return_, where_,
    };

    fn compile_default(query: &Cypher, ctx: &Context) -> CompiledQuery {
        compile(query, ctx).unwrap()
    }

    #[test]
    fn test_empty_query() {
        let compiled = compile_default(&Cypher::empty(), &Context::new());
        assert_eq!(compiled.query, "");
        assert!(compiled.parameters.is_empty());
    }

    #[test]
    fn test_node_labels() {
        let c = node("c").with_labels(["what", "other"]);
        let query = Cypher::new([match_([&c])]);
        assert_eq!(compile_default(&query, &Context::new()).query, "MATCH (c:what:other)");
    }

    #[test]
    fn test_clause_order_is_declaration_order() {
        let c = node("c");
        let query = Cypher::new([limit(5), return_([c.prop("name")]), match_([&c])]);
        assert_eq!(
            compile_default(&query, &Context::new()).query,
            "LIMIT 5 RETURN c.name AS name MATCH (c)"
        );
    }

    #[test]
    fn test_literal_right_hand_side() {
        let c = node("c");
        let query = Cypher::new([
            match_([&c]),
            where_(eql(c.prop("age"), lit(42))),
        ]);
        assert_eq!(
            compile_default(&query, &Context::new()).query,
            "MATCH (c) WHERE c.age = 42"
        );
    }

    #[test]
    fn test_unbound_param() {
        let c = node("c");
        let query = Cypher::new([where_(eql(c.prop("a"), param("missing")))]);
        assert!(matches!(
            compile(&query, &Context::new()),
            Err(CypherError::UnboundParam(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_null_param_is_bound() {
        let c = node("c");
        let query = Cypher::new([where_(eql(c.prop("a"), param("p")))]);
        let ctx = Context::new().with("p", CypherValue::Null);
        let compiled = compile_default(&query, &ctx);
        assert_eq!(compiled.parameters["p"], CypherValue::Null);
    }

    #[test]
    fn test_repeated_param_registered_once() {
        let c = node("c");
        let query = Cypher::new([where_(and([
            eql(c.prop("a"), param("p")),
            eql(c.prop("b"), param("p")),
        ]))]);
        let compiled = compile_default(&query, &Context::new().with("p", 1i64));
        assert_eq!(compiled.query, "WHERE c.a = {p} AND c.b = {p}");
        assert_eq!(compiled.parameters.len(), 1);
    }

    #[test]
    fn test_incomplete_relationships() {
        let c = node("c");
        let r = rel("r");
        let missing_to = Cypher::new([match_([r.from(&c)])]);
        assert!(matches!(
            compile(&missing_to, &Context::new()),
            Err(CypherError::IncompletePattern { missing: "to", .. })
        ));
        let bare = Cypher::new([match_([&r])]);
        assert!(matches!(
            compile(&bare, &Context::new()),
            Err(CypherError::IncompletePattern { missing: "from", .. })
        ));
    }

    #[test]
    fn test_wrong_entity_kinds() {
        let c = node("c");
        let n = node("n");
        let r = rel("r");
        let node_as_rel = Cypher::new([match_([c.from(&n).to(&n)])]);
        assert!(matches!(
            compile(&node_as_rel, &Context::new()),
            Err(CypherError::InvalidPattern(_))
        ));
        let rel_as_endpoint = Cypher::new([match_([r.from(&r).to(&n)])]);
        assert!(matches!(
            compile(&rel_as_endpoint, &Context::new()),
            Err(CypherError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_duplicate_entity_names() {
        let a = node("x").with_label("A");
        let b = node("x").with_label("B");
        let query = Cypher::new([match_([&a, &b])]);
        assert!(matches!(
            compile(&query, &Context::new()),
            Err(CypherError::DuplicateEntityName(name)) if name == "x"
        ));

        let as_rel = rel("x");
        let n = node("n");
        let query = Cypher::new([
            match_([&n]),
            match_([as_rel.from(&n).to(&node("x"))]),
        ]);
        assert!(matches!(
            compile(&query, &Context::new()),
            Err(CypherError::DuplicateEntityName(_))
        ));
    }

    #[test]
    fn test_shared_variable_is_not_duplicate() {
        let c = node("c");
        let n = node("n");
        let r = rel("r");
        let query = Cypher::new([match_([r.from(&c).to(&n), (&c).into()])]);
        assert_eq!(
            compile_default(&query, &Context::new()).query,
            "MATCH (c)-[r]->(n), (c)"
        );
    }

    #[test]
    fn test_strict_identifiers() {
        let bad = node("1c");
        let query = Cypher::new([match_([&bad])]);
        assert!(matches!(
            compile(&query, &Context::new()),
            Err(CypherError::InvalidIdentifier(_))
        ));
        let lenient = CompileConfig::new().with_lenient_identifiers();
        assert_eq!(
            compile_with(&query, &Context::new(), &lenient).unwrap().query,
            "MATCH (1c)"
        );
    }

    #[test]
    fn test_escaped_labels_and_properties() {
        let c = node("c").with_label("Two Words");
        let query = Cypher::new([match_([&c]), return_([c.prop("order")])]);
        assert_eq!(
            compile_default(&query, &Context::new()).query,
            "MATCH (c:`Two Words`) RETURN c.`order` AS `order`"
        );
    }

    #[test]
    fn test_empty_clauses_rejected() {
        let empty_match = Cypher::new([match_(Vec::<Pattern>::new())]);
        assert!(matches!(
            compile(&empty_match, &Context::new()),
            Err(CypherError::EmptyClause("MATCH"))
        ));
        let empty_return = Cypher::new([return_(Vec::<Expression>::new())]);
        assert!(matches!(
            compile(&empty_return, &Context::new()),
            Err(CypherError::EmptyClause("RETURN"))
        ));
        let empty_order = Cypher::new([order_by()]);
        assert!(matches!(
            compile(&empty_order, &Context::new()),
            Err(CypherError::EmptyClause("ORDER BY"))
        ));
    }

    #[test]
    fn test_nested_options_resolve_recursively() {
        let c = node("c");
        let inner = opt_clause([
            ("thing", return_([c.prop("thing")])),
            ("other", return_([c.prop("other")])),
        ])
        .unwrap();
        let query = Cypher::new([
            match_([&c]),
            opt_clause([("name", return_([c.prop("name")])), ("nested", inner)]).unwrap(),
        ]);
        let ctx = Context::new().with("nested", true).with("other", true);
        assert_eq!(
            compile_default(&query, &ctx).query,
            "MATCH (c) RETURN c.other AS other"
        );
    }

    #[test]
    fn test_option_inside_and() {
        let c = node("c");
        let choice = opt([
            ("name", eql(c.prop("name"), param("name"))),
            ("thing", eql(c.prop("thing"), param("thing"))),
        ])
        .unwrap();
        let query = Cypher::new([where_(and([choice, eql(c.prop("x"), lit(true))]))]);
        let compiled = compile_default(&query, &Context::new().with("thing", 1i64));
        assert_eq!(compiled.query, "WHERE c.thing = {thing} AND c.x = true");
        assert_eq!(compiled.parameters.keys().collect::<Vec<_>>(), ["thing"]);
    }

    #[test]
    fn test_dollar_params_and_render_inline() {
        let c = node("c");
        let query = Cypher::new([where_(and([
            eql(c.prop("a"), param("thing")),
            eql(c.prop("b"), param("things")),
        ]))]);
        let ctx = Context::new().with("thing", "x").with("things", 2i64);
        let config = CompileConfig::new().with_dollar_params();
        let compiled = compile_with(&query, &ctx, &config).unwrap();
        assert_eq!(compiled.query, "WHERE c.a = $thing AND c.b = $things");
        assert_eq!(compiled.render_inline(), "WHERE c.a = \"x\" AND c.b = 2");
    }

    #[test]
    fn test_parameters_json() {
        let c = node("c");
        let query = Cypher::new([where_(eql(c.prop("a"), param("thing")))]);
        let compiled = compile_default(&query, &Context::new().with("thing", 123i64));
        assert_eq!(compiled.parameters_json().unwrap(), r#"{"thing":123}"#);
        assert!(compiled.has_parameters());
    }

    #[test]
    fn test_order_by_directions() {
        let c = node("c");
        let query = Cypher::new([order_by()
            .field(c.prop("a"))
            .asc()
            .field(c.prop("b"))
            .field(c.prop("c"))
            .desc()]);
        assert_eq!(
            compile_default(&query, &Context::new()).query,
            "ORDER BY c.a asc, c.b, c.c desc"
        );
    }

    #[test]
    fn test_render_inline_skips_string_literals() {
        let c = node("c");
        let query = Cypher::new([where_(and([
            eql(c.prop("a"), param("p")),
            like(c.prop("b"), "{p}%"),
        ]))]);
        let compiled = compile_default(&query, &Context::new().with("p", "x"));
        assert_eq!(compiled.query, "WHERE c.a = {p} AND c.b LIKE \"{p}%\"");
        assert_eq!(
            compiled.render_inline(),
            "WHERE c.a = \"x\" AND c.b LIKE \"{p}%\""
        );
    }

    #[test]
    fn test_render_inline_does_not_rescan_values() {
        let c = node("c");
        let query = Cypher::new([where_(and([
            eql(c.prop("a"), param("a")),
            eql(c.prop("b"), param("bb")),
        ]))]);
        let ctx = Context::new().with("a", "A").with("bb", "{a}");
        let compiled = compile_default(&query, &ctx);
        assert_eq!(
            compiled.render_inline(),
            "WHERE c.a = \"A\" AND c.b = \"{a}\""
        );
    }

    #[test]
    fn test_render_inline_escaped_quotes_and_backticks() {
        let c = node("c").with_label("odd {p} label");
        let query = Cypher::new([
            match_([&c]),
            where_(and([
                like(c.prop("b"), "say \"{p}\""),
                eql(c.prop("a"), param("p")),
            ])),
        ]);
        let compiled = compile_default(&query, &Context::new().with("p", 1i64));
        assert_eq!(
            compiled.render_inline(),
            "MATCH (c:`odd {p} label`) WHERE c.b LIKE \"say \\\"{p}\\\"\" AND c.a = 1"
        );
    }

    #[test]
    fn test_render_inline_dollar_literal_untouched() {
        let c = node("c");
        let query = Cypher::new([where_(and([
            eql(c.prop("a"), param("p")),
            like(c.prop("b"), "$p"),
        ]))]);
        let config = CompileConfig::new().with_dollar_params();
        let compiled = compile_with(&query, &Context::new().with("p", true), &config).unwrap();
        assert_eq!(
            compiled.render_inline(),
            "WHERE c.a = true AND c.b LIKE \"$p\""
        );
    }

    #[test]
    fn test_order_by_rejects_non_sortable_fields() {
        let c = node("c");
        for field in [
            alias(c.prop("x"), "y"),
            eql(c.prop("x"), lit(1)),
            and([eql(c.prop("x"), lit(1))]),
        ] {
            let query = Cypher::new([order_by().field(field).desc()]);
            assert!(matches!(
                compile(&query, &Context::new()),
                Err(CypherError::InvalidOrderBy(_))
            ));
        }
    }

    #[test]
    fn test_order_by_option_resolves_to_property() {
        let c = node("c");
        let field = opt([
            ("name", c.prop("name")),
            ("bad", alias(c.prop("x"), "y")),
        ])
        .unwrap();
        let query = Cypher::new([order_by().field(field).desc()]);
        assert_eq!(
            compile_default(&query, &Context::new()).query,
            "ORDER BY c.name desc"
        );
        assert!(matches!(
            compile(&query, &Context::new().with("bad", true)),
            Err(CypherError::InvalidOrderBy(_))
        ));
    }
}
