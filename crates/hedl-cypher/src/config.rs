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

//! Configuration for query compilation.

use serde::{Deserialize, Serialize};

/// How parameter placeholders are written in the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParamStyle {
    /// Legacy `{name}` placeholders.
    #[default]
    Braces,
    /// `$name` placeholders, required by Neo4j 4 and later.
    Dollar,
}

impl ParamStyle {
    /// Render the placeholder for `name`.
    pub fn placeholder(self, name: &str) -> String {
        match self {
            ParamStyle::Braces => format!("{{{}}}", name),
            ParamStyle::Dollar => format!("${}", name),
        }
    }
}

/// Configuration for compiling query templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileConfig {
    /// Placeholder syntax for parameters (default: braces).
    pub param_style: ParamStyle,

    /// Give bare property projections in RETURN an alias equal to the
    /// property name, e.g. `c.name AS name` (default: true).
    pub implicit_return_alias: bool,

    /// Reject variable and parameter names that are not plain identifiers
    /// (default: true). When disabled, names are emitted verbatim.
    pub strict_identifiers: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            param_style: ParamStyle::Braces,
            implicit_return_alias: true,
            strict_identifiers: true,
        }
    }
}

impl CompileConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration.
    ///
    /// ```
    /// # use hedl_cypher::{CompileConfig, ParamStyle};
    /// let config = CompileConfig::builder()
    ///     .param_style(ParamStyle::Dollar)
    ///     .implicit_return_alias(false)
    ///     .build();
    /// assert!(config.strict_identifiers);
    /// ```
    pub fn builder() -> CompileConfigBuilder {
        CompileConfigBuilder::default()
    }

    /// Use `$name` parameter placeholders.
    pub fn with_dollar_params(mut self) -> Self {
        self.param_style = ParamStyle::Dollar;
        self
    }

    /// Set the parameter placeholder style.
    pub fn with_param_style(mut self, style: ParamStyle) -> Self {
        self.param_style = style;
        self
    }

    /// Render bare RETURN properties without an implicit alias.
    pub fn without_implicit_alias(mut self) -> Self {
        self.implicit_return_alias = false;
        self
    }

    /// Emit variable and parameter names without validation.
    pub fn with_lenient_identifiers(mut self) -> Self {
        self.strict_identifiers = false;
        self
    }
}

/// Builder for [`CompileConfig`]. Unset fields keep their defaults.
#[derive(Debug, Default)]
pub struct CompileConfigBuilder {
    param_style: Option<ParamStyle>,
    implicit_return_alias: Option<bool>,
    strict_identifiers: Option<bool>,
}

impl CompileConfigBuilder {
    /// Create a new builder with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the parameter placeholder style.
    pub fn param_style(mut self, style: ParamStyle) -> Self {
        self.param_style = Some(style);
        self
    }

    /// Set whether bare RETURN properties get an implicit alias.
    pub fn implicit_return_alias(mut self, enabled: bool) -> Self {
        self.implicit_return_alias = Some(enabled);
        self
    }

    /// Set whether names are validated as identifiers.
    pub fn strict_identifiers(mut self, strict: bool) -> Self {
        self.strict_identifiers = Some(strict);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> CompileConfig {
        let defaults = CompileConfig::default();
        CompileConfig {
            param_style: self.param_style.unwrap_or(defaults.param_style),
            implicit_return_alias: self
                .implicit_return_alias
                .unwrap_or(defaults.implicit_return_alias),
            strict_identifiers: self
                .strict_identifiers
                .unwrap_or(defaults.strict_identifiers),
        }
    }
}
