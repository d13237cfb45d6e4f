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

//! Entities (node and relationship variables) and the patterns built from them.

use serde::{Deserialize, Serialize};

use super::expr::Expression;

/// Whether an entity stands for a node or a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    /// A graph node, rendered as `(name:Label)`.
    Node,
    /// A directed relationship, rendered as `-[name:TYPE]->`.
    Relationship,
}

/// A named node or relationship variable.
///
/// Entities are immutable once built; the `with_*` methods consume and
/// return the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    name: String,
    labels: Vec<String>,
    kind: EntityKind,
}

impl Entity {
    /// Create a node entity.
    pub fn node(name: impl Into<String>) -> Self {
        Self::new(name, EntityKind::Node)
    }

    /// Create a relationship entity.
    pub fn relationship(name: impl Into<String>) -> Self {
        Self::new(name, EntityKind::Relationship)
    }

    fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            labels: Vec::new(),
            kind,
        }
    }

    /// Add a label. Labels already present are ignored.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        if !self.labels.contains(&label) {
            self.labels.push(label);
        }
        self
    }

    /// Add several labels in order.
    pub fn with_labels<I, S>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        labels.into_iter().fold(self, |e, l| e.with_label(l))
    }

    /// The variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Labels in declaration order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Node or relationship.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Reference one of this entity's properties, e.g. `c.name`.
    pub fn prop(&self, property: impl Into<String>) -> Expression {
        Expression::Property {
            entity: self.name.clone(),
            property: property.into(),
        }
    }

    /// Bind the start node of this relationship.
    ///
    /// The result must be completed with [`PendingRelationship::to`]; used as
    /// a pattern on its own it fails to compile.
    pub fn from(&self, start: &Entity) -> PendingRelationship {
        PendingRelationship {
            rel: self.clone(),
            from: start.clone(),
        }
    }
}

/// Create a node entity.
pub fn node(name: impl Into<String>) -> Entity {
    Entity::node(name)
}

/// Create a relationship entity.
pub fn rel(name: impl Into<String>) -> Entity {
    Entity::relationship(name)
}

/// A relationship whose start node is bound but whose end node is not yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRelationship {
    rel: Entity,
    from: Entity,
}

impl PendingRelationship {
    /// Bind the end node, producing a complete path pattern.
    pub fn to(self, end: &Entity) -> Pattern {
        Pattern::Path {
            rel: self.rel,
            from: Some(self.from),
            to: Some(end.clone()),
        }
    }
}

/// One fragment of a MATCH clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pattern {
    /// An isolated node.
    Node(Entity),
    /// A directed relationship between two nodes.
    Path {
        /// The relationship variable.
        rel: Entity,
        /// Start node, if bound.
        from: Option<Entity>,
        /// End node, if bound.
        to: Option<Entity>,
    },
}

impl Pattern {
    /// Every entity mentioned by this pattern, start node first.
    pub fn entities(&self) -> Vec<&Entity> {
        match self {
            Pattern::Node(e) => vec![e],
            Pattern::Path { rel, from, to } => from
                .iter()
                .chain(std::iter::once(rel))
                .chain(to.iter())
                .collect(),
        }
    }
}

impl From<Entity> for Pattern {
    fn from(entity: Entity) -> Self {
        match entity.kind {
            EntityKind::Node => Pattern::Node(entity),
            EntityKind::Relationship => Pattern::Path {
                rel: entity,
                from: None,
                to: None,
            },
        }
    }
}

impl From<&Entity> for Pattern {
    fn from(entity: &Entity) -> Self {
        entity.clone().into()
    }
}

impl From<PendingRelationship> for Pattern {
    fn from(pending: PendingRelationship) -> Self {
        Pattern::Path {
            rel: pending.rel,
            from: Some(pending.from),
            to: None,
        }
    }
}
