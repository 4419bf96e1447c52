use crate::criteria::Criteria;
use crate::error::Result;
use crate::path::{PathExpression, Segment};
use crate::schema::PropertyType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Represents the different kinds of relationship joins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    #[default]
    Inner,
    LeftOuter,
    RightOuter,
    Full,
}

impl JoinKind {
    pub fn to_sql(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::LeftOuter => "LEFT OUTER JOIN",
            JoinKind::RightOuter => "RIGHT OUTER JOIN",
            JoinKind::Full => "FULL OUTER JOIN",
        }
    }
}

/// Index of a node inside a [`JoinTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JoinNodeId(usize);

impl JoinNodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One deduplicated relationship traversal
#[derive(Debug, Clone)]
pub struct JoinNode {
    pub property: String,
    pub declared: PropertyType,
    pub join_kind: JoinKind,
    pub alias: String,
    pub parent: Option<JoinNodeId>,
    children: HashMap<String, JoinNodeId>,
}

impl JoinNode {
    pub fn child(&self, property: &str) -> Option<JoinNodeId> {
        self.children.get(property).copied()
    }
}

/// Arena of join nodes for one compilation.
///
/// At most one child exists per `(parent, property)` pair, so every condition
/// that walks the same relationship shares its node and alias. Aliases are
/// numbered in the order joins are first registered.
#[derive(Debug, Clone)]
pub struct JoinTree {
    nodes: Vec<JoinNode>,
    alias_prefix: String,
    next_alias: usize,
}

impl JoinTree {
    pub const ROOT: JoinNodeId = JoinNodeId(0);

    pub fn new(root_entity: &str, root_alias: &str, alias_prefix: &str, join_kind: JoinKind) -> Self {
        let root = JoinNode {
            property: root_entity.to_string(),
            declared: PropertyType::Entity(root_entity.to_string()),
            join_kind,
            alias: root_alias.to_string(),
            parent: None,
            children: HashMap::new(),
        };

        Self {
            nodes: vec![root],
            alias_prefix: alias_prefix.to_string(),
            next_alias: 1,
        }
    }

    pub fn root(&self) -> &JoinNode {
        &self.nodes[Self::ROOT.0]
    }

    pub fn node(&self, id: JoinNodeId) -> &JoinNode {
        &self.nodes[id.0]
    }

    /// Number of nodes including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of joins registered with the engine
    pub fn join_count(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn child(&self, parent: JoinNodeId, property: &str) -> Option<JoinNodeId> {
        self.node(parent).child(property)
    }

    /// Aliases of every registered join, in allocation order
    pub fn aliases(&self) -> Vec<&str> {
        self.nodes[1..].iter().map(|n| n.alias.as_str()).collect()
    }

    /// Dotted property path from the root to `id`
    pub fn path_of(&self, id: JoinNodeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            if node.parent.is_some() {
                names.push(node.property.as_str());
            }
            current = node.parent;
        }
        names.reverse();
        names.join(".")
    }

    /// Reuse the child for `segment` under `parent`, or create it, allocate the
    /// next alias and register the join with the engine.
    pub fn get_or_join<C: Criteria + ?Sized>(
        &mut self,
        parent: JoinNodeId,
        segment: &Segment,
        criteria: &mut C,
    ) -> Result<JoinNodeId> {
        if let Some(existing) = self.child(parent, &segment.name) {
            return Ok(existing);
        }

        let join_kind = self.root().join_kind;
        let alias = format!("{}{}", self.alias_prefix, self.next_alias);
        let parent_alias = self.node(parent).alias.clone();

        criteria.create_sub_criteria(&parent_alias, &segment.name, &alias, join_kind)?;

        let id = JoinNodeId(self.nodes.len());
        self.nodes.push(JoinNode {
            property: segment.name.clone(),
            declared: segment.declared.clone(),
            join_kind,
            alias: alias.clone(),
            parent: Some(parent),
            children: HashMap::new(),
        });
        self.nodes[parent.0]
            .children
            .insert(segment.name.clone(), id);
        self.next_alias += 1;

        debug!(
            parent = %parent_alias,
            property = %segment.name,
            alias = %alias,
            kind = ?join_kind,
            "Registered join"
        );

        Ok(id)
    }

    /// Walk every non-terminal segment of `path`, joining as needed, and return
    /// the node that owns the terminal property
    pub fn resolve_parent<C: Criteria + ?Sized>(
        &mut self,
        path: &PathExpression,
        criteria: &mut C,
    ) -> Result<JoinNodeId> {
        path.navigation()
            .iter()
            .try_fold(Self::ROOT, |parent, segment| {
                self.get_or_join(parent, segment, criteria)
            })
    }
}
