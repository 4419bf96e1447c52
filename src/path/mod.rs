//! # Property Path Expressions
//!
//! Paths are captured structurally: an [`Expr`] records each property access
//! from the root entity, any widening conversion wrapped around it, and
//! aggregate (tuple) selections. [`PathParser`] strips the conversions and
//! resolves every segment against the schema, producing [`PathExpression`]s.
//!
//! ```rust
//! use fluent_criteria::path;
//! use fluent_criteria::path::Expr;
//!
//! let genre = path!(Book.Genre);
//! assert_eq!(genre, Expr::root().member("Book").member("Genre"));
//!
//! // Several columns at once
//! let columns = path!(Key, Name, Email);
//! assert!(matches!(columns, Expr::Tuple(ref items) if items.len() == 3));
//! ```

use crate::error::{CriteriaError, Result};
use crate::schema::{PropertyType, ScalarType, SchemaProvider};
use serde::Serialize;
use std::fmt;

/// Build an [`Expr`] from a dotted property chain, or a tuple of chains.
#[macro_export]
macro_rules! path {
    ($($segment:ident).+) => {
        $crate::path::Expr::root()$(.member(stringify!($segment)))+
    };
    ($($($segment:ident).+),+ $(,)?) => {
        $crate::path::Expr::tuple([$($crate::path!($($segment).+)),+])
    };
}

/// Structural property accessor rooted at the specification's entity
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Root,
    Member { owner: Box<Expr>, name: String },
    /// Widening conversion, e.g. comparing an `int32` column as `int64`
    Convert { operand: Box<Expr>, to: ScalarType },
    Tuple(Vec<Expr>),
}

impl Expr {
    pub fn root() -> Self {
        Expr::Root
    }

    pub fn member(self, name: impl Into<String>) -> Self {
        Expr::Member {
            owner: Box::new(self),
            name: name.into(),
        }
    }

    pub fn widen(self, to: ScalarType) -> Self {
        Expr::Convert {
            operand: Box::new(self),
            to,
        }
    }

    pub fn tuple(items: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Tuple(items.into_iter().collect())
    }

    fn strip_conversions(&self) -> &Expr {
        match self {
            Expr::Convert { operand, .. } => operand.strip_conversions(),
            other => other,
        }
    }

    fn collect_names(&self, names: &mut Vec<String>) -> Result<()> {
        match self {
            Expr::Root => Ok(()),
            Expr::Member { owner, name } => {
                owner.collect_names(names)?;
                names.push(name.clone());
                Ok(())
            }
            Expr::Convert { operand, .. } => operand.collect_names(names),
            Expr::Tuple(_) => Err(CriteriaError::UnsupportedExpression {
                reason: "tuple accessor nested inside a property chain".to_string(),
            }),
        }
    }
}

/// One resolved property access
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub name: String,
    pub declared: PropertyType,
}

/// Resolved chain of property names from the root entity to a leaf.
///
/// Every segment except the last is a relationship; the last may be anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathExpression {
    root: String,
    segments: Vec<Segment>,
}

impl PathExpression {
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn terminal(&self) -> &Segment {
        // Construction guarantees at least one segment
        &self.segments[self.segments.len() - 1]
    }

    /// Relationship segments walked before the terminal one
    pub fn navigation(&self) -> &[Segment] {
        &self.segments[..self.segments.len() - 1]
    }

    pub fn dotted(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.root, self.dotted())
    }
}

/// Resolves accessors into schema-checked paths
pub struct PathParser;

impl PathParser {
    /// Parse a single or aggregate accessor into one path per selected column
    pub fn parse(
        schema: &dyn SchemaProvider,
        root: &str,
        expr: &Expr,
    ) -> Result<Vec<PathExpression>> {
        match expr.strip_conversions() {
            Expr::Tuple(items) => items
                .iter()
                .map(|item| Self::parse_single(schema, root, item))
                .collect(),
            single => Ok(vec![Self::parse_single(schema, root, single)?]),
        }
    }

    /// Parse an accessor that must describe exactly one path
    pub fn parse_single(
        schema: &dyn SchemaProvider,
        root: &str,
        expr: &Expr,
    ) -> Result<PathExpression> {
        let mut names = Vec::new();
        expr.strip_conversions().collect_names(&mut names)?;

        if names.is_empty() {
            return Err(CriteriaError::UnsupportedExpression {
                reason: format!("accessor on '{root}' does not reference a property"),
            });
        }

        let mut current = root.to_string();
        let mut segments = Vec::with_capacity(names.len());
        let last = names.len() - 1;

        for (index, name) in names.into_iter().enumerate() {
            let property = schema.property(&current, &name)?;
            let declared = property.declared.clone();

            if index < last {
                current = match declared.target_entity() {
                    Some(target) => target.to_string(),
                    None => {
                        return Err(CriteriaError::NonNavigableSegment {
                            entity: current,
                            property: name,
                        })
                    }
                };
            }

            segments.push(Segment { name, declared });
        }

        Ok(PathExpression {
            root: root.to_string(),
            segments,
        })
    }
}
