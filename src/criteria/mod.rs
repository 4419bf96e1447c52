//! # Criteria Engine Surface
//!
//! Capabilities the compiler needs from an execution engine, and the
//! predicate/ordering/projection terms it issues against a criteria handle.
//!
//! ## Key Components
//!
//! - [`Predicate`] - Engine-level predicate terms, rendered with [`Predicate::to_sql`]
//! - [`Criteria`] - Mutable handle that joins, predicates and projections attach to
//! - [`CriteriaEngine`] - Creates root handles and executes them
//! - [`CompiledQuery`] - Recording handle used for inspection, tests and SQL rendering
//! - [`Row`] - Ordered column/value row returned by an engine

pub mod compiled;

pub use compiled::{CompiledQuery, JoinInstruction};

use crate::error::{CriteriaError, Result};
use crate::query_builder::JoinKind;
use crate::schema::EntityType;
use crate::value::Value;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// Ordered comparison operators; operands are passed through unconverted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOp {
    Gt,
    Ge,
    Lt,
    Le,
}

impl ComparisonOp {
    pub fn to_sql(&self) -> &'static str {
        match self {
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
        }
    }
}

/// A predicate term attached to a criteria handle.
///
/// Property references are qualified with the alias of the join that owns
/// them, e.g. `alias_1.Name`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    Eq {
        property: String,
        value: Value,
    },
    Not {
        term: Box<Predicate>,
    },
    In {
        property: String,
        values: Vec<Value>,
    },
    Between {
        property: String,
        low: Value,
        high: Value,
    },
    IsNull {
        property: String,
    },
    IsNotNull {
        property: String,
    },
    Like {
        property: String,
        pattern: Value,
    },
    Compare {
        property: String,
        op: ComparisonOp,
        value: Value,
    },
    And {
        terms: Vec<Predicate>,
    },
    Or {
        terms: Vec<Predicate>,
    },
}

impl Predicate {
    pub fn eq(property: impl Into<String>, value: Value) -> Self {
        Predicate::Eq {
            property: property.into(),
            value,
        }
    }

    pub fn not(term: Predicate) -> Self {
        Predicate::Not {
            term: Box::new(term),
        }
    }

    pub fn is_in(property: impl Into<String>, values: Vec<Value>) -> Self {
        Predicate::In {
            property: property.into(),
            values,
        }
    }

    pub fn between(property: impl Into<String>, low: Value, high: Value) -> Self {
        Predicate::Between {
            property: property.into(),
            low,
            high,
        }
    }

    pub fn is_null(property: impl Into<String>) -> Self {
        Predicate::IsNull {
            property: property.into(),
        }
    }

    pub fn is_not_null(property: impl Into<String>) -> Self {
        Predicate::IsNotNull {
            property: property.into(),
        }
    }

    pub fn like(property: impl Into<String>, pattern: Value) -> Self {
        Predicate::Like {
            property: property.into(),
            pattern,
        }
    }

    pub fn compare(property: impl Into<String>, op: ComparisonOp, value: Value) -> Self {
        Predicate::Compare {
            property: property.into(),
            op,
            value,
        }
    }

    pub fn and(terms: Vec<Predicate>) -> Self {
        Predicate::And { terms }
    }

    pub fn or(terms: Vec<Predicate>) -> Self {
        Predicate::Or { terms }
    }

    /// Number of leaf terms, counting through conjunctions and disjunctions
    pub fn term_count(&self) -> usize {
        match self {
            Predicate::And { terms } | Predicate::Or { terms } => {
                terms.iter().map(Predicate::term_count).sum()
            }
            Predicate::Not { term } => term.term_count(),
            _ => 1,
        }
    }

    /// Convert predicate to SQL string
    pub fn to_sql(&self) -> String {
        match self {
            Predicate::Eq { property, value } => match value {
                Value::Null => format!("{property} IS NULL"),
                _ => format!("{} = {}", property, format_value(value)),
            },
            Predicate::Not { term } => format!("NOT ({})", term.to_sql()),
            Predicate::In { property, values } => {
                let value_list = values
                    .iter()
                    .map(format_value)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{property} IN ({value_list})")
            }
            Predicate::Between {
                property,
                low,
                high,
            } => {
                format!(
                    "{} BETWEEN {} AND {}",
                    property,
                    format_value(low),
                    format_value(high)
                )
            }
            Predicate::IsNull { property } => format!("{property} IS NULL"),
            Predicate::IsNotNull { property } => format!("{property} IS NOT NULL"),
            Predicate::Like { property, pattern } => {
                format!("{} LIKE {}", property, format_value(pattern))
            }
            Predicate::Compare {
                property,
                op,
                value,
            } => format!("{} {} {}", property, op.to_sql(), format_value(value)),
            Predicate::And { terms } => join_terms(terms, " AND "),
            Predicate::Or { terms } => join_terms(terms, " OR "),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

fn join_terms(terms: &[Predicate], operator: &str) -> String {
    match terms {
        [] => String::new(),
        [single] => single.to_sql(),
        _ => {
            let sqls: Vec<String> = terms.iter().map(Predicate::to_sql).collect();
            format!("({})", sqls.join(operator))
        }
    }
}

/// Format an operand for SQL
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(_) | Value::Int32(_) | Value::Int64(_) | Value::Float64(_) | Value::Decimal(_) => {
            value.to_string()
        }
        other => format!("'{}'", other.to_string().replace('\'', "''")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

/// Ordering instruction on an alias-qualified property
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub property: String,
    pub direction: OrderDirection,
}

impl Order {
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: OrderDirection::Asc,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: OrderDirection::Desc,
        }
    }

    pub fn to_sql(&self) -> String {
        format!("{} {}", self.property, self.direction.to_sql())
    }
}

/// One projected column and the name it is returned under
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    pub property: String,
    pub alias: String,
}

impl Projection {
    pub fn new(property: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            alias: alias.into(),
        }
    }

    pub fn to_sql(&self) -> String {
        format!("{} AS {}", self.property, self.alias)
    }
}

/// A result row as ordered `(column, value)` pairs
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column insertion; a repeated column replaces the old value
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.columns.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .columns
            .iter()
            .map(|(name, value)| {
                let json = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
                (name.clone(), json)
            })
            .collect();
        serde_json::Value::Object(map)
    }

    /// Map the row onto `T` by column name
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.to_json()).map_err(|e| CriteriaError::ResultMapping {
            target: std::any::type_name::<T>().to_string(),
            message: e.to_string(),
        })
    }
}

/// Mutable query-building handle owned by an execution engine.
///
/// The compiler issues every join, predicate, ordering, projection and
/// pagination instruction through this trait. Property references passed in
/// are qualified with the alias of the join that owns them.
pub trait Criteria {
    fn root_alias(&self) -> &str;

    /// Join `property` of the entity aliased `parent_alias` under `alias`
    fn create_sub_criteria(
        &mut self,
        parent_alias: &str,
        property: &str,
        alias: &str,
        kind: JoinKind,
    ) -> Result<()>;

    fn add_predicate(&mut self, predicate: Predicate) -> Result<()>;

    fn add_order(&mut self, order: Order) -> Result<()>;

    fn set_offset(&mut self, offset: u64) -> Result<()>;

    fn set_limit(&mut self, limit: u64) -> Result<()>;

    fn set_projection(&mut self, projections: Vec<Projection>) -> Result<()>;

    /// Shape projected rows as the named result type
    fn bind_result_type(&mut self, target: &str) -> Result<()>;
}

/// Execution engine that owns criteria handles and runs them
pub trait CriteriaEngine {
    type Handle: Criteria;

    fn create_root_criteria(&self, entity: &EntityType, alias: &str) -> Result<Self::Handle>;

    fn list(&self, handle: Self::Handle) -> Result<Vec<Row>>;

    fn count(&self, handle: Self::Handle) -> Result<u64>;
}
