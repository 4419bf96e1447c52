use crate::error::{CriteriaError, Result};
use crate::path::PathExpression;
use crate::schema::PropertyType;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the kinds of conditions a specification can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredicateKind {
    Equal,
    NotEqual,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    Between,
    Like,
    NotLike,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    Fetch,
    OrderAsc,
    OrderDesc,
    Select,
    Skip,
    Take,
}

/// How many operands a condition kind carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    None,
    One,
    Two,
    Many,
}

impl PredicateKind {
    /// Kinds that become predicate terms in a disjunction
    pub fn is_filter(self) -> bool {
        !matches!(
            self,
            PredicateKind::Fetch
                | PredicateKind::OrderAsc
                | PredicateKind::OrderDesc
                | PredicateKind::Select
                | PredicateKind::Skip
                | PredicateKind::Take
        )
    }

    pub fn is_ordering(self) -> bool {
        matches!(self, PredicateKind::OrderAsc | PredicateKind::OrderDesc)
    }

    pub fn is_pagination(self) -> bool {
        matches!(self, PredicateKind::Skip | PredicateKind::Take)
    }

    /// Kinds whose operands are converted to the property's declared type
    pub fn converts_operands(self) -> bool {
        matches!(
            self,
            PredicateKind::Equal
                | PredicateKind::NotEqual
                | PredicateKind::In
                | PredicateKind::NotIn
                | PredicateKind::Between
        )
    }

    pub fn arity(self) -> Arity {
        match self {
            PredicateKind::IsNull
            | PredicateKind::IsNotNull
            | PredicateKind::Fetch
            | PredicateKind::OrderAsc
            | PredicateKind::OrderDesc
            | PredicateKind::Select => Arity::None,
            PredicateKind::Between => Arity::Two,
            PredicateKind::In | PredicateKind::NotIn => Arity::Many,
            _ => Arity::One,
        }
    }
}

impl fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Operand values attached to a condition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Operands {
    None,
    Single(Value),
    Pair(Value, Value),
    Many(Vec<Value>),
}

impl Operands {
    fn arity(&self) -> Arity {
        match self {
            Operands::None => Arity::None,
            Operands::Single(_) => Arity::One,
            Operands::Pair(_, _) => Arity::Two,
            Operands::Many(_) => Arity::Many,
        }
    }
}

/// An immutable condition: path (absent for pagination), kind and operands
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    path: Option<PathExpression>,
    kind: PredicateKind,
    operands: Operands,
}

impl Condition {
    /// Create a condition, checking the operand shape against the kind
    pub fn new(path: Option<PathExpression>, kind: PredicateKind, operands: Operands) -> Result<Self> {
        if operands.arity() != kind.arity() {
            return Err(CriteriaError::OperandShape {
                kind: kind.to_string(),
                expected: format!("{:?} operand(s)", kind.arity()),
            });
        }

        if matches!(&operands, Operands::Many(values) if values.is_empty()) {
            return Err(CriteriaError::OperandShape {
                kind: kind.to_string(),
                expected: "at least one value".to_string(),
            });
        }

        if path.is_none() != kind.is_pagination() {
            return Err(CriteriaError::UnsupportedExpression {
                reason: format!("'{kind}' conditions take a property path unless they paginate"),
            });
        }

        Ok(Self {
            path,
            kind,
            operands,
        })
    }

    /// Pagination condition; negative counts are rejected here
    pub fn pagination(kind: PredicateKind, count: i64) -> Result<Self> {
        if count < 0 {
            let argument = if kind == PredicateKind::Skip { "skip" } else { "take" };
            return Err(CriteriaError::negative_argument(argument, count));
        }
        Self::new(None, kind, Operands::Single(Value::Int64(count)))
    }

    pub fn path(&self) -> Option<&PathExpression> {
        self.path.as_ref()
    }

    pub fn kind(&self) -> PredicateKind {
        self.kind
    }

    pub fn operands(&self) -> &Operands {
        &self.operands
    }

    /// Path of a non-pagination condition
    pub fn require_path(&self) -> Result<&PathExpression> {
        self.path
            .as_ref()
            .ok_or_else(|| CriteriaError::UnsupportedExpression {
                reason: format!("'{}' condition has no property path", self.kind),
            })
    }

    pub fn single(&self) -> Result<&Value> {
        match &self.operands {
            Operands::Single(value) => Ok(value),
            _ => Err(self.shape_error("a single operand")),
        }
    }

    pub fn pair(&self) -> Result<(&Value, &Value)> {
        match &self.operands {
            Operands::Pair(low, high) => Ok((low, high)),
            _ => Err(self.shape_error("a pair of operands")),
        }
    }

    pub fn many(&self) -> Result<&[Value]> {
        match &self.operands {
            Operands::Many(values) => Ok(values),
            _ => Err(self.shape_error("a list of operands")),
        }
    }

    /// Row count carried by a Skip/Take condition
    pub fn count(&self) -> Result<u64> {
        match self.single()? {
            Value::Int64(n) => u64::try_from(*n)
                .map_err(|_| CriteriaError::negative_argument(self.kind.to_string(), *n)),
            _ => Err(self.shape_error("a row count")),
        }
    }

    fn shape_error(&self, expected: &str) -> CriteriaError {
        CriteriaError::OperandShape {
            kind: self.kind.to_string(),
            expected: expected.to_string(),
        }
    }
}

/// Conditions combined by OR
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionGroup {
    conditions: Vec<Condition>,
}

impl ConditionGroup {
    pub fn new(first: Condition) -> Self {
        Self {
            conditions: vec![first],
        }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn has_ordering(&self) -> bool {
        self.conditions.iter().any(|c| c.kind.is_ordering())
    }

    pub(crate) fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }
}

/// Entity whose columns a Select of `path` expands to, or `None` for a plain
/// column. Nested generic shapes cannot be flattened into columns.
pub(crate) fn projection_target(path: &PathExpression) -> Result<Option<&str>> {
    let declared = &path.terminal().declared;
    if !declared.is_navigation() {
        return Ok(None);
    }

    if declared.generic_arity() > 1 {
        return Err(CriteriaError::unsupported_projection(
            path.dotted(),
            format!("'{declared}' has more than one level of generic nesting"),
        ));
    }

    match declared {
        PropertyType::Collection(element) if !matches!(element.as_ref(), PropertyType::Entity(_)) => {
            Err(CriteriaError::unsupported_projection(
                path.dotted(),
                format!("collection element '{element}' is not an entity"),
            ))
        }
        _ => Ok(declared.target_entity()),
    }
}
