use super::conditions::{projection_target, Condition, ConditionGroup, Operands, PredicateKind};
use super::{JoinKind, Pagination};
use crate::error::{CriteriaError, Result};
use crate::path::{Expr, PathExpression, PathParser};
use crate::schema::{Entity, SchemaProvider};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Ordered AND-list of OR-groups over one root entity type.
///
/// A plain call opens a new group; a call chained through
/// [`ConditionChain::or`] joins the group opened by the previous call.
#[derive(Clone)]
pub struct QuerySpec {
    schema: Arc<dyn SchemaProvider>,
    root: String,
    join_kind: JoinKind,
    groups: Vec<ConditionGroup>,
    result_type: Option<String>,
}

/// Where an inserted condition lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    NewGroup,
    Group(usize),
}

impl QuerySpec {
    /// Create a specification rooted at a registered entity type
    pub fn new(schema: Arc<dyn SchemaProvider>, root: impl Into<String>) -> Result<Self> {
        let root = root.into();
        schema.require_entity(&root)?;

        Ok(Self {
            schema,
            root,
            join_kind: JoinKind::Inner,
            groups: Vec::new(),
            result_type: None,
        })
    }

    /// Create a specification rooted at a Rust entity type
    pub fn of<T: Entity>(schema: Arc<dyn SchemaProvider>) -> Result<Self> {
        Self::new(schema, T::entity_name())
    }

    /// Join kind used for every relationship this specification traverses
    pub fn with_join_kind(mut self, join_kind: JoinKind) -> Self {
        self.join_kind = join_kind;
        self
    }

    pub fn left_outer(self) -> Self {
        self.with_join_kind(JoinKind::LeftOuter)
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn join_kind(&self) -> JoinKind {
        self.join_kind
    }

    pub fn schema(&self) -> &dyn SchemaProvider {
        self.schema.as_ref()
    }

    pub fn groups(&self) -> &[ConditionGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Request that projected rows are shaped as `T`
    pub fn bind_result<T>(&mut self) -> &mut Self {
        self.result_type = Some(std::any::type_name::<T>().to_string());
        self
    }

    pub fn set_result_type(&mut self, result_type: impl Into<String>) -> &mut Self {
        self.result_type = Some(result_type.into());
        self
    }

    pub fn result_type(&self) -> Option<&str> {
        self.result_type.as_deref()
    }

    fn conditions_of(&self, kind: impl Fn(PredicateKind) -> bool) -> impl Iterator<Item = &Condition> {
        self.groups
            .iter()
            .flat_map(ConditionGroup::conditions)
            .filter(move |c| kind(c.kind()))
    }

    /// Relationships registered purely for eager fetching
    pub fn fetch_paths(&self) -> Vec<&PathExpression> {
        self.conditions_of(|k| k == PredicateKind::Fetch)
            .filter_map(Condition::path)
            .collect()
    }

    pub fn projections(&self) -> Vec<&PathExpression> {
        self.conditions_of(|k| k == PredicateKind::Select)
            .filter_map(Condition::path)
            .collect()
    }

    pub fn orderings(&self) -> Vec<(&PathExpression, PredicateKind)> {
        self.conditions_of(PredicateKind::is_ordering)
            .filter_map(|c| c.path().map(|p| (p, c.kind())))
            .collect()
    }

    /// Effective offset/limit; a later Skip or Take replaces an earlier one
    pub fn pagination(&self) -> Pagination {
        self.conditions_of(PredicateKind::is_pagination)
            .fold(Pagination::default(), |mut pagination, c| {
                let count = c.count().ok();
                match c.kind() {
                    PredicateKind::Skip => pagination.offset = count,
                    _ => pagination.limit = count,
                }
                pagination
            })
    }

    /// Parse `expr` and insert one condition per resolved path.
    /// Returns the index of the group that received the last condition.
    pub fn insert(
        &mut self,
        placement: Placement,
        expr: &Expr,
        kind: PredicateKind,
        operands: Operands,
    ) -> Result<usize> {
        let paths = PathParser::parse(self.schema.as_ref(), &self.root, expr)?;

        if paths.len() > 1 && kind != PredicateKind::Select {
            return Err(CriteriaError::UnsupportedExpression {
                reason: format!("'{kind}' accepts a single property path"),
            });
        }

        let mut conditions = Vec::with_capacity(paths.len());
        for path in paths {
            self.check_terminal(&path, kind)?;
            conditions.push(Condition::new(Some(path), kind, operands.clone())?);
        }

        let mut group = 0;
        for condition in conditions {
            group = self.place(placement, condition)?;
        }
        Ok(group)
    }

    /// Insert a Skip/Take condition
    pub fn insert_pagination(
        &mut self,
        placement: Placement,
        kind: PredicateKind,
        count: i64,
    ) -> Result<usize> {
        let condition = Condition::pagination(kind, count)?;
        self.place(placement, condition)
    }

    fn check_terminal(&self, path: &PathExpression, kind: PredicateKind) -> Result<()> {
        match kind {
            PredicateKind::Select => {
                if let Some(target) = projection_target(path)? {
                    self.schema.require_entity(target)?;
                }
                Ok(())
            }
            PredicateKind::Fetch if !path.terminal().declared.is_navigation() => {
                Err(CriteriaError::NonNavigableSegment {
                    entity: self.root.clone(),
                    property: path.dotted(),
                })
            }
            _ => Ok(()),
        }
    }

    fn place(&mut self, placement: Placement, condition: Condition) -> Result<usize> {
        let kind = condition.kind();

        let index = match placement {
            Placement::NewGroup => {
                if kind.is_filter() && self.groups.iter().any(ConditionGroup::has_ordering) {
                    warn!(root = %self.root, kind = %kind, "Rejected filter after order by");
                    return Err(CriteriaError::invalid_sequence(
                        "Cannot add a filter condition after an order by clause",
                    ));
                }
                self.groups.push(ConditionGroup::new(condition));
                self.groups.len() - 1
            }
            Placement::Group(index) => {
                let group = self.groups.get_mut(index).ok_or_else(|| {
                    CriteriaError::invalid_sequence(format!("No condition group at index {index}"))
                })?;

                if kind.is_ordering() {
                    warn!(root = %self.root, kind = %kind, "Rejected order by inside a condition group");
                    return Err(CriteriaError::invalid_sequence(
                        "Order by clause cannot be combined with any other condition",
                    ));
                }
                if kind.is_filter() && group.has_ordering() {
                    warn!(root = %self.root, kind = %kind, "Rejected filter inside an order by group");
                    return Err(CriteriaError::invalid_sequence(
                        "Cannot combine a filter condition with an order by clause",
                    ));
                }

                group.push(condition);
                index
            }
        };

        debug!(
            root = %self.root,
            kind = %kind,
            group = index,
            group_size = self.groups[index].len(),
            "Inserted condition"
        );

        Ok(index)
    }
}

impl fmt::Debug for QuerySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySpec")
            .field("root", &self.root)
            .field("join_kind", &self.join_kind)
            .field("groups", &self.groups)
            .field("result_type", &self.result_type)
            .finish()
    }
}

/// Fluent condition operations shared by [`QuerySpec`] and its chain types
pub trait ConditionBuilder<'a>: Sized {
    /// Specification and placement the next condition goes to
    fn target(self) -> (&'a mut QuerySpec, Placement);

    fn push(self, expr: Expr, kind: PredicateKind, operands: Operands) -> Result<ConditionChain<'a>> {
        let (spec, placement) = self.target();
        let group = spec.insert(placement, &expr, kind, operands)?;
        Ok(ConditionChain { spec, group })
    }

    fn equal(self, expr: Expr, value: impl Into<Value>) -> Result<ConditionChain<'a>> {
        self.push(expr, PredicateKind::Equal, Operands::Single(value.into()))
    }

    fn not_equal(self, expr: Expr, value: impl Into<Value>) -> Result<ConditionChain<'a>> {
        self.push(expr, PredicateKind::NotEqual, Operands::Single(value.into()))
    }

    fn is_in<I, V>(self, expr: Expr, values: I) -> Result<ConditionChain<'a>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.push(expr, PredicateKind::In, Operands::Many(values))
    }

    fn is_not_in<I, V>(self, expr: Expr, values: I) -> Result<ConditionChain<'a>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.push(expr, PredicateKind::NotIn, Operands::Many(values))
    }

    fn is_null(self, expr: Expr) -> Result<ConditionChain<'a>> {
        self.push(expr, PredicateKind::IsNull, Operands::None)
    }

    fn is_not_null(self, expr: Expr) -> Result<ConditionChain<'a>> {
        self.push(expr, PredicateKind::IsNotNull, Operands::None)
    }

    fn between(
        self,
        expr: Expr,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Result<ConditionChain<'a>> {
        self.push(
            expr,
            PredicateKind::Between,
            Operands::Pair(low.into(), high.into()),
        )
    }

    fn is_like(self, expr: Expr, pattern: impl Into<Value>) -> Result<ConditionChain<'a>> {
        self.push(expr, PredicateKind::Like, Operands::Single(pattern.into()))
    }

    fn is_not_like(self, expr: Expr, pattern: impl Into<Value>) -> Result<ConditionChain<'a>> {
        self.push(expr, PredicateKind::NotLike, Operands::Single(pattern.into()))
    }

    fn greater_than(self, expr: Expr, value: impl Into<Value>) -> Result<ConditionChain<'a>> {
        self.push(expr, PredicateKind::GreaterThan, Operands::Single(value.into()))
    }

    fn greater_than_or_equal(self, expr: Expr, value: impl Into<Value>) -> Result<ConditionChain<'a>> {
        self.push(expr, PredicateKind::GreaterOrEqual, Operands::Single(value.into()))
    }

    fn less_than(self, expr: Expr, value: impl Into<Value>) -> Result<ConditionChain<'a>> {
        self.push(expr, PredicateKind::LessThan, Operands::Single(value.into()))
    }

    fn less_than_or_equal(self, expr: Expr, value: impl Into<Value>) -> Result<ConditionChain<'a>> {
        self.push(expr, PredicateKind::LessOrEqual, Operands::Single(value.into()))
    }

    /// Eagerly join a relationship without filtering on it
    fn fetch(self, expr: Expr) -> Result<ConditionChain<'a>> {
        self.push(expr, PredicateKind::Fetch, Operands::None)
    }

    fn order_by_ascending(self, expr: Expr) -> Result<ConditionChain<'a>> {
        self.push(expr, PredicateKind::OrderAsc, Operands::None)
    }

    fn order_by_descending(self, expr: Expr) -> Result<ConditionChain<'a>> {
        self.push(expr, PredicateKind::OrderDesc, Operands::None)
    }

    /// Project a column, every scalar column of a relationship, or several
    /// columns at once when `expr` is a tuple
    fn select(self, expr: Expr) -> Result<ConditionChain<'a>> {
        self.push(expr, PredicateKind::Select, Operands::None)
    }

    fn skip(self, count: i64) -> Result<ConditionChain<'a>> {
        let (spec, placement) = self.target();
        let group = spec.insert_pagination(placement, PredicateKind::Skip, count)?;
        Ok(ConditionChain { spec, group })
    }

    fn take(self, count: i64) -> Result<ConditionChain<'a>> {
        let (spec, placement) = self.target();
        let group = spec.insert_pagination(placement, PredicateKind::Take, count)?;
        Ok(ConditionChain { spec, group })
    }
}

impl<'a> ConditionBuilder<'a> for &'a mut QuerySpec {
    fn target(self) -> (&'a mut QuerySpec, Placement) {
        (self, Placement::NewGroup)
    }
}

/// Result of inserting a condition. Further plain calls open new groups;
/// [`ConditionChain::or`] continues the group just written to.
#[derive(Debug)]
pub struct ConditionChain<'a> {
    spec: &'a mut QuerySpec,
    group: usize,
}

impl<'a> ConditionChain<'a> {
    /// Continue the current group: the next condition is OR-ed with it
    pub fn or(self) -> OrChain<'a> {
        OrChain {
            spec: self.spec,
            group: self.group,
        }
    }

    pub fn group_index(&self) -> usize {
        self.group
    }
}

impl<'a> ConditionBuilder<'a> for ConditionChain<'a> {
    fn target(self) -> (&'a mut QuerySpec, Placement) {
        (self.spec, Placement::NewGroup)
    }
}

/// Appends the next condition to an existing group
#[derive(Debug)]
pub struct OrChain<'a> {
    spec: &'a mut QuerySpec,
    group: usize,
}

impl<'a> ConditionBuilder<'a> for OrChain<'a> {
    fn target(self) -> (&'a mut QuerySpec, Placement) {
        (self.spec, Placement::Group(self.group))
    }
}
