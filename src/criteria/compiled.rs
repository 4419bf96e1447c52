use super::{Criteria, Order, Predicate, Projection};
use crate::error::{CriteriaError, Result};
use crate::query_builder::{JoinKind, Pagination};
use serde::Serialize;
use tracing::trace;

/// A relationship join registered on a compiled query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinInstruction {
    pub parent_alias: String,
    pub property: String,
    pub alias: String,
    pub kind: JoinKind,
}

impl JoinInstruction {
    pub fn to_sql(&self) -> String {
        format!(
            "{} {}.{} {}",
            self.kind.to_sql(),
            self.parent_alias,
            self.property,
            self.alias
        )
    }
}

/// Criteria handle that records every instruction it receives.
///
/// Used to inspect what a specification compiles to and to render it in SQL
/// form; engines that build their own handles can replay it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    entity: String,
    root_alias: String,
    joins: Vec<JoinInstruction>,
    predicates: Vec<Predicate>,
    orders: Vec<Order>,
    projections: Vec<Projection>,
    pagination: Pagination,
    result_type: Option<String>,
}

impl CompiledQuery {
    pub fn new(entity: impl Into<String>, root_alias: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            root_alias: root_alias.into(),
            joins: Vec::new(),
            predicates: Vec::new(),
            orders: Vec::new(),
            projections: Vec::new(),
            pagination: Pagination::default(),
            result_type: None,
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn joins(&self) -> &[JoinInstruction] {
        &self.joins
    }

    /// Find the join registered for `property` under `parent_alias`
    pub fn join_for(&self, parent_alias: &str, property: &str) -> Option<&JoinInstruction> {
        self.joins
            .iter()
            .find(|j| j.parent_alias == parent_alias && j.property == property)
    }

    /// Conjunctive clauses in attachment order
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn projections(&self) -> &[Projection] {
        &self.projections
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn result_type(&self) -> Option<&str> {
        self.result_type.as_deref()
    }

    /// AND of every attached clause, or `None` for an unfiltered query
    pub fn where_clause(&self) -> Option<Predicate> {
        match self.predicates.as_slice() {
            [] => None,
            [single] => Some(single.clone()),
            many => Some(Predicate::and(many.to_vec())),
        }
    }

    /// Render the recorded instructions as SQL text
    pub fn to_sql(&self) -> String {
        let mut sql = String::from("SELECT ");

        if self.projections.is_empty() {
            sql.push_str(&format!("{}.*", self.root_alias));
        } else {
            let columns: Vec<String> = self.projections.iter().map(Projection::to_sql).collect();
            sql.push_str(&columns.join(", "));
        }

        sql.push_str(&format!(" FROM {} {}", self.entity, self.root_alias));

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.to_sql());
        }

        if !self.predicates.is_empty() {
            let clauses: Vec<String> = self.predicates.iter().map(Predicate::to_sql).collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        if !self.orders.is_empty() {
            let orders: Vec<String> = self.orders.iter().map(Order::to_sql).collect();
            sql.push_str(&format!(" ORDER BY {}", orders.join(", ")));
        }

        sql.push_str(&self.pagination.to_sql());
        sql
    }

    fn has_alias(&self, alias: &str) -> bool {
        alias == self.root_alias || self.joins.iter().any(|j| j.alias == alias)
    }
}

impl Criteria for CompiledQuery {
    fn root_alias(&self) -> &str {
        &self.root_alias
    }

    fn create_sub_criteria(
        &mut self,
        parent_alias: &str,
        property: &str,
        alias: &str,
        kind: JoinKind,
    ) -> Result<()> {
        if !self.has_alias(parent_alias) {
            return Err(CriteriaError::engine(
                "create_sub_criteria",
                format!("unknown parent alias '{parent_alias}'"),
            ));
        }
        if self.has_alias(alias) {
            return Err(CriteriaError::engine(
                "create_sub_criteria",
                format!("alias '{alias}' is already in use"),
            ));
        }

        self.joins.push(JoinInstruction {
            parent_alias: parent_alias.to_string(),
            property: property.to_string(),
            alias: alias.to_string(),
            kind,
        });
        Ok(())
    }

    fn add_predicate(&mut self, predicate: Predicate) -> Result<()> {
        trace!(predicate = %predicate, "Attached predicate");
        self.predicates.push(predicate);
        Ok(())
    }

    fn add_order(&mut self, order: Order) -> Result<()> {
        self.orders.push(order);
        Ok(())
    }

    fn set_offset(&mut self, offset: u64) -> Result<()> {
        self.pagination.offset = Some(offset);
        Ok(())
    }

    fn set_limit(&mut self, limit: u64) -> Result<()> {
        self.pagination.limit = Some(limit);
        Ok(())
    }

    fn set_projection(&mut self, projections: Vec<Projection>) -> Result<()> {
        self.projections = projections;
        Ok(())
    }

    fn bind_result_type(&mut self, target: &str) -> Result<()> {
        self.result_type = Some(target.to_string());
        Ok(())
    }
}
