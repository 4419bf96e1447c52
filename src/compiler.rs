//! # Criteria Compiler
//!
//! Walks a [`QuerySpec`] once and issues join, predicate, ordering,
//! projection and pagination instructions against a [`Criteria`] handle.
//!
//! Each AND-group becomes one disjunction clause when it holds at least one
//! filter term. Orderings, projections, fetches and pagination are applied
//! directly to the handle and never contribute terms. Every compilation derives
//! its own [`JoinTree`], so compiling the same specification again produces the
//! same joins and aliases.

use crate::config::CompilerConfig;
use crate::criteria::{ComparisonOp, CompiledQuery, Criteria, Order, Predicate, Projection};
use crate::error::{CriteriaError, Result};
use crate::logging::log_compile_operation;
use crate::path::PathExpression;
use crate::query_builder::conditions::projection_target;
use crate::query_builder::{Condition, JoinTree, PredicateKind, QuerySpec};
use crate::value::Value;
use tracing::{debug, instrument, trace};

/// Summary of one compilation
#[derive(Debug, Clone)]
pub struct CompileOutcome {
    /// Joins derived for this compilation
    pub join_tree: JoinTree,
    /// Disjunction clauses attached to the handle
    pub clauses: usize,
    /// Projected columns attached to the handle
    pub projections: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CriteriaCompiler {
    config: CompilerConfig,
}

impl CriteriaCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile `spec` into a recording [`CompiledQuery`] rooted at the
    /// configured root alias
    pub fn compile_to_plan(&self, spec: &QuerySpec) -> Result<CompiledQuery> {
        let mut plan = CompiledQuery::new(spec.root(), self.config.root_alias.as_str());
        self.compile(spec, &mut plan)?;

        if self.config.log_compiled_sql {
            debug!(root = %spec.root(), sql = %plan.to_sql(), "Compiled query");
        }

        Ok(plan)
    }

    /// Compile `spec` against a freshly created criteria handle
    #[instrument(skip(self, spec, criteria), fields(root = %spec.root(), groups = spec.groups().len()))]
    pub fn compile<C: Criteria + ?Sized>(
        &self,
        spec: &QuerySpec,
        criteria: &mut C,
    ) -> Result<CompileOutcome> {
        let mut tree = JoinTree::new(
            spec.root(),
            criteria.root_alias(),
            &self.config.alias_prefix,
            spec.join_kind(),
        );

        match self.compile_groups(spec, &mut tree, criteria) {
            Ok((clauses, projections)) => {
                log_compile_operation(
                    spec.root(),
                    spec.groups().len(),
                    clauses,
                    tree.join_count(),
                    projections,
                    "success",
                    None,
                );
                Ok(CompileOutcome {
                    join_tree: tree,
                    clauses,
                    projections,
                })
            }
            Err(error) => {
                log_compile_operation(
                    spec.root(),
                    spec.groups().len(),
                    0,
                    tree.join_count(),
                    0,
                    "failed",
                    Some(&error.to_string()),
                );
                Err(error)
            }
        }
    }

    fn compile_groups<C: Criteria + ?Sized>(
        &self,
        spec: &QuerySpec,
        tree: &mut JoinTree,
        criteria: &mut C,
    ) -> Result<(usize, usize)> {
        let mut clauses = 0;
        let mut projections = Vec::new();

        for group in spec.groups() {
            let mut terms = Vec::new();

            for condition in group.conditions() {
                match condition.kind() {
                    PredicateKind::Skip => criteria.set_offset(condition.count()?)?,
                    PredicateKind::Take => criteria.set_limit(condition.count()?)?,
                    PredicateKind::OrderAsc => {
                        let property = qualify(tree, condition.require_path()?, criteria)?;
                        criteria.add_order(Order::asc(property))?;
                    }
                    PredicateKind::OrderDesc => {
                        let property = qualify(tree, condition.require_path()?, criteria)?;
                        criteria.add_order(Order::desc(property))?;
                    }
                    PredicateKind::Select => {
                        self.project(spec, tree, condition.require_path()?, criteria, &mut projections)?;
                    }
                    PredicateKind::Fetch => {
                        let path = condition.require_path()?;
                        let parent = tree.resolve_parent(path, criteria)?;
                        tree.get_or_join(parent, path.terminal(), criteria)?;
                    }
                    _ => {
                        let path = condition.require_path()?;
                        let property = qualify(tree, path, criteria)?;
                        let term = build_predicate(condition, path, property)?;
                        trace!(term = %term, "Built predicate term");
                        terms.push(term);
                    }
                }
            }

            if !terms.is_empty() {
                criteria.add_predicate(Predicate::or(terms))?;
                clauses += 1;
            }
        }

        let projected = projections.len();
        if !projections.is_empty() {
            criteria.set_projection(projections)?;
            if let Some(result_type) = spec.result_type() {
                criteria.bind_result_type(result_type)?;
            }
        }

        Ok((clauses, projected))
    }

    /// A relationship expands to one column per scalar property of its target
    fn project<C: Criteria + ?Sized>(
        &self,
        spec: &QuerySpec,
        tree: &mut JoinTree,
        path: &PathExpression,
        criteria: &mut C,
        projections: &mut Vec<Projection>,
    ) -> Result<()> {
        let parent = tree.resolve_parent(path, criteria)?;
        let terminal = path.terminal();

        match projection_target(path)? {
            Some(target) => {
                let entity = spec.schema().require_entity(target)?;
                let node = tree.get_or_join(parent, terminal, criteria)?;
                let alias = &tree.node(node).alias;

                projections.extend(entity.scalar_properties().map(|property| {
                    Projection::new(format!("{alias}.{}", property.name), property.name.clone())
                }));
            }
            None => {
                let alias = &tree.node(parent).alias;
                projections.push(Projection::new(
                    format!("{alias}.{}", terminal.name),
                    terminal.name.clone(),
                ));
            }
        }

        Ok(())
    }
}

/// Alias-qualified reference to the terminal property of `path`, joining
/// every relationship on the way
fn qualify<C: Criteria + ?Sized>(
    tree: &mut JoinTree,
    path: &PathExpression,
    criteria: &mut C,
) -> Result<String> {
    let parent = tree.resolve_parent(path, criteria)?;
    Ok(format!("{}.{}", tree.node(parent).alias, path.terminal().name))
}

/// Map a filter condition onto its engine primitive.
///
/// Operands of equality, membership and range conditions are converted to the
/// terminal property's comparison type; an optional numeric or temporal
/// property therefore compares exactly like its non-optional counterpart.
fn build_predicate(condition: &Condition, path: &PathExpression, property: String) -> Result<Predicate> {
    let convert = |value: &Value| -> Result<Value> {
        let target = match path.terminal().declared.comparison_type() {
            Some(target) if condition.kind().converts_operands() => target,
            _ => return Ok(value.clone()),
        };

        value
            .convert_to(target)
            .ok_or_else(|| CriteriaError::OperandConversion {
                path: path.dotted(),
                expected: target.to_string(),
                found: format!("{} '{}'", value.type_name(), value),
            })
    };

    let convert_all = |values: &[Value]| values.iter().map(&convert).collect::<Result<Vec<_>>>();

    let predicate = match condition.kind() {
        PredicateKind::Equal => Predicate::eq(property, convert(condition.single()?)?),
        PredicateKind::NotEqual => {
            Predicate::not(Predicate::eq(property, convert(condition.single()?)?))
        }
        PredicateKind::In => Predicate::is_in(property, convert_all(condition.many()?)?),
        PredicateKind::NotIn => {
            Predicate::not(Predicate::is_in(property, convert_all(condition.many()?)?))
        }
        PredicateKind::Between => {
            let (low, high) = condition.pair()?;
            Predicate::between(property, convert(low)?, convert(high)?)
        }
        PredicateKind::IsNull => Predicate::is_null(property),
        PredicateKind::IsNotNull => Predicate::is_not_null(property),
        PredicateKind::Like => Predicate::like(property, condition.single()?.clone()),
        PredicateKind::NotLike => {
            Predicate::not(Predicate::like(property, condition.single()?.clone()))
        }
        PredicateKind::GreaterThan => {
            Predicate::compare(property, ComparisonOp::Gt, condition.single()?.clone())
        }
        PredicateKind::GreaterOrEqual => {
            Predicate::compare(property, ComparisonOp::Ge, condition.single()?.clone())
        }
        PredicateKind::LessThan => {
            Predicate::compare(property, ComparisonOp::Lt, condition.single()?.clone())
        }
        PredicateKind::LessOrEqual => {
            Predicate::compare(property, ComparisonOp::Le, condition.single()?.clone())
        }
        other => {
            return Err(CriteriaError::UnimplementedPredicateKind {
                kind: other.to_string(),
                path: path.dotted(),
            })
        }
    };

    Ok(predicate)
}
