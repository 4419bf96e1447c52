//! # Query Executor
//!
//! Convenience layer over a [`CriteriaEngine`]: obtains a fresh root handle,
//! compiles a [`QuerySpec`] into it and maps the engine's rows onto caller
//! types with serde.

use crate::compiler::CriteriaCompiler;
use crate::config::CompilerConfig;
use crate::criteria::{CriteriaEngine, Row};
use crate::error::Result;
use crate::logging::log_error;
use crate::query_builder::QuerySpec;
use crate::schema::{Entity, SchemaProvider};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

pub struct QueryExecutor<E: CriteriaEngine> {
    engine: E,
    compiler: CriteriaCompiler,
    schema: Arc<dyn SchemaProvider>,
}

impl<E: CriteriaEngine> QueryExecutor<E> {
    pub fn new(engine: E, schema: Arc<dyn SchemaProvider>, config: CompilerConfig) -> Self {
        Self {
            engine,
            compiler: CriteriaCompiler::new(config),
            schema,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn compiler(&self) -> &CriteriaCompiler {
        &self.compiler
    }

    /// Start a specification on `root` using the configured default join kind
    pub fn spec(&self, root: &str) -> Result<QuerySpec> {
        Ok(QuerySpec::new(self.schema.clone(), root)?
            .with_join_kind(self.compiler.config().default_join_kind))
    }

    pub fn spec_for<T: Entity>(&self) -> Result<QuerySpec> {
        self.spec(&T::entity_name())
    }

    /// Compile `spec` into a freshly created root handle
    pub fn compile(&self, spec: &QuerySpec) -> Result<E::Handle> {
        let entity = self.schema.require_entity(spec.root())?;
        let mut handle = self
            .engine
            .create_root_criteria(entity, &self.compiler.config().root_alias)
            .inspect_err(|e| {
                log_error(
                    "executor",
                    "create_root_criteria",
                    &e.to_string(),
                    Some(spec.root()),
                )
            })?;

        let outcome = self.compiler.compile(spec, &mut handle)?;
        debug!(
            root = %spec.root(),
            joins = outcome.join_tree.join_count(),
            clauses = outcome.clauses,
            "Compiled specification into engine handle"
        );
        Ok(handle)
    }

    /// Rows produced by the engine for `spec`, untyped
    pub fn get_projected_rows(&self, spec: &QuerySpec) -> Result<Vec<Row>> {
        let handle = self.compile(spec)?;
        self.engine
            .list(handle)
            .inspect_err(|e| log_error("executor", "list", &e.to_string(), Some(spec.root())))
    }

    /// Every entity matching `spec`, mapped onto `T`
    pub fn get_list<T: DeserializeOwned>(&self, spec: &QuerySpec) -> Result<Vec<T>> {
        self.get_projected_rows(spec)?
            .iter()
            .map(Row::deserialize)
            .collect()
    }

    /// First matching entity, or `None` when nothing matches
    pub fn get_first<T: DeserializeOwned>(&self, spec: &QuerySpec) -> Result<Option<T>> {
        self.get_projected_rows(spec)?
            .first()
            .map(Row::deserialize)
            .transpose()
    }

    /// Projected rows shaped as `T`; the result type is bound on a copy of
    /// `spec` so the caller's specification is left untouched
    pub fn get_projected_list<T: DeserializeOwned>(&self, spec: &QuerySpec) -> Result<Vec<T>> {
        let mut bound = spec.clone();
        bound.bind_result::<T>();
        self.get_list(&bound)
    }

    /// Number of entities matching `spec`
    pub fn get_count(&self, spec: &QuerySpec) -> Result<u64> {
        let handle = self.compile(spec)?;
        self.engine
            .count(handle)
            .inspect_err(|e| log_error("executor", "count", &e.to_string(), Some(spec.root())))
    }
}
