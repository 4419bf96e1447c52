#![allow(clippy::doc_markdown)] // Allow technical terms in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Fluent Criteria
//!
//! Fluent condition specifications over a typed entity graph, compiled into
//! instructions for a criteria-based query execution engine.
//!
//! ## Overview
//!
//! A caller describes filters, joins, orderings, pagination and projections
//! with chained property-path expressions. The compiler resolves each path
//! against the schema, deduplicates relationship traversals into aliased joins
//! and attaches predicate, ordering, projection and pagination instructions to
//! a criteria handle obtained from the execution engine.
//!
//! ## Module Organization
//!
//! - [`schema`] - Entity metadata the compiler reads
//! - [`value`] - Operand values and declared-type conversion
//! - [`path`] - Structural property paths and the [`path!`] macro
//! - [`query_builder`] - Specification builder, condition groups and the join arena
//! - [`criteria`] - Engine surface and the recording [`criteria::CompiledQuery`]
//! - [`compiler`] - Specification to criteria compilation
//! - [`executor`] - List, first, projection and count helpers over an engine
//! - [`config`] - Compiler configuration
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use fluent_criteria::path;
//! use fluent_criteria::prelude::*;
//! use fluent_criteria::schema::{EntityType, ScalarType, Schema};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Arc::new(
//!     Schema::builder()
//!         .entity(
//!             EntityType::new("Loan")
//!                 .scalar("Key", ScalarType::Int32)
//!                 .optional("ReturnDate", ScalarType::DateTime)
//!                 .reference("Borrower", "Borrower"),
//!         )
//!         .entity(EntityType::new("Borrower").scalar("Name", ScalarType::String))
//!         .build(),
//! );
//!
//! let mut spec = QuerySpec::new(schema, "Loan")?;
//! spec.is_null(path!(ReturnDate))?
//!     .or()
//!     .is_like(path!(Borrower.Name), "A%")?;
//! spec.take(10)?;
//!
//! let plan = CriteriaCompiler::default().compile_to_plan(&spec)?;
//! assert_eq!(
//!     plan.to_sql(),
//!     "SELECT this.* FROM Loan this INNER JOIN this.Borrower alias_1 \
//!      WHERE (this.ReturnDate IS NULL OR alias_1.Name LIKE 'A%') LIMIT 10"
//! );
//! # Ok(())
//! # }
//! ```

pub mod compiler;
pub mod config;
pub mod constants;
pub mod criteria;
pub mod error;
pub mod executor;
pub mod logging;
pub mod path;
pub mod query_builder;
pub mod schema;
pub mod value;

pub use compiler::{CompileOutcome, CriteriaCompiler};
pub use config::{CompilerConfig, ConfigManager, ConfigurationError};
pub use criteria::{CompiledQuery, Criteria, CriteriaEngine, Predicate, Row};
pub use error::{CriteriaError, Result};
pub use executor::QueryExecutor;
pub use path::{Expr, PathExpression, PathParser};
pub use query_builder::{
    ConditionBuilder, ConditionChain, JoinKind, JoinTree, OrChain, Pagination, PredicateKind,
    QuerySpec,
};
pub use schema::{Entity, EntityType, PropertyType, ScalarType, Schema, SchemaProvider};
pub use value::Value;

/// Everything needed to build and compile a specification
pub mod prelude {
    pub use crate::compiler::CriteriaCompiler;
    pub use crate::criteria::{CompiledQuery, Criteria, CriteriaEngine};
    pub use crate::error::CriteriaError;
    pub use crate::executor::QueryExecutor;
    pub use crate::query_builder::{ConditionBuilder, JoinKind, QuerySpec};
    pub use crate::value::Value;
}
