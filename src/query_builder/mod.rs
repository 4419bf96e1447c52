//! # Query Builder
//!
//! Fluent specification of filters, joins, orderings, projections and
//! pagination over a typed entity graph.
//!
//! ## Key Components
//!
//! - [`builder`] - [`QuerySpec`] and the fluent [`ConditionBuilder`] chain
//! - [`conditions`] - Condition records and OR-groups
//! - [`joins`] - Join arena that deduplicates relationship traversals
//! - [`pagination`] - Offset/limit carried into the compiled query
//!
//! ## Grouping
//!
//! Every plain call opens a new AND-level group. Chaining through
//! [`ConditionChain::or`] appends to the group opened by the previous call:
//!
//! ```rust
//! use std::sync::Arc;
//! use fluent_criteria::path;
//! use fluent_criteria::prelude::*;
//! use fluent_criteria::schema::{EntityType, ScalarType, Schema};
//!
//! let schema = Arc::new(
//!     Schema::builder()
//!         .entity(
//!             EntityType::new("Author")
//!                 .scalar("Name", ScalarType::String)
//!                 .scalar("Country", ScalarType::String),
//!         )
//!         .build(),
//! );
//!
//! let mut spec = QuerySpec::new(schema, "Author")?;
//! spec.equal(path!(Country), "India")?
//!     .or()
//!     .equal(path!(Country), "USA")?;
//! spec.order_by_ascending(path!(Name))?;
//!
//! assert_eq!(spec.groups().len(), 2);
//! assert_eq!(spec.groups()[0].len(), 2);
//! # Ok::<(), fluent_criteria::CriteriaError>(())
//! ```

pub mod builder;
pub mod conditions;
pub mod joins;
pub mod pagination;

pub use builder::{ConditionBuilder, ConditionChain, OrChain, Placement, QuerySpec};
pub use conditions::{Arity, Condition, ConditionGroup, Operands, PredicateKind};
pub use joins::{JoinKind, JoinNode, JoinNodeId, JoinTree};
pub use pagination::Pagination;
