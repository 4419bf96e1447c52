//! # Compiler Configuration
//!
//! Explicit, validated settings for the criteria compiler: the alias the engine
//! gives the root criteria, the prefix for generated join aliases and the join
//! kind used when a specification does not pick one.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fluent_criteria::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Optional file from FLUENT_CRITERIA_CONFIG, then FLUENT_CRITERIA_* overrides
//! let manager = ConfigManager::load()?;
//! let prefix = &manager.config().alias_prefix;
//! # let _ = prefix;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ALIAS_PREFIX, DEFAULT_ROOT_ALIAS};
use crate::query_builder::JoinKind;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Settings consumed by [`crate::compiler::CriteriaCompiler`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Alias of the root criteria, used to qualify root-level properties
    pub root_alias: String,
    /// Join aliases are `{alias_prefix}{n}` with `n` counting from 1
    pub alias_prefix: String,
    /// Join kind for specifications built through [`crate::executor::QueryExecutor::spec`]
    pub default_join_kind: JoinKind,
    /// Emit the rendered SQL text of every compiled plan at debug level
    pub log_compiled_sql: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            root_alias: DEFAULT_ROOT_ALIAS.to_string(),
            alias_prefix: DEFAULT_ALIAS_PREFIX.to_string(),
            default_join_kind: JoinKind::Inner,
            log_compiled_sql: false,
        }
    }
}

impl CompilerConfig {
    /// Validate aliases so generated names are usable as property qualifiers
    pub fn validate(&self) -> ConfigResult<()> {
        if !is_identifier(&self.root_alias) {
            return Err(ConfigurationError::invalid_value(
                "root_alias",
                self.root_alias.clone(),
                "must be a non-empty identifier",
            ));
        }

        if !is_identifier(&self.alias_prefix) {
            return Err(ConfigurationError::invalid_value(
                "alias_prefix",
                self.alias_prefix.clone(),
                "must be a non-empty identifier",
            ));
        }

        // A join alias must never collide with the root alias
        if let Some(suffix) = self.root_alias.strip_prefix(self.alias_prefix.as_str()) {
            if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) {
                return Err(ConfigurationError::invalid_value(
                    "root_alias",
                    self.root_alias.clone(),
                    format!("collides with generated aliases '{}N'", self.alias_prefix),
                ));
            }
        }

        Ok(())
    }
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
