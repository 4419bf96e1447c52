//! # System Constants
//!
//! Defaults and environment variable names that define the operational
//! boundaries of the criteria compiler.

/// Alias the execution engine assigns to the root criteria
pub const DEFAULT_ROOT_ALIAS: &str = "this";

/// Prefix for generated join aliases (`alias_1`, `alias_2`, ...)
pub const DEFAULT_ALIAS_PREFIX: &str = "alias_";

/// Environment variable naming conventions
pub mod env {
    /// Prefix for configuration overrides, e.g. `FLUENT_CRITERIA_ROOT_ALIAS`
    pub const CONFIG_PREFIX: &str = "FLUENT_CRITERIA";

    /// Explicit configuration file location
    pub const CONFIG_FILE: &str = "FLUENT_CRITERIA_CONFIG";

    /// Deployment environment, consulted before `APP_ENV`
    pub const ENVIRONMENT: &str = "FLUENT_CRITERIA_ENV";
    pub const FALLBACK_ENVIRONMENT: &str = "APP_ENV";

    /// `json` switches console logging to the JSON formatter
    pub const LOG_FORMAT: &str = "FLUENT_CRITERIA_LOG_FORMAT";
}
