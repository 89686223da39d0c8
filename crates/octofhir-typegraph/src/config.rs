//! Schema compilation configuration.
//!
//! Configuration can be specified in `octofhir.toml` under the `[schema]` section.
//!
//! # Example Configuration
//!
//! ```toml
//! [schema]
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! reject_orphaned_declarations = true
//! ```

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Configuration for compiling a type graph into an executable schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Maximum query depth allowed by the engine.
    /// Default: 15
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum query complexity allowed by the engine.
    /// Default: 500
    #[serde(default = "default_max_complexity")]
    pub max_complexity: usize,

    /// Enable GraphQL introspection queries.
    /// Default: true
    #[serde(default = "default_introspection")]
    pub introspection: bool,

    /// Fail compilation when members were declared for a type that was
    /// never declared itself, or args for a field that was never declared.
    /// When false, such declarations are logged and ignored.
    /// Default: true
    #[serde(default = "default_reject_orphaned_declarations")]
    pub reject_orphaned_declarations: bool,
}

fn default_max_depth() -> usize {
    15
}

fn default_max_complexity() -> usize {
    500
}

fn default_introspection() -> bool {
    true
}

fn default_reject_orphaned_declarations() -> bool {
    true
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_complexity: default_max_complexity(),
            introspection: default_introspection(),
            reject_orphaned_declarations: default_reject_orphaned_declarations(),
        }
    }
}

impl SchemaConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration values are invalid.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.max_depth == 0 {
            return Err(SchemaError::InvalidConfig("schema.max_depth must be > 0".into()));
        }
        if self.max_complexity == 0 {
            return Err(SchemaError::InvalidConfig(
                "schema.max_complexity must be > 0".into(),
            ));
        }
        Ok(())
    }
}
