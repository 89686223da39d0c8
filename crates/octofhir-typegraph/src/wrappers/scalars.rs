//! Built-in and custom scalars.

use std::fmt;
use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::TypeRef;

use super::{Transform, Wrapper, WrapperKind};
use crate::value::Resolved;

type SerializeFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// A scalar type.
pub struct ScalarDefinition {
    name: String,
    description: Option<String>,
    builtin: bool,
}

impl ScalarDefinition {
    fn builtin(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            builtin: true,
        }
    }

    /// Scalar name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scalar description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether the engine already knows this scalar.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.builtin
    }
}

impl fmt::Debug for ScalarDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarDefinition")
            .field("name", &self.name)
            .field("builtin", &self.builtin)
            .finish()
    }
}

fn builtin(name: &str) -> Wrapper {
    Wrapper::new(
        WrapperKind::Scalar(Arc::new(ScalarDefinition::builtin(name))),
        None,
    )
}

/// `String`.
pub fn string() -> Wrapper {
    builtin(TypeRef::STRING)
}

/// `Int`.
pub fn int() -> Wrapper {
    builtin(TypeRef::INT)
}

/// `Float`.
pub fn float() -> Wrapper {
    builtin(TypeRef::FLOAT)
}

/// `Boolean`.
pub fn boolean() -> Wrapper {
    builtin(TypeRef::BOOLEAN)
}

/// `ID`.
pub fn id() -> Wrapper {
    builtin(TypeRef::ID)
}

/// Configuration of a custom scalar.
#[derive(Clone)]
pub struct ScalarType {
    name: String,
    description: Option<String>,
    serialize: Option<SerializeFn>,
}

impl ScalarType {
    /// Creates a scalar named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            serialize: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the output serializer, applied to every value a field of this
    /// scalar type resolves to.
    #[must_use]
    pub fn serialize<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.serialize = Some(Arc::new(f));
        self
    }
}

/// Declares a custom scalar.
pub fn scalar_type(config: ScalarType) -> Wrapper {
    let transform = config.serialize.map(|serialize| {
        Arc::new(move |value: Resolved| match value {
            Resolved::Value(value) => Resolved::Value(serialize(value)),
            other => other,
        }) as Transform
    });
    let definition = ScalarDefinition {
        name: config.name,
        description: config.description,
        builtin: false,
    };
    Wrapper::new(WrapperKind::Scalar(Arc::new(definition)), transform)
}
