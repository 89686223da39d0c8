//! Declaring type handles.
//!
//! A [`Target`] identifies the Rust type a declaration belongs to. It plays the
//! role of the class in a decorator-based API: nodes are keyed by it and
//! runtime instances carry it as their discriminant.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::de::DeserializeOwned;

/// Handle to a declaring Rust type.
#[derive(Clone, Copy)]
pub struct Target {
    id: TypeId,
    type_name: &'static str,
}

impl Target {
    /// Returns the handle for `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Returns the `TypeId` of the declaring type.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Returns the fully qualified Rust type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the unqualified type name (`my_app::model::User` -> `User`).
    #[must_use]
    pub fn name(&self) -> &'static str {
        short_type_name(self.type_name)
    }
}

impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Target {}

impl Hash for Target {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Target").field(&self.type_name).finish()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strips the module path and generic arguments from a type name.
fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

type ConstructFn =
    dyn Fn(serde_json::Value) -> Result<Arc<dyn Any + Send + Sync>, serde_json::Error> + Send + Sync;

/// Builds instances of an input or args type from plain JSON.
#[derive(Clone)]
pub struct InputConstructor {
    target: Target,
    construct: Arc<ConstructFn>,
}

impl InputConstructor {
    /// Returns a constructor deserializing into `T`.
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        Self {
            target: Target::of::<T>(),
            construct: Arc::new(|value| {
                let instance: T = serde_json::from_value(value)?;
                Ok(Arc::new(instance) as Arc<dyn Any + Send + Sync>)
            }),
        }
    }

    /// Returns the type this constructor builds.
    #[must_use]
    pub fn target(&self) -> Target {
        self.target
    }

    /// Builds an instance from `value`.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error if `value` does not fit the type.
    pub fn construct(
        &self,
        value: serde_json::Value,
    ) -> Result<Arc<dyn Any + Send + Sync>, serde_json::Error> {
        (self.construct)(value)
    }
}

impl fmt::Debug for InputConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputConstructor")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        foo: String,
    }

    struct Wrapper<T>(T);

    #[test]
    fn test_short_names() {
        assert_eq!(Target::of::<Sample>().name(), "Sample");
        assert_eq!(Target::of::<Wrapper<Sample>>().name(), "Wrapper");
        assert_eq!(Target::of::<String>().name(), "String");
    }

    #[test]
    fn test_identity_is_type_id() {
        assert_eq!(Target::of::<Sample>(), Target::of::<Sample>());
        assert_ne!(Target::of::<Sample>(), Target::of::<String>());
    }

    #[test]
    fn test_constructor_builds_typed_instance() {
        let constructor = InputConstructor::of::<Sample>();
        let instance = constructor
            .construct(serde_json::json!({"foo": "bar"}))
            .unwrap();
        let sample = instance.downcast_ref::<Sample>().unwrap();
        assert_eq!(sample.foo, "bar");
        assert_eq!(constructor.target(), Target::of::<Sample>());
    }

    #[test]
    fn test_constructor_reports_shape_errors() {
        let constructor = InputConstructor::of::<Sample>();
        assert!(constructor.construct(serde_json::json!({"foo": 1})).is_err());
    }
}
