//! Union types.

use std::sync::Arc;

use super::{Wrapper, WrapperKind};
use crate::target::Target;

/// A union of declared object types.
#[derive(Debug)]
pub struct UnionDefinition {
    name: String,
    description: Option<String>,
    members: Vec<Target>,
}

impl UnionDefinition {
    /// Union name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Union description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Member types, in declaration order.
    #[must_use]
    pub fn members(&self) -> &[Target] {
        &self.members
    }
}

/// Configuration of a union type.
#[derive(Debug, Clone)]
pub struct UnionType {
    name: String,
    description: Option<String>,
    members: Vec<Target>,
}

impl UnionType {
    /// Creates a union named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            members: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds the declared object type `T` as a member.
    #[must_use]
    pub fn member<T: 'static>(mut self) -> Self {
        self.members.push(Target::of::<T>());
        self
    }
}

/// Declares a union type. At runtime a value is resolved to the member whose
/// declaring type matches the value's tag.
pub fn union_type(config: UnionType) -> Wrapper {
    let definition = UnionDefinition {
        name: config.name,
        description: config.description,
        members: config.members,
    };
    Wrapper::new(WrapperKind::Union(Arc::new(definition)), None)
}
