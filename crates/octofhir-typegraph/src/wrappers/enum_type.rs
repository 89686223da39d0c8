//! Enum types.
//!
//! Enum values have a GraphQL name and an internal value. Resolvers produce
//! internal values; the wrapper's output hook turns them into names. Arguments
//! travel the other way during argument materialization.

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::{Name, Value};
use heck::{ToPascalCase, ToShoutySnakeCase};

use super::{Transform, Wrapper, WrapperKind};
use crate::value::Resolved;

/// Case applied to enum keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumTypeCase {
    /// `PascalCase`
    Pascal,
    /// `CONSTANT_CASE`
    Constant,
}

impl EnumTypeCase {
    fn apply(self, key: &str) -> String {
        match self {
            Self::Pascal => key.to_pascal_case(),
            Self::Constant => key.to_shouty_snake_case(),
        }
    }
}

/// Per-value overrides.
#[derive(Debug, Clone, Default)]
pub struct EnumValueConfig {
    /// Value description.
    pub description: Option<String>,
    /// Deprecation reason; a present reason marks the value deprecated.
    pub deprecation_reason: Option<String>,
}

/// A compiled enum value.
#[derive(Debug, Clone)]
pub struct EnumValue {
    /// GraphQL name.
    pub name: String,
    /// Internal value.
    pub internal: serde_json::Value,
    /// Value description.
    pub description: Option<String>,
    /// Deprecation reason.
    pub deprecation_reason: Option<String>,
}

/// An enum type.
#[derive(Debug)]
pub struct EnumDefinition {
    name: String,
    description: Option<String>,
    values: Vec<EnumValue>,
}

impl EnumDefinition {
    /// Enum name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enum description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Values in declaration order.
    #[must_use]
    pub fn values(&self) -> &[EnumValue] {
        &self.values
    }

    /// GraphQL name of an internal value.
    #[must_use]
    pub fn name_of(&self, internal: &serde_json::Value) -> Option<&str> {
        self.values
            .iter()
            .find(|value| &value.internal == internal)
            .map(|value| value.name.as_str())
    }

    /// Internal value of a GraphQL name.
    #[must_use]
    pub fn internal_of(&self, name: &str) -> Option<&serde_json::Value> {
        self.values
            .iter()
            .find(|value| value.name == name)
            .map(|value| &value.internal)
    }
}

/// Configuration of an enum type.
#[derive(Debug, Clone)]
pub struct EnumType {
    name: String,
    description: Option<String>,
    case: Option<EnumTypeCase>,
    values: Vec<(String, serde_json::Value)>,
    value_configs: HashMap<String, EnumValueConfig>,
}

impl EnumType {
    /// Creates an enum named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            case: None,
            values: Vec::new(),
            value_configs: HashMap::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a value under `key`.
    #[must_use]
    pub fn value(mut self, key: impl Into<String>, internal: impl Into<serde_json::Value>) -> Self {
        self.values.push((key.into(), internal.into()));
        self
    }

    /// Adds several values.
    #[must_use]
    pub fn values<K, V>(mut self, values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.values
            .extend(values.into_iter().map(|(key, value)| (key.into(), value.into())));
        self
    }

    /// Transforms every key to `case`.
    #[must_use]
    pub fn change_case(mut self, case: EnumTypeCase) -> Self {
        self.case = Some(case);
        self
    }

    /// Overrides description or deprecation of the value under `key` (the key
    /// as given, before any case change).
    #[must_use]
    pub fn value_config(mut self, key: impl Into<String>, config: EnumValueConfig) -> Self {
        self.value_configs.insert(key.into(), config);
        self
    }
}

/// Declares an enum type.
pub fn enum_type(config: EnumType) -> Wrapper {
    let EnumType {
        name,
        description,
        case,
        values,
        mut value_configs,
    } = config;

    let values = values
        .into_iter()
        .map(|(key, internal)| {
            let overrides = value_configs.remove(&key).unwrap_or_default();
            EnumValue {
                name: case.map_or_else(|| key.clone(), |case| case.apply(&key)),
                internal,
                description: overrides.description,
                deprecation_reason: overrides.deprecation_reason,
            }
        })
        .collect();

    let definition = Arc::new(EnumDefinition {
        name,
        description,
        values,
    });

    let lookup = definition.clone();
    let transform: Transform = Arc::new(move |resolved: Resolved| match resolved {
        Resolved::Value(Value::Null) => Resolved::NULL,
        Resolved::Value(value) => {
            let name = value
                .clone()
                .into_json()
                .ok()
                .and_then(|internal| lookup.name_of(&internal).map(Name::new));
            match name {
                Some(name) => Resolved::Value(Value::Enum(name)),
                None => Resolved::Value(value),
            }
        }
        other => other,
    });

    Wrapper::new(WrapperKind::Enum(definition), Some(transform))
}
