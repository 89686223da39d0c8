//! Argument materialization.
//!
//! The engine hands resolvers plain argument values. Before a resolver runs,
//! arguments typed by an input object or args type are rebuilt into an
//! instance of the declaring Rust type: the declared shape is walked to fill
//! defaults and map enum names back to internal values, then the type's
//! [`InputConstructor`] builds the instance.

use std::any::Any;
use std::sync::{Arc, OnceLock};

use async_graphql::Value;

use crate::error::SchemaError;
use crate::target::InputConstructor;
use crate::value::{Arguments, json_to_graphql_value};
use crate::wrappers::EnumDefinition;

/// Shape of an input value, as far as materialization cares.
#[derive(Debug, Clone)]
pub(crate) enum ValueShape {
    Plain,
    Enum(Arc<EnumDefinition>),
    List(Box<ValueShape>),
    /// Filled once the input object's fields are known; input objects may
    /// refer to themselves.
    Input(Arc<OnceLock<InputObjectShape>>),
}

#[derive(Debug)]
pub(crate) struct InputFieldShape {
    pub name: String,
    pub shape: ValueShape,
    pub default_value: Option<serde_json::Value>,
}

#[derive(Debug)]
pub(crate) struct InputObjectShape {
    pub name: String,
    pub fields: Vec<InputFieldShape>,
    pub constructor: InputConstructor,
}

impl ValueShape {
    fn to_json(&self, value: &Value) -> Result<serde_json::Value, serde_json::Error> {
        match (self, value) {
            (_, Value::Null) => Ok(serde_json::Value::Null),
            (Self::Enum(definition), Value::Enum(name)) => Ok(enum_internal(definition, name.as_str())),
            (Self::Enum(definition), Value::String(name)) => Ok(enum_internal(definition, name)),
            (Self::List(inner), Value::List(items)) => items
                .iter()
                .map(|item| inner.to_json(item))
                .collect::<Result<Vec<_>, _>>()
                .map(serde_json::Value::Array),
            (Self::Input(shape), Value::Object(_)) => match shape.get() {
                Some(shape) => shape.to_json(value),
                None => value.clone().into_json(),
            },
            _ => value.clone().into_json(),
        }
    }
}

fn enum_internal(definition: &EnumDefinition, name: &str) -> serde_json::Value {
    definition
        .internal_of(name)
        .cloned()
        .unwrap_or_else(|| serde_json::Value::String(name.to_string()))
}

impl InputObjectShape {
    /// Converts a raw input object to JSON. Every raw key is copied; declared
    /// fields are converted by their shape and omitted ones get their default.
    fn to_json(&self, value: &Value) -> Result<serde_json::Value, serde_json::Error> {
        let Value::Object(raw) = value else {
            return value.clone().into_json();
        };

        let mut object = serde_json::Map::new();
        for (key, value) in raw {
            object.insert(key.to_string(), value.clone().into_json()?);
        }
        for field in &self.fields {
            match raw.get(field.name.as_str()) {
                Some(value) => {
                    object.insert(field.name.clone(), field.shape.to_json(value)?);
                }
                None => {
                    if let Some(default) = &field.default_value {
                        object.insert(field.name.clone(), default.clone());
                    }
                }
            }
        }
        Ok(serde_json::Value::Object(object))
    }

    fn construct(&self, value: &Value) -> Result<Arc<dyn Any + Send + Sync>, SchemaError> {
        self.to_json(value)
            .and_then(|json| self.constructor.construct(json))
            .map_err(|source| SchemaError::InputConstruction {
                type_name: self.name.clone(),
                source,
            })
    }
}

/// How a field's raw arguments become [`Arguments`].
#[derive(Debug, Clone)]
pub(crate) enum ArgumentMapping {
    None,
    /// A single argument of a scalar-like type, passed by value.
    Raw { name: String, shape: ValueShape },
    /// A single argument of an input object type, materialized.
    Instance {
        name: String,
        shape: Arc<OnceLock<InputObjectShape>>,
    },
    /// All arguments, materialized into the args type.
    Bundle { shape: Arc<OnceLock<InputObjectShape>> },
}

impl ArgumentMapping {
    /// Remaps the raw argument object supplied by the engine.
    pub(crate) fn materialize(&self, raw: &Value) -> Result<Arguments, SchemaError> {
        match self {
            Self::None => Ok(Arguments::None),
            Self::Raw { name, shape } => {
                let value = argument(raw, name);
                let json = shape
                    .to_json(&value)
                    .map_err(|source| SchemaError::InputConstruction {
                        type_name: name.clone(),
                        source,
                    })?;
                Ok(Arguments::Raw(json_to_graphql_value(&json)))
            }
            Self::Instance { name, shape } => {
                let value = argument(raw, name);
                if value == Value::Null {
                    return Ok(Arguments::None);
                }
                let shape = filled(shape, name)?;
                shape.construct(&value).map(Arguments::Instance)
            }
            Self::Bundle { shape } => {
                let shape = filled(shape, "args")?;
                shape.construct(raw).map(Arguments::Instance)
            }
        }
    }
}

fn argument(raw: &Value, name: &str) -> Value {
    match raw {
        Value::Object(map) => map.get(name).cloned().unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

fn filled<'a>(
    shape: &'a OnceLock<InputObjectShape>,
    name: &str,
) -> Result<&'a InputObjectShape, SchemaError> {
    shape.get().ok_or_else(|| SchemaError::TypeNotFound {
        type_name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use async_graphql::Name;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::wrappers::{EnumType, WrapperKind, enum_type};

    #[derive(Debug, Deserialize)]
    struct Inner {
        foo: String,
    }

    #[derive(Debug, Deserialize)]
    struct Outer {
        bar: String,
        input: Inner,
        #[serde(default)]
        limit: i32,
    }

    fn inner_shape() -> Arc<OnceLock<InputObjectShape>> {
        let cell = Arc::new(OnceLock::new());
        let _ = cell.set(InputObjectShape {
            name: "Inner".into(),
            fields: vec![InputFieldShape {
                name: "foo".into(),
                shape: ValueShape::Plain,
                default_value: None,
            }],
            constructor: InputConstructor::of::<Inner>(),
        });
        cell
    }

    fn outer_shape() -> Arc<OnceLock<InputObjectShape>> {
        let cell = Arc::new(OnceLock::new());
        let _ = cell.set(InputObjectShape {
            name: "Outer".into(),
            fields: vec![
                InputFieldShape {
                    name: "bar".into(),
                    shape: ValueShape::Plain,
                    default_value: None,
                },
                InputFieldShape {
                    name: "input".into(),
                    shape: ValueShape::Input(inner_shape()),
                    default_value: None,
                },
                InputFieldShape {
                    name: "limit".into(),
                    shape: ValueShape::Plain,
                    default_value: Some(json!(10)),
                },
            ],
            constructor: InputConstructor::of::<Outer>(),
        });
        cell
    }

    #[test]
    fn test_bundle_materializes_nested_instances() {
        let mapping = ArgumentMapping::Bundle {
            shape: outer_shape(),
        };
        let raw = json_to_graphql_value(&json!({"bar": "x", "input": {"foo": "y"}}));
        let Arguments::Instance(instance) = mapping.materialize(&raw).unwrap() else {
            panic!("expected instance");
        };
        let outer = instance.downcast_ref::<Outer>().unwrap();
        assert_eq!(outer.bar, "x");
        assert_eq!(outer.input.foo, "y");
        assert_eq!(outer.limit, 10);
    }

    #[test]
    fn test_single_input_argument_uses_its_own_value() {
        let mapping = ArgumentMapping::Instance {
            name: "input".into(),
            shape: inner_shape(),
        };
        let raw = json_to_graphql_value(&json!({"input": {"foo": "y"}}));
        let Arguments::Instance(instance) = mapping.materialize(&raw).unwrap() else {
            panic!("expected instance");
        };
        assert_eq!(instance.downcast_ref::<Inner>().unwrap().foo, "y");

        let missing = mapping.materialize(&json_to_graphql_value(&json!({}))).unwrap();
        assert!(matches!(missing, Arguments::None));
    }

    #[test]
    fn test_construction_errors_name_the_type() {
        let mapping = ArgumentMapping::Bundle {
            shape: outer_shape(),
        };
        let raw = json_to_graphql_value(&json!({"bar": 1, "input": {"foo": "y"}}));
        let err = mapping.materialize(&raw).unwrap_err();
        assert!(matches!(err, SchemaError::InputConstruction { type_name, .. } if type_name == "Outer"));
    }

    #[test]
    fn test_raw_enum_argument_maps_to_internal() {
        let wrapper = enum_type(EnumType::new("Color").value("RED", json!("r")));
        let WrapperKind::Enum(definition) = wrapper.kind() else {
            panic!("expected enum");
        };
        let mapping = ArgumentMapping::Raw {
            name: "color".into(),
            shape: ValueShape::List(Box::new(ValueShape::Enum(definition.clone()))),
        };
        let raw = Value::Object(
            [(
                Name::new("color"),
                Value::List(vec![Value::Enum(Name::new("RED"))]),
            )]
            .into_iter()
            .collect(),
        );
        let Arguments::Raw(value) = mapping.materialize(&raw).unwrap() else {
            panic!("expected raw");
        };
        assert_eq!(value, Value::List(vec![Value::String("r".into())]));
    }
}
