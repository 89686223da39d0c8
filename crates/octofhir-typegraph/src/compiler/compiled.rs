//! Compiled type descriptors.
//!
//! Compiled types are shared behind `Arc` so that compiling a node twice
//! yields the same value. They convert into async-graphql dynamic types when a
//! schema is built.

use std::sync::Arc;

use async_graphql::dynamic::{
    Enum, EnumItem, Field, FieldFuture, InputObject, InputValue, Interface, InterfaceField, Object,
    Scalar, SchemaBuilder, TypeRef, Union,
};
use indexmap::IndexMap;

use super::resolver::{FieldResolver, TypeResolver};
use crate::value::json_to_graphql_value;
use crate::wrappers::{EnumDefinition, ScalarDefinition, Transform};

/// Kind of the named type at the core of a type reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedKind {
    Object,
    Interface,
    Union,
    InputObject,
    Scalar,
    Enum,
}

impl NamedKind {
    /// Whether the kind can be a field type.
    #[must_use]
    pub fn is_output(self) -> bool {
        !matches!(self, Self::InputObject)
    }

    /// Whether the kind can be an argument or input field type.
    #[must_use]
    pub fn is_input(self) -> bool {
        matches!(self, Self::InputObject | Self::Scalar | Self::Enum)
    }
}

/// A compiled type reference.
#[derive(Clone)]
pub struct CompiledRef {
    /// Reference as handed to the engine, modifiers included.
    pub type_ref: TypeRef,
    /// Kind of the innermost named type.
    pub named: NamedKind,
    pub(crate) transform: Option<Transform>,
    pub(crate) type_resolver: Option<Arc<TypeResolver>>,
}

impl CompiledRef {
    /// Whether the reference carries no list or non-null modifier.
    #[must_use]
    pub fn is_named(&self) -> bool {
        matches!(self.type_ref, TypeRef::Named(_))
    }

    /// Whether the reference is non-null at the top level.
    #[must_use]
    pub fn is_non_null(&self) -> bool {
        matches!(self.type_ref, TypeRef::NonNull(_))
    }

    /// Whether results pass through an output hook.
    #[must_use]
    pub fn has_transform(&self) -> bool {
        self.transform.is_some()
    }
}

impl std::fmt::Debug for CompiledRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledRef")
            .field("type_ref", &self.type_ref.to_string())
            .field("named", &self.named)
            .finish_non_exhaustive()
    }
}

/// An argument or input field.
#[derive(Debug, Clone)]
pub struct CompiledInputValue {
    pub name: String,
    pub description: Option<String>,
    pub type_ref: TypeRef,
    pub default_value: Option<serde_json::Value>,
}

impl CompiledInputValue {
    fn to_dynamic(&self) -> InputValue {
        let mut value = InputValue::new(self.name.clone(), self.type_ref.clone());
        if let Some(description) = &self.description {
            value = value.description(description.clone());
        }
        if let Some(default) = &self.default_value {
            value = value.default_value(json_to_graphql_value(default));
        }
        value
    }
}

/// An output field with its resolver.
#[derive(Debug, Clone)]
pub struct CompiledField {
    pub name: String,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
    pub type_ref: TypeRef,
    pub args: IndexMap<String, CompiledInputValue>,
    pub resolver: Arc<FieldResolver>,
}

impl CompiledField {
    fn to_dynamic(&self) -> Field {
        let resolver = self.resolver.clone();
        let mut field = Field::new(self.name.clone(), self.type_ref.clone(), move |ctx| {
            let resolver = resolver.clone();
            FieldFuture::new(async move { resolver.resolve_in(&ctx).await })
        });
        if let Some(description) = &self.description {
            field = field.description(description.clone());
        }
        if let Some(reason) = &self.deprecation_reason {
            field = field.deprecation(Some(reason.as_str()));
        }
        for arg in self.args.values() {
            field = field.argument(arg.to_dynamic());
        }
        field
    }

    fn to_interface_field(&self) -> InterfaceField {
        let mut field = InterfaceField::new(self.name.clone(), self.type_ref.clone());
        if let Some(description) = &self.description {
            field = field.description(description.clone());
        }
        if let Some(reason) = &self.deprecation_reason {
            field = field.deprecation(Some(reason.as_str()));
        }
        for arg in self.args.values() {
            field = field.argument(arg.to_dynamic());
        }
        field
    }
}

/// A compiled object type.
#[derive(Debug)]
pub struct CompiledObject {
    pub name: String,
    pub description: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: IndexMap<String, CompiledField>,
}

impl CompiledObject {
    /// Converts into the engine's object type.
    #[must_use]
    pub fn to_dynamic(&self) -> Object {
        let mut object = Object::new(self.name.clone());
        if let Some(description) = &self.description {
            object = object.description(description.clone());
        }
        for interface in &self.interfaces {
            object = object.implement(interface.clone());
        }
        for field in self.fields.values() {
            object = object.field(field.to_dynamic());
        }
        object
    }
}

/// A compiled interface type.
#[derive(Debug)]
pub struct CompiledInterface {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, CompiledField>,
    pub type_resolver: Arc<TypeResolver>,
}

impl CompiledInterface {
    /// Converts into the engine's interface type.
    #[must_use]
    pub fn to_dynamic(&self) -> Interface {
        let mut interface = Interface::new(self.name.clone());
        if let Some(description) = &self.description {
            interface = interface.description(description.clone());
        }
        for field in self.fields.values() {
            interface = interface.field(field.to_interface_field());
        }
        interface
    }
}

/// A compiled input object type.
#[derive(Debug)]
pub struct CompiledInputObject {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, CompiledInputValue>,
}

impl CompiledInputObject {
    /// Converts into the engine's input object type.
    #[must_use]
    pub fn to_dynamic(&self) -> InputObject {
        let mut input = InputObject::new(self.name.clone());
        if let Some(description) = &self.description {
            input = input.description(description.clone());
        }
        for field in self.fields.values() {
            input = input.field(field.to_dynamic());
        }
        input
    }
}

/// A compiled union type.
#[derive(Debug)]
pub struct CompiledUnion {
    pub name: String,
    pub description: Option<String>,
    pub possible_types: Vec<String>,
    pub type_resolver: Arc<TypeResolver>,
}

impl CompiledUnion {
    /// Converts into the engine's union type.
    #[must_use]
    pub fn to_dynamic(&self) -> Union {
        let mut union = Union::new(self.name.clone());
        if let Some(description) = &self.description {
            union = union.description(description.clone());
        }
        for possible_type in &self.possible_types {
            union = union.possible_type(possible_type.clone());
        }
        union
    }
}

fn enum_to_dynamic(definition: &EnumDefinition) -> Enum {
    let mut enum_type = Enum::new(definition.name());
    if let Some(description) = definition.description() {
        enum_type = enum_type.description(description);
    }
    for value in definition.values() {
        let mut item = EnumItem::new(value.name.clone());
        if let Some(description) = &value.description {
            item = item.description(description.clone());
        }
        if let Some(reason) = &value.deprecation_reason {
            item = item.deprecation(Some(reason.as_str()));
        }
        enum_type = enum_type.item(item);
    }
    enum_type
}

fn scalar_to_dynamic(definition: &ScalarDefinition) -> Scalar {
    let mut scalar = Scalar::new(definition.name());
    if let Some(description) = definition.description() {
        scalar = scalar.description(description);
    }
    scalar
}

/// Any compiled named type.
#[derive(Debug, Clone)]
pub enum CompiledType {
    Object(Arc<CompiledObject>),
    Interface(Arc<CompiledInterface>),
    InputObject(Arc<CompiledInputObject>),
    Union(Arc<CompiledUnion>),
    Enum(Arc<EnumDefinition>),
    Scalar(Arc<ScalarDefinition>),
}

impl CompiledType {
    /// Type name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Object(object) => &object.name,
            Self::Interface(interface) => &interface.name,
            Self::InputObject(input) => &input.name,
            Self::Union(union) => &union.name,
            Self::Enum(definition) => definition.name(),
            Self::Scalar(definition) => definition.name(),
        }
    }

    /// Kind of the type.
    #[must_use]
    pub fn kind(&self) -> NamedKind {
        match self {
            Self::Object(_) => NamedKind::Object,
            Self::Interface(_) => NamedKind::Interface,
            Self::InputObject(_) => NamedKind::InputObject,
            Self::Union(_) => NamedKind::Union,
            Self::Enum(_) => NamedKind::Enum,
            Self::Scalar(_) => NamedKind::Scalar,
        }
    }

    /// Registers the type with a schema under construction. Built-in scalars
    /// are known to the engine and skipped.
    #[must_use]
    pub fn register(&self, builder: SchemaBuilder) -> SchemaBuilder {
        match self {
            Self::Object(object) => builder.register(object.to_dynamic()),
            Self::Interface(interface) => builder.register(interface.to_dynamic()),
            Self::InputObject(input) => builder.register(input.to_dynamic()),
            Self::Union(union) => builder.register(union.to_dynamic()),
            Self::Enum(definition) => builder.register(enum_to_dynamic(definition)),
            Self::Scalar(definition) if definition.is_builtin() => builder,
            Self::Scalar(definition) => builder.register(scalar_to_dynamic(definition)),
        }
    }
}
