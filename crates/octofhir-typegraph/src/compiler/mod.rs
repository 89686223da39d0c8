//! Compiler from type graph nodes to executable schema types.
//!
//! Every object, interface and input object node is compiled at most once per
//! [`Compiler`]; later requests return the memoized `Arc`. Nodes reference each
//! other by name, so a node that is still being compiled (a type referring to
//! itself, directly or through other types) is only referenced, not compiled
//! again.

mod arguments;
mod compiled;
mod resolver;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use async_graphql::dynamic::TypeRef;
use indexmap::IndexMap;
use tracing::trace;

pub use compiled::{
    CompiledField, CompiledInputObject, CompiledInputValue, CompiledInterface, CompiledObject,
    CompiledRef, CompiledType, CompiledUnion, NamedKind,
};
pub use resolver::{AbstractKind, FieldResolver, TypeResolver};

use self::arguments::{ArgumentMapping, InputFieldShape, InputObjectShape, ValueShape};
use crate::Result;
use crate::error::SchemaError;
use crate::graph::{FieldMetadata, Node, NodeId, Registry, WrapperOrNode, validate_name};
use crate::target::Target;
use crate::value::Lineage;
use crate::wrappers::{UnionDefinition, Wrapper, WrapperKind};

/// Memoizing compiler over one registry.
pub struct Compiler<'r> {
    registry: &'r Registry,
    objects: IndexMap<NodeId, Arc<CompiledObject>>,
    interfaces: IndexMap<NodeId, Arc<CompiledInterface>>,
    input_objects: IndexMap<NodeId, Arc<CompiledInputObject>>,
    /// Nodes whose compilation is in progress.
    generating: HashSet<NodeId>,
    type_resolvers: HashMap<NodeId, Arc<TypeResolver>>,
    input_shapes: HashMap<NodeId, Arc<OnceLock<InputObjectShape>>>,
    /// Custom scalars, enums and unions by name.
    wrappers: IndexMap<String, CompiledType>,
    union_members: HashMap<String, Vec<Target>>,
    lineage: Arc<Lineage>,
}

impl<'r> Compiler<'r> {
    /// Creates a compiler for `registry`.
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            objects: IndexMap::new(),
            interfaces: IndexMap::new(),
            input_objects: IndexMap::new(),
            generating: HashSet::new(),
            type_resolvers: HashMap::new(),
            input_shapes: HashMap::new(),
            wrappers: IndexMap::new(),
            union_members: HashMap::new(),
            lineage: Arc::new(lineage(registry)),
        }
    }

    /// Compiles a type reference, wrapping it in non-null when `non_null` is
    /// set and the type is not marked nullable.
    ///
    /// # Errors
    ///
    /// Fails when the node is not an object, interface or input object, and
    /// propagates errors from compiling the referenced types.
    pub fn compile_type(&mut self, ty: &WrapperOrNode, non_null: bool) -> Result<CompiledRef> {
        let (mut compiled, nullable) = match ty {
            WrapperOrNode::Node(id) => (self.compile_node_ref(*id)?, false),
            WrapperOrNode::Wrapper(wrapper) => (self.compile_wrapper(wrapper)?, wrapper.is_nullable()),
        };
        if non_null && !nullable {
            compiled.type_ref = TypeRef::NonNull(Box::new(compiled.type_ref));
        }
        Ok(compiled)
    }

    /// Compiles a type reference that must be a named type, returning its
    /// definition.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotNamedType` for lists and non-null types.
    pub fn compile_named_type(&mut self, ty: &WrapperOrNode) -> Result<CompiledType> {
        let compiled = self.compile_type(ty, false)?;
        if !compiled.is_named() {
            return Err(SchemaError::NotNamedType {
                type_name: compiled.type_ref.to_string(),
            });
        }

        let definition = match ty {
            WrapperOrNode::Node(id) => match self.registry.node(*id) {
                Node::Object(_) => self.objects.get(id).cloned().map(CompiledType::Object),
                Node::Interface(_) => self.interfaces.get(id).cloned().map(CompiledType::Interface),
                Node::InputObject(_) => self
                    .input_objects
                    .get(id)
                    .cloned()
                    .map(CompiledType::InputObject),
                _ => None,
            },
            WrapperOrNode::Wrapper(wrapper) => match wrapper.kind() {
                WrapperKind::Scalar(scalar) if scalar.is_builtin() => {
                    Some(CompiledType::Scalar(scalar.clone()))
                }
                _ => self.wrappers.get(&compiled.type_ref.to_string()).cloned(),
            },
        };
        definition.ok_or_else(|| SchemaError::TypeNotFound {
            type_name: compiled.type_ref.to_string(),
        })
    }

    /// Compiles a field type, which must be an object, interface, union,
    /// scalar or enum, possibly wrapped.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotOutputType` for input object types.
    pub fn compile_output_type(
        &mut self,
        ty: &WrapperOrNode,
        non_null: bool,
        type_name: &str,
        field: &str,
    ) -> Result<CompiledRef> {
        let compiled = self.compile_type(ty, non_null)?;
        if !compiled.named.is_output() {
            return Err(SchemaError::NotOutputType {
                type_name: type_name.to_string(),
                field: field.to_string(),
            });
        }
        Ok(compiled)
    }

    /// Compiles an argument or input field type, which must be an input
    /// object, scalar or enum, possibly wrapped.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotInputType` for output types.
    pub fn compile_input_type(
        &mut self,
        ty: &WrapperOrNode,
        non_null: bool,
        type_name: &str,
        field: &str,
    ) -> Result<CompiledRef> {
        let compiled = self.compile_type(ty, non_null)?;
        if !compiled.named.is_input() {
            return Err(SchemaError::NotInputType {
                type_name: type_name.to_string(),
                field: field.to_string(),
            });
        }
        Ok(compiled)
    }

    /// Compiles an object type.
    ///
    /// Interfaces implemented anywhere on the ancestor chain are implemented
    /// too. Fields are flattened from those interfaces, then from ancestors
    /// (farthest first), then from the object itself; later fields replace
    /// earlier ones of the same name. Between interfaces, the one whose
    /// `implements` came first wins.
    ///
    /// # Errors
    ///
    /// Propagates ancestor chain, metadata and type errors.
    pub fn compile_object_type(&mut self, id: NodeId) -> Result<Arc<CompiledObject>> {
        if let Some(compiled) = self.objects.get(&id) {
            return Ok(compiled.clone());
        }
        let registry = self.registry;
        let node = registry.node(id);
        let object = node.as_object().ok_or_else(|| SchemaError::NotAnObject {
            type_name: node.display_name(),
        })?;
        trace!(type_name = %object.metadata.name, "Compiling object type");

        self.generating.insert(id);
        let result = self.build_object(id);
        self.generating.remove(&id);

        let (interfaces, fields) = result?;
        let compiled = Arc::new(CompiledObject {
            name: object.metadata.name.clone(),
            description: object.metadata.description.clone(),
            interfaces,
            fields,
        });
        self.objects.insert(id, compiled.clone());
        Ok(compiled)
    }

    fn build_object(
        &mut self,
        id: NodeId,
    ) -> Result<(Vec<String>, IndexMap<String, CompiledField>)> {
        let registry = self.registry;
        let chain = registry.object_chain(id)?;
        let owner = registry.node(id).display_name();

        let mut interface_ids: Vec<NodeId> = Vec::new();
        for member in &chain {
            let Some(object) = registry.node(*member).as_object() else {
                continue;
            };
            for implement in &object.implement_nodes {
                if let Some(edge) = registry.node(*implement).as_implement()
                    && !interface_ids.contains(&edge.interface_node)
                {
                    interface_ids.push(edge.interface_node);
                }
            }
        }

        let mut field_nodes: IndexMap<String, NodeId> = IndexMap::new();
        for interface in &interface_ids {
            let Some(interface) = registry.node(*interface).as_interface() else {
                continue;
            };
            for field in &interface.field_nodes {
                if let Some(name) = registry.member_name(*field) {
                    field_nodes.entry(name.to_string()).or_insert(*field);
                }
            }
        }
        for member in chain.iter().rev() {
            let Some(object) = registry.node(*member).as_object() else {
                continue;
            };
            for field in &object.field_nodes {
                if let Some(name) = registry.member_name(*field) {
                    field_nodes.insert(name.to_string(), *field);
                }
            }
        }

        let mut interfaces = Vec::with_capacity(interface_ids.len());
        for interface in interface_ids {
            self.compile_type(&WrapperOrNode::Node(interface), false)?;
            interfaces.push(registry.node(interface).display_name());
        }

        let field_nodes: Vec<NodeId> = field_nodes.into_values().collect();
        let fields = self.compile_field_config_map(&owner, &field_nodes)?;
        Ok((interfaces, fields))
    }

    /// Compiles an interface type and every object implementing it.
    ///
    /// # Errors
    ///
    /// Propagates metadata and type errors.
    pub fn compile_interface_type(&mut self, id: NodeId) -> Result<Arc<CompiledInterface>> {
        if let Some(compiled) = self.interfaces.get(&id) {
            return Ok(compiled.clone());
        }
        let registry = self.registry;
        let node = registry.node(id);
        let interface = node.as_interface().ok_or_else(|| SchemaError::NotAnInterface {
            type_name: node.display_name(),
            interface: node.display_name(),
        })?;
        trace!(type_name = %interface.metadata.name, "Compiling interface type");

        self.generating.insert(id);
        let result = self.compile_field_config_map(&interface.metadata.name, &interface.field_nodes);
        self.generating.remove(&id);

        let compiled = Arc::new(CompiledInterface {
            name: interface.metadata.name.clone(),
            description: interface.metadata.description.clone(),
            fields: result?,
            type_resolver: self.interface_resolver(id)?,
        });
        self.interfaces.insert(id, compiled.clone());

        for implementer in registry.implementers(id)? {
            self.ensure_compiled(implementer)?;
        }
        Ok(compiled)
    }

    /// Compiles an input object type.
    ///
    /// # Errors
    ///
    /// Propagates metadata and type errors.
    pub fn compile_input_object_type(&mut self, id: NodeId) -> Result<Arc<CompiledInputObject>> {
        if let Some(compiled) = self.input_objects.get(&id) {
            return Ok(compiled.clone());
        }
        let registry = self.registry;
        let node = registry.node(id);
        let input = node.as_input_object().ok_or_else(|| SchemaError::TypeNotFound {
            type_name: node.display_name(),
        })?;
        trace!(type_name = %input.metadata.name, "Compiling input object type");

        self.generating.insert(id);
        let result = self.compile_input_values(&input.metadata.name, &input.input_fields);
        self.generating.remove(&id);

        let compiled = Arc::new(CompiledInputObject {
            name: input.metadata.name.clone(),
            description: input.metadata.description.clone(),
            fields: result?,
        });
        self.input_objects.insert(id, compiled.clone());
        Ok(compiled)
    }

    /// Compiles output fields into a field map. Fields later in `field_nodes`
    /// replace earlier ones of the same name.
    ///
    /// # Errors
    ///
    /// Propagates metadata, type and argument errors.
    pub fn compile_field_config_map(
        &mut self,
        type_name: &str,
        field_nodes: &[NodeId],
    ) -> Result<IndexMap<String, CompiledField>> {
        let mut fields = IndexMap::with_capacity(field_nodes.len());
        for id in field_nodes {
            let metadata = self.registry.field_metadata(*id)?;
            let output = self.compile_output_type(&metadata.ty, true, type_name, &metadata.name)?;
            let (args, arguments) = self.create_arg_map(type_name, &metadata)?;
            let resolver =
                build_resolver(&metadata, &output, arguments).with_lineage(self.lineage.clone());
            trace!(type_name = %type_name, field = %metadata.name, ty = %output.type_ref, "Compiled field");

            fields.insert(
                metadata.name.clone(),
                CompiledField {
                    name: metadata.name,
                    description: metadata.description,
                    deprecation_reason: metadata.deprecation_reason,
                    type_ref: output.type_ref,
                    args,
                    resolver: Arc::new(resolver),
                },
            );
        }
        Ok(fields)
    }

    /// Builds the argument map of a field and the mapping that materializes
    /// its raw arguments.
    ///
    /// # Errors
    ///
    /// Fails when both `arg` and `args` are set, when the args type has no
    /// input fields and on input type errors.
    pub(crate) fn create_arg_map(
        &mut self,
        type_name: &str,
        metadata: &FieldMetadata,
    ) -> Result<(IndexMap<String, CompiledInputValue>, ArgumentMapping)> {
        let registry = self.registry;
        match (&metadata.arg, metadata.args) {
            (Some(_), Some(_)) => Err(SchemaError::ArgAndArgs {
                type_name: type_name.to_string(),
                field: metadata.name.clone(),
            }),
            (Some(arg), None) => {
                let name = arg.metadata.name.clone();
                let compiled = self.compile_input_type(&arg.ty, true, type_name, &name)?;
                let mapping = match &arg.ty {
                    WrapperOrNode::Node(id) if registry.node(*id).is_input_object_node() => {
                        ArgumentMapping::Instance {
                            name: name.clone(),
                            shape: self.input_shape(*id)?,
                        }
                    }
                    ty => ArgumentMapping::Raw {
                        name: name.clone(),
                        shape: self.value_shape(ty)?,
                    },
                };
                let value = CompiledInputValue {
                    name: name.clone(),
                    description: arg.metadata.description.clone(),
                    type_ref: compiled.type_ref,
                    default_value: arg.metadata.default_value.clone(),
                };
                Ok((IndexMap::from([(name, value)]), mapping))
            }
            (None, Some(args)) => {
                let node = registry.node(args);
                let input_fields = node.input_fields().unwrap_or_default();
                if input_fields.is_empty() {
                    return Err(SchemaError::NoArgsFound {
                        type_name: node.target().name().to_string(),
                    });
                }
                let values = self.compile_input_values(node.target().name(), input_fields)?;
                let mapping = ArgumentMapping::Bundle {
                    shape: self.input_shape(args)?,
                };
                Ok((values, mapping))
            }
            (None, None) => Ok((IndexMap::new(), ArgumentMapping::None)),
        }
    }

    fn compile_input_values(
        &mut self,
        type_name: &str,
        input_fields: &[NodeId],
    ) -> Result<IndexMap<String, CompiledInputValue>> {
        let mut values = IndexMap::with_capacity(input_fields.len());
        for id in input_fields {
            let metadata = self.registry.input_field_metadata(*id)?;
            let compiled = self.compile_input_type(&metadata.ty, true, type_name, &metadata.name)?;
            values.insert(
                metadata.name.clone(),
                CompiledInputValue {
                    name: metadata.name,
                    description: metadata.description,
                    type_ref: compiled.type_ref,
                    default_value: metadata.default_value,
                },
            );
        }
        Ok(values)
    }

    /// Every type compiled so far: input objects, interfaces, objects, then
    /// custom scalars, enums and unions.
    #[must_use]
    pub fn definitions(&self) -> Vec<CompiledType> {
        self.input_objects
            .values()
            .cloned()
            .map(CompiledType::InputObject)
            .chain(self.interfaces.values().cloned().map(CompiledType::Interface))
            .chain(self.objects.values().cloned().map(CompiledType::Object))
            .chain(self.wrappers.values().cloned())
            .collect()
    }

    fn compile_node_ref(&mut self, id: NodeId) -> Result<CompiledRef> {
        let node = self.registry.node(id);
        let named = match node {
            Node::Object(_) => NamedKind::Object,
            Node::Interface(_) => NamedKind::Interface,
            Node::InputObject(_) => NamedKind::InputObject,
            _ => {
                return Err(SchemaError::TypeNotFound {
                    type_name: node.display_name(),
                });
            }
        };
        self.ensure_compiled(id)?;
        let type_resolver = match named {
            NamedKind::Interface => Some(self.interface_resolver(id)?),
            _ => None,
        };
        Ok(CompiledRef {
            type_ref: TypeRef::named(node.display_name()),
            named,
            transform: None,
            type_resolver,
        })
    }

    fn compile_wrapper(&mut self, wrapper: &Wrapper) -> Result<CompiledRef> {
        let transform = wrapper.transform_output().cloned();
        match wrapper.kind() {
            WrapperKind::Scalar(scalar) => {
                if !scalar.is_builtin() && !self.wrappers.contains_key(scalar.name()) {
                    validate_name(scalar.name())?;
                    self.wrappers
                        .insert(scalar.name().to_string(), CompiledType::Scalar(scalar.clone()));
                }
                Ok(CompiledRef {
                    type_ref: TypeRef::named(scalar.name()),
                    named: NamedKind::Scalar,
                    transform,
                    type_resolver: None,
                })
            }
            WrapperKind::Enum(definition) => {
                if !self.wrappers.contains_key(definition.name()) {
                    validate_name(definition.name())?;
                    for value in definition.values() {
                        validate_name(&value.name)?;
                    }
                    self.wrappers.insert(
                        definition.name().to_string(),
                        CompiledType::Enum(definition.clone()),
                    );
                }
                Ok(CompiledRef {
                    type_ref: TypeRef::named(definition.name()),
                    named: NamedKind::Enum,
                    transform,
                    type_resolver: None,
                })
            }
            WrapperKind::Union(definition) => {
                let type_resolver = self.compile_union(definition)?;
                Ok(CompiledRef {
                    type_ref: TypeRef::named(definition.name()),
                    named: NamedKind::Union,
                    transform,
                    type_resolver: Some(type_resolver),
                })
            }
            WrapperKind::List(inner) => {
                let inner = self.registry.resolve_type_spec(inner)?;
                let inner = self.compile_type(&inner, true)?;
                Ok(CompiledRef {
                    type_ref: TypeRef::List(Box::new(inner.type_ref)),
                    named: inner.named,
                    transform,
                    type_resolver: inner.type_resolver,
                })
            }
            WrapperKind::Nullable(inner) => {
                let inner = self.registry.resolve_type_spec(inner)?;
                let inner = self.compile_type(&inner, false)?;
                Ok(CompiledRef {
                    transform,
                    ..inner
                })
            }
        }
    }

    fn compile_union(&mut self, definition: &UnionDefinition) -> Result<Arc<TypeResolver>> {
        match self.wrappers.get(definition.name()) {
            Some(CompiledType::Union(union))
                if self.union_members.get(definition.name()).map(Vec::as_slice)
                    == Some(definition.members()) =>
            {
                return Ok(union.type_resolver.clone());
            }
            Some(_) => {
                return Err(SchemaError::NameCollision {
                    type_name: definition.name().to_string(),
                });
            }
            None => {}
        }
        validate_name(definition.name())?;
        let registry = self.registry;

        let mut possible_types = Vec::with_capacity(definition.members().len());
        let mut entries = Vec::new();
        let mut descendants = Vec::new();
        for member in definition.members() {
            let id = registry.get_node(*member)?;
            let node = registry.node(id);
            if !node.is_object_node() {
                return Err(SchemaError::NotAnObject {
                    type_name: node.display_name(),
                });
            }
            self.ensure_compiled(id)?;
            let name = node.display_name();
            entries.push((member.type_id(), name.clone()));
            for descendant in registry.descendants(id)? {
                descendants.push((registry.node(descendant).target().type_id(), name.clone()));
            }
            possible_types.push(name);
        }
        entries.extend(descendants);
        self.union_members
            .insert(definition.name().to_string(), definition.members().to_vec());

        let type_resolver = Arc::new(TypeResolver::new(
            definition.name(),
            AbstractKind::Union,
            entries,
        ));
        self.wrappers.insert(
            definition.name().to_string(),
            CompiledType::Union(Arc::new(CompiledUnion {
                name: definition.name().to_string(),
                description: definition.description().map(str::to_string),
                possible_types,
                type_resolver: type_resolver.clone(),
            })),
        );
        Ok(type_resolver)
    }

    fn interface_resolver(&mut self, id: NodeId) -> Result<Arc<TypeResolver>> {
        if let Some(type_resolver) = self.type_resolvers.get(&id) {
            return Ok(type_resolver.clone());
        }
        let registry = self.registry;
        let entries = registry
            .implementers(id)?
            .into_iter()
            .map(|implementer| {
                let node = registry.node(implementer);
                (node.target().type_id(), node.display_name())
            })
            .collect::<Vec<_>>();
        let type_resolver = Arc::new(TypeResolver::new(
            registry.node(id).display_name(),
            AbstractKind::Interface,
            entries,
        ));
        self.type_resolvers.insert(id, type_resolver.clone());
        Ok(type_resolver)
    }

    /// Compiles `id` unless it is compiled or being compiled.
    fn ensure_compiled(&mut self, id: NodeId) -> Result<()> {
        if self.generating.contains(&id) {
            return Ok(());
        }
        match self.registry.node(id) {
            Node::Object(_) => self.compile_object_type(id).map(drop),
            Node::Interface(_) => self.compile_interface_type(id).map(drop),
            Node::InputObject(_) => self.compile_input_object_type(id).map(drop),
            node => Err(SchemaError::TypeNotFound {
                type_name: node.display_name(),
            }),
        }
    }

    fn input_shape(&mut self, id: NodeId) -> Result<Arc<OnceLock<InputObjectShape>>> {
        if let Some(shape) = self.input_shapes.get(&id) {
            return Ok(shape.clone());
        }
        let registry = self.registry;
        let node = registry.node(id);
        let (Some(input_fields), Some(constructor)) = (node.input_fields(), node.constructor())
        else {
            return Err(SchemaError::TypeNotFound {
                type_name: node.display_name(),
            });
        };

        let cell = Arc::new(OnceLock::new());
        self.input_shapes.insert(id, cell.clone());

        let mut fields = Vec::with_capacity(input_fields.len());
        for field in input_fields {
            let metadata = registry.input_field_metadata(*field)?;
            fields.push(InputFieldShape {
                shape: self.value_shape(&metadata.ty)?,
                name: metadata.name,
                default_value: metadata.default_value,
            });
        }
        let _ = cell.set(InputObjectShape {
            name: node.display_name(),
            fields,
            constructor: constructor.clone(),
        });
        Ok(cell)
    }

    fn value_shape(&mut self, ty: &WrapperOrNode) -> Result<ValueShape> {
        match ty {
            WrapperOrNode::Node(id) if self.registry.node(*id).is_input_object_node() => {
                Ok(ValueShape::Input(self.input_shape(*id)?))
            }
            WrapperOrNode::Node(_) => Ok(ValueShape::Plain),
            WrapperOrNode::Wrapper(wrapper) => match wrapper.kind() {
                WrapperKind::Enum(definition) => Ok(ValueShape::Enum(definition.clone())),
                WrapperKind::List(inner) => {
                    let inner = self.registry.resolve_type_spec(inner)?;
                    Ok(ValueShape::List(Box::new(self.value_shape(&inner)?)))
                }
                WrapperKind::Nullable(inner) => {
                    let inner = self.registry.resolve_type_spec(inner)?;
                    self.value_shape(&inner)
                }
                WrapperKind::Scalar(_) | WrapperKind::Union(_) => Ok(ValueShape::Plain),
            },
        }
    }
}

/// Collects the extends links of every declared object type.
fn lineage(registry: &Registry) -> Lineage {
    let mut lineage = Lineage::default();
    for id in registry.writeable_nodes() {
        if let Some(object) = registry.node(id).as_object()
            && let Some(link) = object.extends
        {
            lineage.insert(object.target, link.parent(), link.upcast());
        }
    }
    lineage
}

/// Picks the field's explicit resolver, or property lookup on the parent, and
/// attaches the output hook and argument mapping.
fn build_resolver(
    metadata: &FieldMetadata,
    output: &CompiledRef,
    arguments: ArgumentMapping,
) -> FieldResolver {
    FieldResolver::new(
        metadata.name.clone(),
        metadata.resolver.clone(),
        output.transform.clone(),
        arguments,
        output.type_resolver.clone(),
    )
}
