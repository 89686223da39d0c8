//! Metadata registry.
//!
//! The registry maps declaring types to their nodes. Member declarations
//! (fields, args, input fields, implements edges) arrive before the type
//! declaration that owns them and wait in a per-target staging list, the
//! waiting room, until the owning type is finalized.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use super::node::{
    ArgMetadata, ArgNode, ArgsNode, FieldMetadata, FieldNode, ImplementNode, InputFieldMetadata,
    InputFieldNode, InputObjectNode, InterfaceNode, Node, NodeId, ObjectNode, ResolvedArg,
    TypeMetadata, WrapperOrNode,
};
use crate::Result;
use crate::declare::{
    Arg, Declaration, Field, InputField, InputObjectType, InterfaceType, ObjectType,
};
use crate::error::SchemaError;
use crate::target::{InputConstructor, Target};
use crate::wrappers::TypeSpec;

/// Waiting room entries of one target, partitioned by kind.
#[derive(Default)]
struct Staged {
    fields: Vec<NodeId>,
    args: Vec<NodeId>,
    input_fields: Vec<NodeId>,
    implements: Vec<NodeId>,
}

/// Store of declared type nodes.
#[derive(Debug, Default)]
pub struct Registry {
    nodes: Vec<Node>,
    /// Object, interface and input object nodes by declaring type.
    types: IndexMap<Target, NodeId>,
    /// Args nodes by declaring type.
    args: IndexMap<Target, NodeId>,
    waiting_room: IndexMap<Target, Vec<NodeId>>,
    /// Arg nodes whose field was missing when their type was finalized.
    stray_args: Vec<NodeId>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts declaring the type `T`.
    pub fn declare<T: 'static>(&mut self) -> Declaration<'_, T> {
        Declaration::new(self)
    }

    /// Returns the node behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not created by this registry, or was created before
    /// the last [`clear`](Self::clear).
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Number of nodes, staged ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Finalizes the object type declared by `target`, claiming its staged
    /// fields, args and implements edges.
    ///
    /// # Errors
    ///
    /// Fails on duplicate declarations and invalid names.
    pub fn create_object(&mut self, target: Target, config: ObjectType) -> Result<NodeId> {
        self.ensure_undeclared(target)?;
        let metadata = type_metadata(target, config.name, config.description)?;
        let staged = self.take_staged(target);
        self.attach_args(&metadata.name, &staged.fields, &staged.args);
        self.drop_unexpected(&metadata.name, "input field", &staged.input_fields);

        let name = metadata.name.clone();
        let field_count = staged.fields.len();
        let id = self.push(Node::Object(ObjectNode {
            metadata,
            target,
            field_nodes: staged.fields,
            implement_nodes: staged.implements.clone(),
            extends: config.extends,
        }));

        for implement in staged.implements {
            let interface = self.nodes[implement.0]
                .as_implement()
                .map(|edge| edge.interface_node);
            if let Some(interface) = interface
                && let Node::Interface(node) = &mut self.nodes[interface.0]
            {
                node.implementer_nodes.push(id);
            }
        }

        self.types.insert(target, id);
        debug!(type_name = %name, fields = field_count, "Created object node");
        Ok(id)
    }

    /// Finalizes the interface type declared by `target`.
    ///
    /// # Errors
    ///
    /// Fails on duplicate declarations, invalid names and when the interface
    /// itself declares `implements`.
    pub fn create_interface(&mut self, target: Target, config: InterfaceType) -> Result<NodeId> {
        self.ensure_undeclared(target)?;
        let metadata = type_metadata(target, config.name, config.description)?;
        let staged = self.take_staged(target);
        if !staged.implements.is_empty() {
            return Err(SchemaError::NotAnObject {
                type_name: metadata.name,
            });
        }
        self.attach_args(&metadata.name, &staged.fields, &staged.args);
        self.drop_unexpected(&metadata.name, "input field", &staged.input_fields);

        let name = metadata.name.clone();
        let field_count = staged.fields.len();
        let id = self.push(Node::Interface(InterfaceNode {
            metadata,
            target,
            field_nodes: staged.fields,
            implementer_nodes: Vec::new(),
        }));
        self.types.insert(target, id);
        debug!(type_name = %name, fields = field_count, "Created interface node");
        Ok(id)
    }

    /// Finalizes the input object type built by `constructor`.
    ///
    /// # Errors
    ///
    /// Fails on duplicate declarations and invalid names.
    pub fn create_input_object(
        &mut self,
        constructor: InputConstructor,
        config: InputObjectType,
    ) -> Result<NodeId> {
        let target = constructor.target();
        self.ensure_undeclared(target)?;
        let metadata = type_metadata(target, config.name, config.description)?;
        let staged = self.take_staged(target);
        self.drop_unexpected(&metadata.name, "field", &staged.fields);
        self.drop_unexpected(&metadata.name, "arg", &staged.args);
        self.drop_unexpected(&metadata.name, "implements", &staged.implements);

        let name = metadata.name.clone();
        let field_count = staged.input_fields.len();
        let id = self.push(Node::InputObject(InputObjectNode {
            metadata,
            target,
            input_fields: staged.input_fields,
            constructor,
        }));
        self.types.insert(target, id);
        debug!(type_name = %name, fields = field_count, "Created input object node");
        Ok(id)
    }

    /// Finalizes the args type built by `constructor`.
    ///
    /// # Errors
    ///
    /// Fails when the type is already declared as args.
    pub fn create_args(&mut self, constructor: InputConstructor) -> Result<NodeId> {
        let target = constructor.target();
        if self.args.contains_key(&target) {
            return Err(SchemaError::DuplicateDeclaration {
                type_name: target.name().to_string(),
            });
        }
        let staged = self.take_staged(target);
        self.drop_unexpected(target.name(), "field", &staged.fields);
        self.drop_unexpected(target.name(), "arg", &staged.args);
        self.drop_unexpected(target.name(), "implements", &staged.implements);

        let field_count = staged.input_fields.len();
        let id = self.push(Node::Args(ArgsNode {
            target,
            input_fields: staged.input_fields,
            constructor,
        }));
        self.args.insert(target, id);
        debug!(type_name = %target, fields = field_count, "Created args node");
        Ok(id)
    }

    /// Stages an output field of `target`.
    ///
    /// # Errors
    ///
    /// Fails on invalid names.
    pub fn create_field(&mut self, target: Target, field: Field) -> Result<NodeId> {
        validate_name(&field.name)?;
        trace!(type_name = %target, field = %field.name, "Staged field");
        Ok(self.stage(
            target,
            Node::Field(FieldNode {
                target,
                config: field,
                arg_nodes: Vec::new(),
            }),
        ))
    }

    /// Stages an input field of `target`.
    ///
    /// # Errors
    ///
    /// Fails on invalid names.
    pub fn create_input_field(&mut self, target: Target, input_field: InputField) -> Result<NodeId> {
        validate_name(&input_field.name)?;
        trace!(type_name = %target, field = %input_field.name, "Staged input field");
        Ok(self.stage(
            target,
            Node::InputField(InputFieldNode {
                target,
                config: input_field,
            }),
        ))
    }

    /// Stages the single argument of `target.field`.
    ///
    /// # Errors
    ///
    /// Fails on invalid names and when the field already has an argument.
    pub fn create_arg(&mut self, target: Target, field: &str, arg: Arg) -> Result<NodeId> {
        validate_name(&arg.name)?;
        let duplicate = self
            .waiting_room
            .get(&target)
            .into_iter()
            .flatten()
            .filter_map(|id| self.nodes[id.0].as_arg())
            .any(|node| node.field == field);
        if duplicate {
            return Err(SchemaError::DuplicateArg {
                type_name: target.name().to_string(),
                field: field.to_string(),
            });
        }

        trace!(type_name = %target, field = %field, arg = %arg.name, "Staged arg");
        Ok(self.stage(
            target,
            Node::Arg(ArgNode {
                target,
                field: field.to_string(),
                metadata: ArgMetadata {
                    name: arg.name,
                    default_value: arg.default_value,
                    description: arg.description,
                },
                ty: arg.ty,
            }),
        ))
    }

    /// Stages an implements edge from `target` to `interface`.
    ///
    /// # Errors
    ///
    /// Fails when `interface` is not a declared interface.
    pub fn create_implement(&mut self, target: Target, interface: Target) -> Result<NodeId> {
        let interface_node = self.get_node(interface)?;
        if !self.node(interface_node).is_interface_node() {
            return Err(SchemaError::NotAnInterface {
                type_name: target.name().to_string(),
                interface: interface.name().to_string(),
            });
        }
        trace!(type_name = %target, interface = %interface, "Staged implements");
        Ok(self.stage(
            target,
            Node::Implement(ImplementNode {
                target,
                interface_node,
            }),
        ))
    }

    /// Returns the node declared for `target`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotDecorated` if `target` was never declared.
    pub fn get_node(&self, target: Target) -> Result<NodeId> {
        self.types
            .get(&target)
            .or_else(|| self.args.get(&target))
            .copied()
            .ok_or_else(|| SchemaError::NotDecorated {
                type_name: target.name().to_string(),
            })
    }

    /// Returns the args node declared for `target`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ArgsNotDeclared` if `target` is not declared as args.
    pub fn get_args_node(&self, target: Target) -> Result<NodeId> {
        self.args
            .get(&target)
            .copied()
            .ok_or_else(|| SchemaError::ArgsNotDeclared {
                type_name: target.name().to_string(),
            })
    }

    /// Links a type reference to its node.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotDecorated` for undeclared types.
    pub fn resolve_type_spec(&self, spec: &TypeSpec) -> Result<WrapperOrNode> {
        match spec {
            TypeSpec::Target(target) => self.get_node(*target).map(WrapperOrNode::Node),
            TypeSpec::Wrapper(wrapper) => Ok(WrapperOrNode::Wrapper(wrapper.clone())),
        }
    }

    /// Evaluates the metadata of a field node, linking its type references.
    ///
    /// # Errors
    ///
    /// Fails on missing or undeclared types, on `arg` and `args` both being
    /// set, on a missing arg declaration and on an empty or undeclared args type.
    pub fn field_metadata(&self, id: NodeId) -> Result<FieldMetadata> {
        let field = self.node(id).as_field().ok_or_else(|| SchemaError::TypeNotFound {
            type_name: self.node(id).display_name(),
        })?;
        let config = &field.config;
        let owner = self.owner_name(field.target);
        let missing_type = || SchemaError::MissingType {
            type_name: owner.clone(),
            field: config.name.clone(),
        };

        let ty = config.ty.as_ref().ok_or_else(missing_type)?;
        let ty = self.resolve_type_spec(ty)?;

        let arg_node = field.arg_nodes.first().and_then(|id| self.node(*id).as_arg());
        let arg_type = config
            .arg
            .as_ref()
            .or_else(|| arg_node.and_then(|node| node.ty.as_ref()));

        if config.args.is_some() && (arg_type.is_some() || arg_node.is_some()) {
            return Err(SchemaError::ArgAndArgs {
                type_name: owner.clone(),
                field: config.name.clone(),
            });
        }

        let args = match config.args {
            Some(target) => {
                let args_id = self.get_args_node(target)?;
                if self.node(args_id).input_fields().is_none_or(<[NodeId]>::is_empty) {
                    return Err(SchemaError::NoArgsFound {
                        type_name: target.name().to_string(),
                    });
                }
                Some(args_id)
            }
            None => None,
        };

        let arg = match (arg_type, arg_node) {
            (Some(ty), Some(node)) => Some(ResolvedArg {
                metadata: node.metadata.clone(),
                ty: self.resolve_type_spec(ty)?,
            }),
            (Some(_), None) => {
                return Err(SchemaError::MissingArg {
                    type_name: owner.clone(),
                    field: config.name.clone(),
                });
            }
            (None, Some(_)) => return Err(missing_type()),
            (None, None) => None,
        };

        Ok(FieldMetadata {
            name: config.name.clone(),
            ty,
            description: config.description.clone(),
            deprecation_reason: config.deprecation_reason.clone(),
            args,
            arg,
            resolver: config.resolver.clone(),
        })
    }

    /// Evaluates the metadata of an input field node.
    ///
    /// # Errors
    ///
    /// Fails on missing or undeclared types.
    pub fn input_field_metadata(&self, id: NodeId) -> Result<InputFieldMetadata> {
        let node = self
            .node(id)
            .as_input_field()
            .ok_or_else(|| SchemaError::TypeNotFound {
                type_name: self.node(id).display_name(),
            })?;
        let config = &node.config;
        let ty = config.ty.as_ref().ok_or_else(|| SchemaError::MissingType {
            type_name: self.owner_name(node.target),
            field: config.name.clone(),
        })?;

        Ok(InputFieldMetadata {
            name: config.name.clone(),
            ty: self.resolve_type_spec(ty)?,
            default_value: config.default_value.clone(),
            description: config.description.clone(),
        })
    }

    /// Name of a field or input field without evaluating its metadata.
    #[must_use]
    pub fn member_name(&self, id: NodeId) -> Option<&str> {
        match self.node(id) {
            Node::Field(node) => Some(&node.config.name),
            Node::InputField(node) => Some(&node.config.name),
            Node::Arg(node) => Some(&node.metadata.name),
            _ => None,
        }
    }

    /// Returns the object and its ancestors, nearest first.
    ///
    /// # Errors
    ///
    /// Fails when an ancestor is undeclared or not an object type, and on
    /// inheritance cycles.
    pub fn object_chain(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut chain = vec![id];
        let mut seen = HashSet::from([id]);
        let mut current = id;

        loop {
            let node = self.node(current);
            let object = node.as_object().ok_or_else(|| SchemaError::NotAnObject {
                type_name: node.display_name(),
            })?;
            let Some(parent) = object.extends.map(|link| link.parent()) else {
                return Ok(chain);
            };
            let parent_id = self.get_node(parent)?;
            if !seen.insert(parent_id) {
                return Err(SchemaError::InheritanceCycle {
                    type_name: object.metadata.name.clone(),
                });
            }
            chain.push(parent_id);
            current = parent_id;
        }
    }

    /// Objects extending `id`, directly or transitively, in declaration order.
    ///
    /// # Errors
    ///
    /// Propagates ancestor chain errors.
    pub fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut descendants = Vec::new();
        for candidate in self.objects() {
            if candidate != id && self.object_chain(candidate)?.contains(&id) {
                descendants.push(candidate);
            }
        }
        Ok(descendants)
    }

    /// Objects implementing the interface `id`: those declaring `implements`
    /// first, then objects inheriting from one of them.
    ///
    /// # Errors
    ///
    /// Fails when `id` is not an interface and propagates ancestor chain errors.
    pub fn implementers(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let node = self.node(id);
        let interface = node.as_interface().ok_or_else(|| SchemaError::NotAnInterface {
            type_name: node.display_name(),
            interface: node.display_name(),
        })?;

        let mut implementers = interface.implementer_nodes.clone();
        for candidate in self.objects() {
            if implementers.contains(&candidate) {
                continue;
            }
            let chain = self.object_chain(candidate)?;
            if chain
                .iter()
                .any(|ancestor| interface.implementer_nodes.contains(ancestor))
            {
                implementers.push(candidate);
            }
        }
        Ok(implementers)
    }

    /// Object, interface and input object nodes in declaration order.
    pub fn writeable_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.types.values().copied()
    }

    fn objects(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.writeable_nodes()
            .filter(|id| self.node(*id).is_object_node())
    }

    /// Writeable nodes not reachable from `roots`.
    ///
    /// # Errors
    ///
    /// Propagates metadata errors met while walking the graph.
    pub fn get_unreachable_nodes(&self, roots: &[NodeId]) -> Result<Vec<NodeId>> {
        super::reachability::unreachable_nodes(self, roots)
    }

    /// Targets with member declarations whose type was never declared.
    #[must_use]
    pub fn orphaned_targets(&self) -> Vec<Target> {
        self.waiting_room.keys().copied().collect()
    }

    /// `Type.field` of every arg declared for a field its type never declared.
    #[must_use]
    pub fn orphaned_args(&self) -> Vec<String> {
        self.stray_args
            .iter()
            .filter_map(|id| self.node(*id).as_arg())
            .map(|arg| format!("{}.{}", self.owner_name(arg.target), arg.field))
            .collect()
    }

    /// Removes every declaration.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.types.clear();
        self.args.clear();
        self.waiting_room.clear();
        self.stray_args.clear();
        debug!("Cleared type registry");
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn stage(&mut self, target: Target, node: Node) -> NodeId {
        let id = self.push(node);
        self.waiting_room.entry(target).or_default().push(id);
        id
    }

    fn take_staged(&mut self, target: Target) -> Staged {
        let mut staged = Staged::default();
        for id in self.waiting_room.shift_remove(&target).unwrap_or_default() {
            match self.nodes[id.0] {
                Node::Field(_) => staged.fields.push(id),
                Node::Arg(_) => staged.args.push(id),
                Node::InputField(_) => staged.input_fields.push(id),
                Node::Implement(_) => staged.implements.push(id),
                _ => {}
            }
        }
        staged
    }

    fn attach_args(&mut self, type_name: &str, fields: &[NodeId], args: &[NodeId]) {
        for arg in args {
            let Some(field_name) = self.nodes[arg.0].as_arg().map(|node| node.field.clone()) else {
                continue;
            };
            let field = fields
                .iter()
                .copied()
                .find(|id| self.member_name(*id) == Some(field_name.as_str()));
            match field {
                Some(field) => {
                    if let Node::Field(node) = &mut self.nodes[field.0] {
                        node.arg_nodes.push(*arg);
                    }
                }
                None => {
                    trace!(type_name = %type_name, field = %field_name, "Arg declared for unknown field");
                    self.stray_args.push(*arg);
                }
            }
        }
    }

    fn drop_unexpected(&self, type_name: &str, kind: &str, ids: &[NodeId]) {
        if !ids.is_empty() {
            warn!(
                type_name = %type_name,
                kind = %kind,
                count = ids.len(),
                "Ignoring declarations not applicable to this type"
            );
        }
    }

    fn ensure_undeclared(&self, target: Target) -> Result<()> {
        if self.types.contains_key(&target) {
            return Err(SchemaError::DuplicateDeclaration {
                type_name: target.name().to_string(),
            });
        }
        Ok(())
    }

    fn owner_name(&self, target: Target) -> String {
        self.types
            .get(&target)
            .map(|id| self.node(*id).display_name())
            .unwrap_or_else(|| target.name().to_string())
    }
}

fn type_metadata(
    target: Target,
    name: Option<String>,
    description: Option<String>,
) -> Result<TypeMetadata> {
    let name = name.unwrap_or_else(|| target.name().to_string());
    validate_name(&name)?;
    Ok(TypeMetadata { name, description })
}

/// Checks `name` against `[_A-Za-z][_0-9A-Za-z]*`.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    if is_valid_graphql_name(name) {
        Ok(())
    } else {
        Err(SchemaError::InvalidName {
            name: name.to_string(),
        })
    }
}

fn is_valid_graphql_name(name: &str) -> bool {
    let mut chars = name.chars();

    // First character must be underscore or letter
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }

    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
