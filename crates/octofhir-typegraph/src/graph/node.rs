//! Type node model.
//!
//! Nodes live in the registry's arena and refer to each other by [`NodeId`].
//! The compiler and the reachability analyzer narrow a [`Node`] by its kind
//! through the `is_*` / `as_*` helpers.

use std::fmt;

use crate::declare::{Extends, Field, InputField};
use crate::target::{InputConstructor, Target};
use crate::value::Resolver;
use crate::wrappers::{TypeSpec, Wrapper};

/// Handle to a node in a [`Registry`](super::Registry).
///
/// Ids are only meaningful for the registry that created them and are
/// invalidated by [`Registry::clear`](super::Registry::clear).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Node kind discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Object,
    Interface,
    InputObject,
    Field,
    Args,
    Arg,
    InputField,
    Implement,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Object => "object",
            Self::Interface => "interface",
            Self::InputObject => "input object",
            Self::Field => "field",
            Self::Args => "args",
            Self::Arg => "arg",
            Self::InputField => "input field",
            Self::Implement => "implement",
        };
        f.write_str(name)
    }
}

/// Name and description of a declared type.
#[derive(Debug, Clone)]
pub struct TypeMetadata {
    pub name: String,
    pub description: Option<String>,
}

/// A declared object type.
#[derive(Debug)]
pub struct ObjectNode {
    pub metadata: TypeMetadata,
    pub target: Target,
    pub field_nodes: Vec<NodeId>,
    pub implement_nodes: Vec<NodeId>,
    pub extends: Option<Extends>,
}

/// A declared interface type.
#[derive(Debug)]
pub struct InterfaceNode {
    pub metadata: TypeMetadata,
    pub target: Target,
    pub field_nodes: Vec<NodeId>,
    /// Objects declaring `implements` for this interface, in declaration order.
    pub implementer_nodes: Vec<NodeId>,
}

/// A declared input object type.
#[derive(Debug)]
pub struct InputObjectNode {
    pub metadata: TypeMetadata,
    pub target: Target,
    pub input_fields: Vec<NodeId>,
    pub constructor: InputConstructor,
}

/// An output field. Its type references are resolved on demand through
/// [`Registry::field_metadata`](super::Registry::field_metadata).
#[derive(Debug)]
pub struct FieldNode {
    pub target: Target,
    pub config: Field,
    pub arg_nodes: Vec<NodeId>,
}

/// A multi-argument bundle.
#[derive(Debug)]
pub struct ArgsNode {
    pub target: Target,
    pub input_fields: Vec<NodeId>,
    pub constructor: InputConstructor,
}

/// Name, default and description of a single argument.
#[derive(Debug, Clone)]
pub struct ArgMetadata {
    pub name: String,
    pub default_value: Option<serde_json::Value>,
    pub description: Option<String>,
}

/// A single argument, attached to the field named `field`.
#[derive(Debug)]
pub struct ArgNode {
    pub target: Target,
    pub field: String,
    pub metadata: ArgMetadata,
    pub ty: Option<TypeSpec>,
}

/// An input field of an input object or args type.
#[derive(Debug)]
pub struct InputFieldNode {
    pub target: Target,
    pub config: InputField,
}

/// An implements edge.
#[derive(Debug)]
pub struct ImplementNode {
    pub target: Target,
    pub interface_node: NodeId,
}

/// A node of the type graph.
#[derive(Debug)]
pub enum Node {
    Object(ObjectNode),
    Interface(InterfaceNode),
    InputObject(InputObjectNode),
    Field(FieldNode),
    Args(ArgsNode),
    Arg(ArgNode),
    InputField(InputFieldNode),
    Implement(ImplementNode),
}

impl Node {
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Object(_) => NodeKind::Object,
            Self::Interface(_) => NodeKind::Interface,
            Self::InputObject(_) => NodeKind::InputObject,
            Self::Field(_) => NodeKind::Field,
            Self::Args(_) => NodeKind::Args,
            Self::Arg(_) => NodeKind::Arg,
            Self::InputField(_) => NodeKind::InputField,
            Self::Implement(_) => NodeKind::Implement,
        }
    }

    /// The declaring type the node belongs to.
    #[must_use]
    pub fn target(&self) -> Target {
        match self {
            Self::Object(node) => node.target,
            Self::Interface(node) => node.target,
            Self::InputObject(node) => node.target,
            Self::Field(node) => node.target,
            Self::Args(node) => node.target,
            Self::Arg(node) => node.target,
            Self::InputField(node) => node.target,
            Self::Implement(node) => node.target,
        }
    }

    /// Type metadata of object, interface and input object nodes.
    #[must_use]
    pub fn type_metadata(&self) -> Option<&TypeMetadata> {
        match self {
            Self::Object(node) => Some(&node.metadata),
            Self::Interface(node) => Some(&node.metadata),
            Self::InputObject(node) => Some(&node.metadata),
            _ => None,
        }
    }

    /// Name used in messages: the GraphQL name for types, the Rust type name
    /// otherwise.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.type_metadata() {
            Some(metadata) => metadata.name.clone(),
            None => self.target().name().to_string(),
        }
    }

    #[must_use]
    pub fn is_object_node(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    #[must_use]
    pub fn is_interface_node(&self) -> bool {
        matches!(self, Self::Interface(_))
    }

    #[must_use]
    pub fn is_input_object_node(&self) -> bool {
        matches!(self, Self::InputObject(_))
    }

    #[must_use]
    pub fn is_field_node(&self) -> bool {
        matches!(self, Self::Field(_))
    }

    #[must_use]
    pub fn is_args_node(&self) -> bool {
        matches!(self, Self::Args(_))
    }

    #[must_use]
    pub fn is_arg_node(&self) -> bool {
        matches!(self, Self::Arg(_))
    }

    #[must_use]
    pub fn is_input_field_node(&self) -> bool {
        matches!(self, Self::InputField(_))
    }

    #[must_use]
    pub fn is_implement_node(&self) -> bool {
        matches!(self, Self::Implement(_))
    }

    /// Object, interface and input object nodes become schema types.
    #[must_use]
    pub fn is_writeable(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Interface(_) | Self::InputObject(_))
    }

    /// Object and interface nodes can be field types.
    #[must_use]
    pub fn is_output_node(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Interface(_))
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectNode> {
        match self {
            Self::Object(node) => Some(node),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_interface(&self) -> Option<&InterfaceNode> {
        match self {
            Self::Interface(node) => Some(node),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_input_object(&self) -> Option<&InputObjectNode> {
        match self {
            Self::InputObject(node) => Some(node),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_field(&self) -> Option<&FieldNode> {
        match self {
            Self::Field(node) => Some(node),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_args(&self) -> Option<&ArgsNode> {
        match self {
            Self::Args(node) => Some(node),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_arg(&self) -> Option<&ArgNode> {
        match self {
            Self::Arg(node) => Some(node),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_input_field(&self) -> Option<&InputFieldNode> {
        match self {
            Self::InputField(node) => Some(node),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_implement(&self) -> Option<&ImplementNode> {
        match self {
            Self::Implement(node) => Some(node),
            _ => None,
        }
    }

    /// Input fields of input object and args nodes.
    #[must_use]
    pub fn input_fields(&self) -> Option<&[NodeId]> {
        match self {
            Self::InputObject(node) => Some(&node.input_fields),
            Self::Args(node) => Some(&node.input_fields),
            _ => None,
        }
    }

    /// Constructor of input object and args nodes.
    #[must_use]
    pub fn constructor(&self) -> Option<&InputConstructor> {
        match self {
            Self::InputObject(node) => Some(&node.constructor),
            Self::Args(node) => Some(&node.constructor),
            _ => None,
        }
    }
}

/// A linked type reference: a declared node or a wrapper.
#[derive(Debug, Clone)]
pub enum WrapperOrNode {
    Node(NodeId),
    Wrapper(Wrapper),
}

impl WrapperOrNode {
    #[must_use]
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(*id),
            Self::Wrapper(_) => None,
        }
    }

    #[must_use]
    pub fn as_wrapper(&self) -> Option<&Wrapper> {
        match self {
            Self::Wrapper(wrapper) => Some(wrapper),
            Self::Node(_) => None,
        }
    }
}

/// The single argument of a field, with its type linked.
#[derive(Debug, Clone)]
pub struct ResolvedArg {
    pub metadata: ArgMetadata,
    pub ty: WrapperOrNode,
}

/// Field metadata with every type reference linked.
#[derive(Debug, Clone)]
pub struct FieldMetadata {
    pub name: String,
    pub ty: WrapperOrNode,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
    pub args: Option<NodeId>,
    pub arg: Option<ResolvedArg>,
    pub resolver: Option<Resolver>,
}

impl FieldMetadata {
    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        self.deprecation_reason.is_some()
    }
}

/// Input field metadata with its type linked.
#[derive(Debug, Clone)]
pub struct InputFieldMetadata {
    pub name: String,
    pub ty: WrapperOrNode,
    pub default_value: Option<serde_json::Value>,
    pub description: Option<String>,
}
