//! Type graph: node model, registry and reachability.

mod node;
mod reachability;
mod registry;

pub use node::{
    ArgMetadata, ArgNode, ArgsNode, FieldMetadata, FieldNode, ImplementNode, InputFieldMetadata,
    InputFieldNode, InputObjectNode, InterfaceNode, Node, NodeId, NodeKind, ObjectNode, ResolvedArg,
    TypeMetadata, WrapperOrNode,
};
pub use reachability::unreachable_nodes;
pub use registry::Registry;
pub(crate) use registry::validate_name;
