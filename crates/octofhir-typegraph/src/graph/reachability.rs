//! Reachability analysis.
//!
//! Walks the type graph depth-first from the schema roots. Writeable nodes the
//! walk never visits still have to be handed to the engine, since interface
//! and union resolution may produce any of them.

use std::collections::HashSet;

use tracing::trace;

use super::node::{Node, NodeId, WrapperOrNode};
use super::registry::Registry;
use crate::Result;
use crate::target::Target;
use crate::wrappers::{Wrapper, WrapperKind};

struct Walker<'r> {
    registry: &'r Registry,
    visited: HashSet<Target>,
}

impl Walker<'_> {
    fn visit(&mut self, id: NodeId) -> Result<()> {
        let node = self.registry.node(id);
        if node.is_writeable() && !self.visited.insert(node.target()) {
            return Ok(());
        }

        match node {
            Node::Object(object) => {
                for field in &object.field_nodes {
                    self.visit(*field)?;
                }
                for implement in &object.implement_nodes {
                    self.visit(*implement)?;
                }
                if let Some(parent) = object.extends.map(|link| link.parent()) {
                    self.visit(self.registry.get_node(parent)?)?;
                }
            }
            Node::Interface(interface) => {
                for field in &interface.field_nodes {
                    self.visit(*field)?;
                }
            }
            Node::InputObject(input) => {
                for field in &input.input_fields {
                    self.visit(*field)?;
                }
            }
            Node::Args(args) => {
                for field in &args.input_fields {
                    self.visit(*field)?;
                }
            }
            Node::Field(_) => {
                let metadata = self.registry.field_metadata(id)?;
                self.visit_type(&metadata.ty)?;
                if let Some(arg) = &metadata.arg {
                    self.visit_type(&arg.ty)?;
                }
                if let Some(args) = metadata.args {
                    self.visit(args)?;
                }
            }
            Node::InputField(_) => {
                let metadata = self.registry.input_field_metadata(id)?;
                self.visit_type(&metadata.ty)?;
            }
            Node::Implement(implement) => self.visit(implement.interface_node)?,
            Node::Arg(_) => {}
        }
        Ok(())
    }

    fn visit_type(&mut self, ty: &WrapperOrNode) -> Result<()> {
        match ty {
            WrapperOrNode::Node(id) => self.visit(*id),
            WrapperOrNode::Wrapper(wrapper) => self.visit_wrapper(wrapper),
        }
    }

    fn visit_wrapper(&mut self, wrapper: &Wrapper) -> Result<()> {
        match wrapper.kind() {
            WrapperKind::List(inner) | WrapperKind::Nullable(inner) => {
                let inner = self.registry.resolve_type_spec(inner)?;
                self.visit_type(&inner)
            }
            WrapperKind::Union(union) => {
                for member in union.members() {
                    self.visit(self.registry.get_node(*member)?)?;
                }
                Ok(())
            }
            WrapperKind::Scalar(_) | WrapperKind::Enum(_) => Ok(()),
        }
    }
}

/// Returns the writeable nodes (objects, interfaces, input objects) of
/// `registry` that are not reachable from `roots`, in declaration order.
///
/// # Errors
///
/// Propagates metadata errors of the fields met during the walk.
pub fn unreachable_nodes(registry: &Registry, roots: &[NodeId]) -> Result<Vec<NodeId>> {
    let mut walker = Walker {
        registry,
        visited: HashSet::new(),
    };
    for root in roots {
        walker.visit(*root)?;
    }

    let unreachable: Vec<NodeId> = registry
        .writeable_nodes()
        .filter(|id| !walker.visited.contains(&registry.node(*id).target()))
        .collect();
    trace!(
        reachable = walker.visited.len(),
        unreachable = unreachable.len(),
        "Computed reachability"
    );
    Ok(unreachable)
}
