//! Schema assembly.
//!
//! [`compile_schema`] turns the declarations of a [`Registry`] into a
//! [`SchemaBundle`]: the compiled query and mutation roots plus every declared
//! type not reachable from them. [`SchemaBundle::build_schema`] hands the
//! bundle to the async-graphql dynamic schema builder.
//!
//! # Example
//!
//! ```ignore
//! let bundle = compile_schema(
//!     &registry,
//!     &CompileSchemaOptions::query::<Query>(),
//!     &SchemaConfig::default(),
//! )?;
//! let schema = bundle.build_schema()?;
//! ```

use std::sync::Arc;

use async_graphql::dynamic::Schema;
use tracing::{debug, warn};

use crate::Result;
use crate::compiler::{CompiledObject, CompiledType, Compiler};
use crate::config::SchemaConfig;
use crate::error::SchemaError;
use crate::graph::{NodeId, Registry, WrapperOrNode};
use crate::target::Target;

/// Schema roots.
#[derive(Debug, Clone, Copy)]
pub struct CompileSchemaOptions {
    query: Target,
    mutation: Option<Target>,
}

impl CompileSchemaOptions {
    /// Uses the declared object type `Q` as query root.
    #[must_use]
    pub fn query<Q: 'static>() -> Self {
        Self {
            query: Target::of::<Q>(),
            mutation: None,
        }
    }

    /// Uses the declared object type `M` as mutation root.
    #[must_use]
    pub fn mutation<M: 'static>(mut self) -> Self {
        self.mutation = Some(Target::of::<M>());
        self
    }
}

/// A compiled schema, ready to be built by the engine.
#[derive(Debug, Clone)]
pub struct SchemaBundle {
    /// Query root.
    pub query: Arc<CompiledObject>,
    /// Mutation root.
    pub mutation: Option<Arc<CompiledObject>>,
    /// Declared types not reachable from the roots.
    pub types: Vec<CompiledType>,
    definitions: Vec<CompiledType>,
    config: SchemaConfig,
}

impl SchemaBundle {
    /// Every compiled type, roots included.
    #[must_use]
    pub fn definitions(&self) -> &[CompiledType] {
        &self.definitions
    }

    /// Looks up a compiled type by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CompiledType> {
        self.definitions.iter().find(|ty| ty.name() == name)
    }

    /// Builds the executable schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::SchemaBuildFailed` if the engine rejects the schema.
    pub fn build_schema(&self) -> Result<Schema> {
        debug!(query = %self.query.name, types = self.definitions.len(), "Starting GraphQL schema build");

        let mutation = self.mutation.as_ref().map(|mutation| mutation.name.as_str());
        let mut schema_builder = Schema::build(&self.query.name, mutation, None);

        for definition in &self.definitions {
            schema_builder = definition.register(schema_builder);
        }

        // Configure limits
        let mut schema_builder = schema_builder.limit_depth(self.config.max_depth);
        schema_builder = schema_builder.limit_complexity(self.config.max_complexity);

        if !self.config.introspection {
            schema_builder = schema_builder.disable_introspection();
        }

        let schema = schema_builder
            .finish()
            .map_err(|e| SchemaError::SchemaBuildFailed(e.to_string()))?;

        debug!("GraphQL schema build complete");
        Ok(schema)
    }
}

/// Compiles the declarations of `registry` into a schema bundle.
///
/// # Errors
///
/// Fails on invalid configuration, on orphaned declarations (unless
/// `config.reject_orphaned_declarations` is off), when a root is not a
/// declared object type, and on any compilation error.
pub fn compile_schema(
    registry: &Registry,
    options: &CompileSchemaOptions,
    config: &SchemaConfig,
) -> Result<SchemaBundle> {
    config.validate()?;
    check_orphans(registry, config)?;

    let query_id = root_node(registry, "Query", options.query)?;
    let mutation_id = options
        .mutation
        .map(|mutation| root_node(registry, "Mutation", mutation))
        .transpose()?;

    let mut compiler = Compiler::new(registry);
    let query = compiler.compile_object_type(query_id)?;
    let mutation = mutation_id
        .map(|id| compiler.compile_object_type(id))
        .transpose()?;

    let roots: Vec<NodeId> = std::iter::once(query_id).chain(mutation_id).collect();
    let unreachable = registry.get_unreachable_nodes(&roots)?;
    let types = unreachable
        .into_iter()
        .map(|id| compiler.compile_named_type(&WrapperOrNode::Node(id)))
        .collect::<Result<Vec<_>>>()?;

    let definitions = compiler.definitions();
    debug!(
        query = %query.name,
        auxiliary = types.len(),
        definitions = definitions.len(),
        "Compiled schema"
    );

    Ok(SchemaBundle {
        query,
        mutation,
        types,
        definitions,
        config: config.clone(),
    })
}

fn root_node(registry: &Registry, root: &'static str, target: Target) -> Result<NodeId> {
    let id = registry.get_node(target)?;
    let node = registry.node(id);
    if !node.is_object_node() {
        return Err(SchemaError::InvalidRoot {
            root,
            type_name: node.display_name(),
        });
    }
    Ok(id)
}

fn check_orphans(registry: &Registry, config: &SchemaConfig) -> Result<()> {
    let orphans = registry.orphaned_targets();
    if !orphans.is_empty() {
        let type_names: Vec<String> = orphans.iter().map(|t| t.name().to_string()).collect();
        if config.reject_orphaned_declarations {
            return Err(SchemaError::OrphanedDeclarations { type_names });
        }
        warn!(types = ?type_names, "Ignoring declarations without a declared type");
    }

    let fields = registry.orphaned_args();
    if !fields.is_empty() {
        if config.reject_orphaned_declarations {
            return Err(SchemaError::OrphanedArgs { fields });
        }
        warn!(fields = ?fields, "Ignoring arg declarations without a declared field");
    }
    Ok(())
}
