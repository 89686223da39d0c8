//! # octofhir-typegraph
//!
//! Declarative GraphQL type graph and schema compiler.
//!
//! Rust types are declared as GraphQL object, interface, input object and args
//! types through an explicit declaration API. The declarations accumulate in a
//! [`Registry`] as a graph of type nodes, which the [`Compiler`] turns into
//! async-graphql dynamic types with synthesized resolvers.
//!
//! - Member declarations may precede their type declaration and may reference
//!   types declared later, including recursive ones
//! - Objects inherit fields from the interfaces they implement and from the
//!   object type they extend
//! - Interface and union values resolve to their concrete type by the
//!   declaring Rust type of the returned [`Instance`]
//! - Arguments of input object and args types reach resolvers as instances of
//!   the declaring Rust type
//!
//! ## Example
//!
//! ```ignore
//! let mut registry = Registry::new();
//! registry
//!     .declare::<User>()
//!     .field(Field::infer::<String>("name"))
//!     .object(ObjectType::new())?;
//! registry
//!     .declare::<Query>()
//!     .field(Field::new("me").ty(TypeSpec::of::<User>()).resolver(Resolver::sync(|_| {
//!         Ok(Instance::new(User { name: "Ada".into() }).into())
//!     })))
//!     .object(ObjectType::new())?;
//!
//! let bundle = compile_schema(&registry, &CompileSchemaOptions::query::<Query>(), &SchemaConfig::default())?;
//! let schema = bundle.build_schema()?;
//! let response = execute(&schema, ExecutionRequest::new("{ me { name } }")).await;
//! ```
//!
//! ## Configuration
//!
//! Add to `octofhir.toml`:
//!
//! ```toml
//! [schema]
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! reject_orphaned_declarations = true
//! ```
//!
//! ## Modules
//!
//! - [`declare`] - Declaration surface
//! - [`graph`] - Type nodes, registry and reachability analysis
//! - [`wrappers`] - Scalars, lists, nullable types, enums and unions
//! - [`compiler`] - Memoized compilation and resolver synthesis
//! - [`schema`] - Schema assembly and execution
//! - [`value`] - Runtime values seen by resolvers
//! - [`config`] - Configuration options
//! - [`error`] - Error types

pub mod compiler;
pub mod config;
pub mod declare;
pub mod error;
pub mod graph;
pub mod schema;
pub mod target;
pub mod value;
pub mod wrappers;

// Re-export main types
pub use compiler::{CompiledObject, CompiledType, Compiler};
pub use config::SchemaConfig;
pub use declare::{Arg, Extends, Field, InputField, InputObjectType, InterfaceType, ObjectType};
pub use error::SchemaError;
pub use graph::{NodeId, Registry};
pub use schema::{CompileSchemaOptions, ExecutionRequest, SchemaBundle, compile_schema, execute};
pub use target::Target;
pub use value::{FieldCall, Instance, Resolved, Resolver};
pub use wrappers::{TypeSpec, list, nullable};

/// Result type for type graph operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
