//! Schema assembly and execution.
//!
//! ## Components
//!
//! - [`compile_schema`] - validates the roots and compiles the declarations
//! - [`SchemaBundle`] - compiled roots and auxiliary types, buildable into an
//!   async-graphql dynamic schema
//! - [`execute`] - runs a query with optional root value, context and variables

mod builder;
mod execute;

pub use builder::{CompileSchemaOptions, SchemaBundle, compile_schema};
pub use execute::{ExecutionRequest, execute};
