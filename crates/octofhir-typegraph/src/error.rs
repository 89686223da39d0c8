//! Error types for type graph declaration and schema compilation.
//!
//! Declaration, lookup, shape and root errors abort the schema build. Resolution
//! errors happen while a query executes and are converted into
//! `async_graphql::Error` so the engine reports them in the response `errors`.

use thiserror::Error;

/// Errors that can occur while declaring, compiling or resolving a type graph.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A type was referenced that was never declared.
    #[error("Could not find metadata for '{type_name}'. Is it declared?")]
    NotDecorated {
        /// Name of the undeclared type.
        type_name: String,
    },

    /// The same type was declared twice.
    #[error("'{type_name}' is already declared")]
    DuplicateDeclaration {
        /// Name of the declaring type.
        type_name: String,
    },

    /// Two different type definitions share one name.
    #[error("Conflicting definitions share the type name '{type_name}'")]
    NameCollision {
        /// The shared name.
        type_name: String,
    },

    /// A name is not a valid GraphQL name.
    #[error("'{name}' is not a valid GraphQL name")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// `implements` was used with a type that is not an interface.
    #[error("Unexpected use of implements in '{type_name}'. Expected '{interface}' to be an interface type.")]
    NotAnInterface {
        /// The implementing type.
        type_name: String,
        /// The type used as interface.
        interface: String,
    },

    /// A type used as parent or union member is not an object type.
    #[error("Expected '{type_name}' to be an object type")]
    NotAnObject {
        /// Name of the offending type.
        type_name: String,
    },

    /// An object type extends itself, directly or transitively.
    #[error("Inheritance cycle detected at '{type_name}'")]
    InheritanceCycle {
        /// Type at which the cycle was detected.
        type_name: String,
    },

    /// More than one single argument was declared on a field.
    #[error("Unexpected number of arg uses for '{type_name}.{field}'. Only one arg is allowed, use args for multiple arguments.")]
    DuplicateArg {
        /// Declaring type.
        type_name: String,
        /// Field name.
        field: String,
    },

    /// A field declares an `arg` type but no arg declaration exists for it.
    #[error("Defined the option 'arg' in '{type_name}.{field}' but no arg declaration was found")]
    MissingArg {
        /// Declaring type.
        type_name: String,
        /// Field name.
        field: String,
    },

    /// A field sets both `arg` and `args`.
    #[error("Both 'arg' and 'args' are set in '{type_name}.{field}'. Define a single parameter arg or args, not both.")]
    ArgAndArgs {
        /// Declaring type.
        type_name: String,
        /// Field name.
        field: String,
    },

    /// The type referenced by `args` was not declared as args.
    #[error("Args not found for '{type_name}'. Is it declared as args?")]
    ArgsNotDeclared {
        /// Name of the referenced type.
        type_name: String,
    },

    /// An args type has no input fields.
    #[error("No args found. Are you missing input field declarations on '{type_name}'?")]
    NoArgsFound {
        /// Name of the args type.
        type_name: String,
    },

    /// No type was given and none could be inferred.
    #[error("Could not determine the type of '{type_name}.{field}'")]
    MissingType {
        /// Declaring type.
        type_name: String,
        /// Field name.
        field: String,
    },

    /// A field's type is not an output type.
    #[error("Expected the type of '{type_name}.{field}' to be an object, interface or wrapper type")]
    NotOutputType {
        /// Declaring type.
        type_name: String,
        /// Field name.
        field: String,
    },

    /// An input field's or argument's type is not an input type.
    #[error("Expected '{type_name}.{field}' to be an input type")]
    NotInputType {
        /// Declaring type.
        type_name: String,
        /// Field name.
        field: String,
    },

    /// A named type was requested but a list or non-null type was found.
    #[error("Named type not found for '{type_name}'")]
    NotNamedType {
        /// Printed type reference.
        type_name: String,
    },

    /// A node matches no compilable kind.
    #[error("Type not found for '{type_name}'")]
    TypeNotFound {
        /// Name of the node's declaring type.
        type_name: String,
    },

    /// A schema root is not an object type.
    #[error("Expected {root} type '{type_name}' to be an object type")]
    InvalidRoot {
        /// Root operation (`Query` or `Mutation`).
        root: &'static str,
        /// Name of the declared root.
        type_name: String,
    },

    /// Member declarations were made for types that were never declared.
    #[error("Declarations without a declared type: {}", type_names.join(", "))]
    OrphanedDeclarations {
        /// Names of the orphaned declaring types.
        type_names: Vec<String>,
    },

    /// Args were declared for fields their type never declared.
    #[error("Arg declarations without a declared field: {}", fields.join(", "))]
    OrphanedArgs {
        /// `Type.field` of each orphaned arg.
        fields: Vec<String>,
    },

    /// Interface resolution found no implementation for a runtime value.
    #[error("Error resolving type for {interface}: {type_name} not found in implementations")]
    UnresolvedImplementation {
        /// Interface name.
        interface: String,
        /// Runtime type name of the value, or `Unknown`.
        type_name: String,
    },

    /// Union resolution found no member for a runtime value.
    #[error("Source not instance of passed types for {union}: {type_name}")]
    UnresolvedUnionMember {
        /// Union name.
        union: String,
        /// Runtime type name of the value, or `Unknown`.
        type_name: String,
    },

    /// A resolver expected a different parent value.
    #[error("Field '{field}' expected a parent of type '{expected}'")]
    UnexpectedParent {
        /// Field being resolved.
        field: String,
        /// Expected parent type.
        expected: String,
    },

    /// A resolver asked for arguments of a type that was not materialized.
    #[error("Field '{field}' has no arguments of type '{expected}'")]
    UnexpectedArguments {
        /// Field being resolved.
        field: String,
        /// Requested argument type.
        expected: String,
    },

    /// Raw arguments could not be turned into an instance of the declared type.
    #[error("Failed to construct '{type_name}' from arguments: {source}")]
    InputConstruction {
        /// Input or args type name.
        type_name: String,
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// The execution engine rejected the compiled schema.
    #[error("Failed to build GraphQL schema: {0}")]
    SchemaBuildFailed(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SchemaError {
    /// Returns a stable code for the error kind.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotDecorated { .. } => "NOT_DECORATED",
            Self::DuplicateDeclaration { .. } => "DUPLICATE_DECLARATION",
            Self::NameCollision { .. } => "NAME_COLLISION",
            Self::InvalidName { .. } => "INVALID_NAME",
            Self::NotAnInterface { .. } => "NOT_AN_INTERFACE",
            Self::NotAnObject { .. } => "NOT_AN_OBJECT",
            Self::InheritanceCycle { .. } => "INHERITANCE_CYCLE",
            Self::DuplicateArg { .. } => "DUPLICATE_ARG",
            Self::MissingArg { .. } => "MISSING_ARG",
            Self::ArgAndArgs { .. } => "ARG_AND_ARGS",
            Self::ArgsNotDeclared { .. } => "ARGS_NOT_DECLARED",
            Self::NoArgsFound { .. } => "NO_ARGS_FOUND",
            Self::MissingType { .. } => "MISSING_TYPE",
            Self::NotOutputType { .. } => "NOT_OUTPUT_TYPE",
            Self::NotInputType { .. } => "NOT_INPUT_TYPE",
            Self::NotNamedType { .. } => "NOT_NAMED_TYPE",
            Self::TypeNotFound { .. } => "TYPE_NOT_FOUND",
            Self::InvalidRoot { .. } => "INVALID_ROOT",
            Self::OrphanedDeclarations { .. } => "ORPHANED_DECLARATIONS",
            Self::OrphanedArgs { .. } => "ORPHANED_ARGS",
            Self::UnresolvedImplementation { .. } => "UNRESOLVED_IMPLEMENTATION",
            Self::UnresolvedUnionMember { .. } => "UNRESOLVED_UNION_MEMBER",
            Self::UnexpectedParent { .. } => "UNEXPECTED_PARENT",
            Self::UnexpectedArguments { .. } => "UNEXPECTED_ARGUMENTS",
            Self::InputConstruction { .. } => "INPUT_CONSTRUCTION",
            Self::SchemaBuildFailed(_) => "SCHEMA_BUILD_FAILED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }

    /// Returns whether the error can only happen while a query executes.
    #[must_use]
    pub fn is_runtime(&self) -> bool {
        matches!(
            self,
            Self::UnresolvedImplementation { .. }
                | Self::UnresolvedUnionMember { .. }
                | Self::UnexpectedParent { .. }
                | Self::UnexpectedArguments { .. }
                | Self::InputConstruction { .. }
        )
    }
}
