//! Declaration surface.
//!
//! Each config type here corresponds to one decorator of a decorator-based
//! API. Member declarations (fields, input fields, args, implements) are
//! recorded before the type declaration that owns them, exactly like member
//! decorators run before the class decorator:
//!
//! ```ignore
//! registry
//!     .declare::<User>()
//!     .field(Field::new("id").ty(id()))
//!     .field(Field::new("friends").ty(list(TypeSpec::of::<User>())))
//!     .implements::<Node>()
//!     .object(ObjectType::new())?;
//! ```

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::Result;
use crate::error::SchemaError;
use crate::graph::{NodeId, Registry};
use crate::target::{InputConstructor, Target};
use crate::value::{Resolver, Upcast, upcast};
use crate::wrappers::{Infer, TypeSpec};

/// Object type declaration.
#[derive(Debug, Clone, Default)]
pub struct ObjectType {
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) extends: Option<Extends>,
}

impl ObjectType {
    /// An object type named after its declaring type.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the type name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Inherits fields and interfaces from another declared object type.
    #[must_use]
    pub fn extends(mut self, extends: Extends) -> Self {
        self.extends = Some(extends);
        self
    }
}

/// Link from an object type to the object type it extends.
///
/// Inherited resolvers bound to the extended type (see
/// [`Resolver::method`]) receive the extending value through its
/// `AsRef` implementation.
#[derive(Clone, Copy)]
pub struct Extends {
    parent: Target,
    upcast: Upcast,
}

impl Extends {
    /// `C` extends `P`.
    #[must_use]
    pub fn of<C, P>() -> Self
    where
        C: AsRef<P> + Send + Sync + 'static,
        P: Send + Sync + 'static,
    {
        Self {
            parent: Target::of::<P>(),
            upcast: upcast::<C, P>,
        }
    }

    /// The extended type.
    #[must_use]
    pub fn parent(&self) -> Target {
        self.parent
    }

    pub(crate) fn upcast(&self) -> Upcast {
        self.upcast
    }
}

impl fmt::Debug for Extends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extends")
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}

/// Interface type declaration.
#[derive(Debug, Clone, Default)]
pub struct InterfaceType {
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
}

impl InterfaceType {
    /// An interface named after its declaring type.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the type name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Input object type declaration.
#[derive(Debug, Clone, Default)]
pub struct InputObjectType {
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
}

impl InputObjectType {
    /// An input object named after its declaring type.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the type name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Output field declaration.
#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) ty: Option<TypeSpec>,
    pub(crate) description: Option<String>,
    pub(crate) deprecation_reason: Option<String>,
    pub(crate) args: Option<Target>,
    pub(crate) arg: Option<TypeSpec>,
    pub(crate) resolver: Option<Resolver>,
}

impl Field {
    /// A field named `name`. Without a [`Resolver`] the field resolves to the
    /// parent's property of the same name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            description: None,
            deprecation_reason: None,
            args: None,
            arg: None,
            resolver: None,
        }
    }

    /// A field whose type is inferred from the Rust type `T`.
    pub fn infer<T: Infer>(name: impl Into<String>) -> Self {
        Self::new(name).ty(T::infer())
    }

    /// Sets the type.
    #[must_use]
    pub fn ty(mut self, ty: impl Into<TypeSpec>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the field deprecated.
    #[must_use]
    pub fn deprecated(mut self, reason: impl Into<String>) -> Self {
        self.deprecation_reason = Some(reason.into());
        self
    }

    /// Takes all arguments from the args type `A`.
    #[must_use]
    pub fn args<A: 'static>(mut self) -> Self {
        self.args = Some(Target::of::<A>());
        self
    }

    /// Takes a single argument of type `ty`, named by an [`Arg`] declaration.
    #[must_use]
    pub fn arg(mut self, ty: impl Into<TypeSpec>) -> Self {
        self.arg = Some(ty.into());
        self
    }

    /// Sets an explicit resolver.
    #[must_use]
    pub fn resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }
}

/// Input field declaration, used by input object and args types.
#[derive(Debug, Clone)]
pub struct InputField {
    pub(crate) name: String,
    pub(crate) ty: Option<TypeSpec>,
    pub(crate) description: Option<String>,
    pub(crate) default_value: Option<serde_json::Value>,
}

impl InputField {
    /// An input field named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            description: None,
            default_value: None,
        }
    }

    /// An input field whose type is inferred from the Rust type `T`.
    pub fn infer<T: Infer>(name: impl Into<String>) -> Self {
        Self::new(name).ty(T::infer())
    }

    /// Sets the type.
    #[must_use]
    pub fn ty(mut self, ty: impl Into<TypeSpec>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// Single argument declaration.
#[derive(Debug, Clone)]
pub struct Arg {
    pub(crate) name: String,
    pub(crate) ty: Option<TypeSpec>,
    pub(crate) description: Option<String>,
    pub(crate) default_value: Option<serde_json::Value>,
}

impl Arg {
    /// An argument named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            description: None,
            default_value: None,
        }
    }

    /// Sets the type when the field does not set it with [`Field::arg`].
    #[must_use]
    pub fn ty(mut self, ty: impl Into<TypeSpec>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// Builder recording the declarations of one type.
///
/// Member declarations go to the registry's waiting room right away; the
/// first failure is kept and returned by the finishing call.
#[must_use = "declarations are only finalized by object(), interface(), input_object(), args() or finish()"]
pub struct Declaration<'r, T: 'static> {
    registry: &'r mut Registry,
    error: Option<SchemaError>,
    _marker: PhantomData<fn() -> T>,
}

impl<'r, T: 'static> Declaration<'r, T> {
    pub(crate) fn new(registry: &'r mut Registry) -> Self {
        Self {
            registry,
            error: None,
            _marker: PhantomData,
        }
    }

    fn record(mut self, f: impl FnOnce(&mut Registry) -> Result<NodeId>) -> Self {
        if self.error.is_none()
            && let Err(e) = f(&mut *self.registry)
        {
            self.error = Some(e);
        }
        self
    }

    fn check(&mut self) -> Result<()> {
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Declares an output field.
    pub fn field(self, field: Field) -> Self {
        self.record(|registry| registry.create_field(Target::of::<T>(), field))
    }

    /// Declares the single argument of the field `field`.
    pub fn arg(self, field: &str, arg: Arg) -> Self {
        self.record(|registry| registry.create_arg(Target::of::<T>(), field, arg))
    }

    /// Declares an input field.
    pub fn input_field(self, input_field: InputField) -> Self {
        self.record(|registry| registry.create_input_field(Target::of::<T>(), input_field))
    }

    /// Declares that the type implements the interface `I`.
    pub fn implements<I: 'static>(self) -> Self {
        self.record(|registry| registry.create_implement(Target::of::<T>(), Target::of::<I>()))
    }

    /// Finalizes the type as an object type.
    ///
    /// # Errors
    ///
    /// Returns the first declaration error.
    pub fn object(mut self, config: ObjectType) -> Result<NodeId> {
        self.check()?;
        self.registry.create_object(Target::of::<T>(), config)
    }

    /// Finalizes the type as an interface type.
    ///
    /// # Errors
    ///
    /// Returns the first declaration error.
    pub fn interface(mut self, config: InterfaceType) -> Result<NodeId> {
        self.check()?;
        self.registry.create_interface(Target::of::<T>(), config)
    }

    /// Finalizes the type as an input object type.
    ///
    /// # Errors
    ///
    /// Returns the first declaration error.
    pub fn input_object(mut self, config: InputObjectType) -> Result<NodeId>
    where
        T: DeserializeOwned + Send + Sync,
    {
        self.check()?;
        self.registry
            .create_input_object(InputConstructor::of::<T>(), config)
    }

    /// Finalizes the type as an args type.
    ///
    /// # Errors
    ///
    /// Returns the first declaration error.
    pub fn args(mut self) -> Result<NodeId>
    where
        T: DeserializeOwned + Send + Sync,
    {
        self.check()?;
        self.registry.create_args(InputConstructor::of::<T>())
    }

    /// Records member declarations without finalizing the type. Unless the
    /// type is finalized later, the members stay orphaned.
    ///
    /// # Errors
    ///
    /// Returns the first declaration error.
    pub fn finish(mut self) -> Result<()> {
        self.check()
    }
}
