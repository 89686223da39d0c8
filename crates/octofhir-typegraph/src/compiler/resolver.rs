//! Resolver synthesis and abstract type resolution.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::{FieldValue, ResolverContext};

use super::arguments::ArgumentMapping;
use crate::error::SchemaError;
use crate::value::{
    ContextValue, FieldCall, Instance, Lineage, Parent, Resolved, Resolver, RootValue,
};
use crate::wrappers::Transform;

/// Whether a [`TypeResolver`] serves an interface or a union.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbstractKind {
    Interface,
    Union,
}

/// Maps runtime instances of an interface or union to a concrete object type,
/// keyed by the instance's declaring type.
#[derive(Debug)]
pub struct TypeResolver {
    name: String,
    kind: AbstractKind,
    by_type: HashMap<TypeId, String>,
}

impl TypeResolver {
    pub(crate) fn new(
        name: impl Into<String>,
        kind: AbstractKind,
        entries: impl IntoIterator<Item = (TypeId, String)>,
    ) -> Self {
        let mut by_type = HashMap::new();
        for (type_id, object) in entries {
            by_type.entry(type_id).or_insert(object);
        }
        Self {
            name: name.into(),
            kind,
            by_type,
        }
    }

    /// Name of the interface or union.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> AbstractKind {
        self.kind
    }

    /// Returns the concrete object type name for `value`.
    ///
    /// # Errors
    ///
    /// Fails when `value` is not an instance of any implementation or member.
    pub fn resolve_type(&self, value: &Resolved) -> Result<&str, SchemaError> {
        let found = match value {
            Resolved::Instance(instance) => self.by_type.get(&instance.target().type_id()),
            _ => None,
        };
        found.map(String::as_str).ok_or_else(|| {
            let type_name = value.runtime_type_name().to_string();
            match self.kind {
                AbstractKind::Interface => SchemaError::UnresolvedImplementation {
                    interface: self.name.clone(),
                    type_name,
                },
                AbstractKind::Union => SchemaError::UnresolvedUnionMember {
                    union: self.name.clone(),
                    type_name,
                },
            }
        })
    }
}

/// The compiled resolver of one field.
pub struct FieldResolver {
    field: String,
    resolver: Option<Resolver>,
    transform: Option<Transform>,
    arguments: ArgumentMapping,
    type_resolver: Option<Arc<TypeResolver>>,
    lineage: Arc<Lineage>,
}

impl FieldResolver {
    pub(crate) fn new(
        field: impl Into<String>,
        resolver: Option<Resolver>,
        transform: Option<Transform>,
        arguments: ArgumentMapping,
        type_resolver: Option<Arc<TypeResolver>>,
    ) -> Self {
        Self {
            field: field.into(),
            resolver,
            transform,
            arguments,
            type_resolver,
            lineage: Arc::default(),
        }
    }

    /// Lets resolvers inherited through extends links see the parent as the
    /// type they were declared on.
    pub(crate) fn with_lineage(mut self, lineage: Arc<Lineage>) -> Self {
        self.lineage = lineage;
        self
    }

    /// Whether the field has an explicit resolver.
    #[must_use]
    pub fn has_explicit_resolver(&self) -> bool {
        self.resolver.is_some()
    }

    /// Runs the field: materializes `raw_args`, calls the explicit resolver or
    /// looks the field up on `parent`, then applies the output hook.
    ///
    /// # Errors
    ///
    /// Fails when arguments cannot be materialized or the resolver fails.
    pub async fn resolve(
        &self,
        parent: Parent,
        raw_args: &Value,
        context: Option<ContextValue>,
    ) -> async_graphql::Result<Resolved> {
        let args = self.arguments.materialize(raw_args)?;
        let call = FieldCall::new(self.field.clone(), parent, args, context)
            .with_lineage(self.lineage.clone());
        let resolved = match &self.resolver {
            Some(resolver) => resolver.call(call).await?,
            None => call.property(&self.field),
        };
        Ok(match &self.transform {
            Some(transform) => transform(resolved),
            None => resolved,
        })
    }

    /// Converts a resolved value for the engine, tagging interface and union
    /// values with their concrete type.
    ///
    /// # Errors
    ///
    /// Fails when an abstract value cannot be resolved to a concrete type.
    pub fn to_field_value<'a>(&self, resolved: Resolved) -> async_graphql::Result<FieldValue<'a>> {
        into_field_value(resolved, self.type_resolver.as_deref())
    }

    /// Resolves the field inside the engine.
    pub(crate) async fn resolve_in<'a>(
        &self,
        ctx: &ResolverContext<'a>,
    ) -> async_graphql::Result<Option<FieldValue<'a>>> {
        let parent = parent_of(ctx);
        let context = ctx.data_opt::<ContextValue>().cloned();
        let raw_args = Value::Object(
            ctx.args
                .iter()
                .map(|(name, value)| (name.clone(), value.as_value().clone()))
                .collect(),
        );
        let resolved = self.resolve(parent, &raw_args, context).await?;
        self.to_field_value(resolved).map(Some)
    }
}

impl fmt::Debug for FieldResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldResolver")
            .field("field", &self.field)
            .field("explicit", &self.resolver.is_some())
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

fn into_field_value<'a>(
    resolved: Resolved,
    type_resolver: Option<&TypeResolver>,
) -> async_graphql::Result<FieldValue<'a>> {
    match resolved {
        Resolved::Value(Value::Null) => Ok(FieldValue::NULL),
        Resolved::List(items) => items
            .into_iter()
            .map(|item| into_field_value(item, type_resolver))
            .collect::<async_graphql::Result<Vec<_>>>()
            .map(FieldValue::list),
        Resolved::Value(Value::List(items)) if type_resolver.is_some() => items
            .into_iter()
            .map(|item| into_field_value(Resolved::Value(item), type_resolver))
            .collect::<async_graphql::Result<Vec<_>>>()
            .map(FieldValue::list),
        resolved => match type_resolver {
            Some(type_resolver) => {
                let concrete = type_resolver.resolve_type(&resolved)?.to_string();
                match resolved {
                    Resolved::Instance(instance) => Ok(FieldValue::owned_any(instance).with_type(concrete)),
                    other => into_field_value(other, None),
                }
            }
            None => Ok(match resolved {
                Resolved::Instance(instance) => FieldValue::owned_any(instance),
                Resolved::Value(value) => FieldValue::value(value),
                Resolved::List(_) => FieldValue::NULL,
            }),
        },
    }
}

/// The parent value of the field being resolved. Root fields see the request's
/// [`RootValue`], if any.
fn parent_of(ctx: &ResolverContext<'_>) -> Parent {
    if let Some(instance) = ctx.parent_value.downcast_ref::<Instance>() {
        return Parent::Instance(instance.clone());
    }
    match ctx.parent_value.as_value() {
        Some(Value::Null) | None => ctx
            .data_opt::<RootValue>()
            .map(|root| Parent::Instance(root.0.clone()))
            .unwrap_or_default(),
        Some(value) => Parent::Value(value.clone()),
    }
}
