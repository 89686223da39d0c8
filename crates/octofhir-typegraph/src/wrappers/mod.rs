//! Wrapper/scalar layer.
//!
//! A [`Wrapper`] is a self-contained type descriptor that takes part in the
//! type graph without being registered as a node: scalars, lists, nullable
//! types, enums and unions. Any position that accepts a type takes a
//! [`TypeSpec`], which is either a declared type or a wrapper.

mod enum_type;
mod scalars;
mod union_type;

use std::fmt;
use std::sync::Arc;

pub use enum_type::{EnumDefinition, EnumType, EnumTypeCase, EnumValue, EnumValueConfig, enum_type};
pub use scalars::{ScalarDefinition, ScalarType, boolean, float, id, int, scalar_type, string};
pub use union_type::{UnionDefinition, UnionType, union_type};

use crate::target::Target;
use crate::value::Resolved;

/// Post-processing hook applied to a resolver's result.
pub type Transform = Arc<dyn Fn(Resolved) -> Resolved + Send + Sync>;

/// The type descriptor carried by a wrapper.
#[derive(Clone)]
pub enum WrapperKind {
    /// A built-in or custom scalar.
    Scalar(Arc<ScalarDefinition>),
    /// An enum type.
    Enum(Arc<EnumDefinition>),
    /// A union of object types.
    Union(Arc<UnionDefinition>),
    /// A list of the inner type.
    List(Box<TypeSpec>),
    /// The inner type, without the non-null modifier.
    Nullable(Box<TypeSpec>),
}

/// A non-graph type descriptor.
#[derive(Clone)]
pub struct Wrapper {
    kind: WrapperKind,
    transform_output: Option<Transform>,
    nullable: bool,
}

impl Wrapper {
    pub(crate) fn new(kind: WrapperKind, transform_output: Option<Transform>) -> Self {
        Self {
            kind,
            transform_output,
            nullable: false,
        }
    }

    /// The type this wrapper describes.
    #[must_use]
    pub fn kind(&self) -> &WrapperKind {
        &self.kind
    }

    /// Hook applied to resolver results of fields of this type.
    #[must_use]
    pub fn transform_output(&self) -> Option<&Transform> {
        self.transform_output.as_ref()
    }

    /// Whether non-null forcing call sites must leave this type nullable.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Applies the output hook, if any.
    #[must_use]
    pub fn apply(&self, value: Resolved) -> Resolved {
        match &self.transform_output {
            Some(transform) => transform(value),
            None => value,
        }
    }
}

impl fmt::Debug for Wrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            WrapperKind::Scalar(scalar) => format!("Scalar({})", scalar.name()),
            WrapperKind::Enum(definition) => format!("Enum({})", definition.name()),
            WrapperKind::Union(definition) => format!("Union({})", definition.name()),
            WrapperKind::List(inner) => format!("List({inner:?})"),
            WrapperKind::Nullable(inner) => format!("Nullable({inner:?})"),
        };
        f.debug_struct("Wrapper")
            .field("kind", &kind)
            .field("nullable", &self.nullable)
            .field("transform_output", &self.transform_output.is_some())
            .finish()
    }
}

/// A type reference as written in a declaration: a declared type or a wrapper.
///
/// Declared types are referenced by [`Target`] and linked to their node only
/// when the compiler asks for them, so declarations may refer to types that
/// are declared later.
#[derive(Clone, Debug)]
pub enum TypeSpec {
    /// A declared object, interface or input object type.
    Target(Target),
    /// A wrapper type.
    Wrapper(Wrapper),
}

impl TypeSpec {
    /// References the declared type `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self::Target(Target::of::<T>())
    }

    /// Returns the wrapper, if this is one.
    #[must_use]
    pub fn as_wrapper(&self) -> Option<&Wrapper> {
        match self {
            Self::Wrapper(wrapper) => Some(wrapper),
            Self::Target(_) => None,
        }
    }

    fn transform_output(&self) -> Option<Transform> {
        self.as_wrapper()
            .and_then(|wrapper| wrapper.transform_output.clone())
    }
}

impl From<Wrapper> for TypeSpec {
    fn from(wrapper: Wrapper) -> Self {
        Self::Wrapper(wrapper)
    }
}

impl From<Target> for TypeSpec {
    fn from(target: Target) -> Self {
        Self::Target(target)
    }
}

/// A list of `inner`.
///
/// The element type is non-null unless `inner` is [`nullable`]. An output hook
/// on the element type is applied element-wise.
pub fn list(inner: impl Into<TypeSpec>) -> Wrapper {
    let inner = inner.into();
    let transform = inner.transform_output().map(|element| {
        Arc::new(move |value: Resolved| value.map_items(element.as_ref())) as Transform
    });
    Wrapper::new(WrapperKind::List(Box::new(inner)), transform)
}

/// `inner` without the non-null modifier.
///
/// An output hook on `inner` is skipped for `null` values.
pub fn nullable(inner: impl Into<TypeSpec>) -> Wrapper {
    let inner = inner.into();
    let transform = inner.transform_output().map(|transform| {
        Arc::new(move |value: Resolved| {
            if value.is_null() {
                value
            } else {
                transform(value)
            }
        }) as Transform
    });
    let mut wrapper = Wrapper::new(WrapperKind::Nullable(Box::new(inner)), transform);
    wrapper.nullable = true;
    wrapper
}

/// Rust types whose GraphQL type can be inferred.
pub trait Infer {
    /// The wrapper for this type.
    fn infer() -> Wrapper;
}

impl Infer for String {
    fn infer() -> Wrapper {
        string()
    }
}

impl Infer for bool {
    fn infer() -> Wrapper {
        boolean()
    }
}

impl Infer for i32 {
    fn infer() -> Wrapper {
        int()
    }
}

impl Infer for f64 {
    fn infer() -> Wrapper {
        float()
    }
}

impl<T: Infer> Infer for Option<T> {
    fn infer() -> Wrapper {
        nullable(T::infer())
    }
}

impl<T: Infer> Infer for Vec<T> {
    fn infer() -> Wrapper {
        list(T::infer())
    }
}

#[cfg(test)]
mod tests {
    use async_graphql::Value;

    use super::*;

    fn shout() -> Wrapper {
        scalar_type(ScalarType::new("Shout").serialize(|value| match value {
            Value::String(s) => Value::String(format!("{s}!")),
            other => other,
        }))
    }

    fn strings(resolved: &Resolved) -> Vec<Option<String>> {
        match resolved {
            Resolved::List(items) => items
                .iter()
                .map(|item| match item {
                    Resolved::Value(Value::String(s)) => Some(s.clone()),
                    _ => None,
                })
                .collect(),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_nullable_marks_wrapper() {
        assert!(!string().is_nullable());
        assert!(nullable(string()).is_nullable());
        assert!(!list(nullable(string())).is_nullable());
    }

    #[test]
    fn test_nullable_guards_transform() {
        let wrapper = nullable(shout());
        assert!(wrapper.apply(Resolved::NULL).is_null());
        assert!(matches!(
            wrapper.apply(Resolved::from("hey")),
            Resolved::Value(Value::String(s)) if s == "hey!"
        ));
    }

    #[test]
    fn test_list_applies_element_transform() {
        let wrapper = list(nullable(shout()));
        let input = Resolved::list([Resolved::from(""), Resolved::NULL]);
        assert_eq!(strings(&wrapper.apply(input)), vec![Some("!".to_string()), None]);
    }

    #[test]
    fn test_list_of_plain_scalar_has_no_transform() {
        assert!(list(string()).transform_output().is_none());
        assert!(list(TypeSpec::of::<String>()).transform_output().is_none());
    }

    #[test]
    fn test_infer_primitives() {
        assert!(matches!(
            String::infer().kind(),
            WrapperKind::Scalar(s) if s.name() == "String"
        ));
        assert!(Option::<i32>::infer().is_nullable());
        assert!(matches!(Vec::<bool>::infer().kind(), WrapperKind::List(_)));
    }
}
