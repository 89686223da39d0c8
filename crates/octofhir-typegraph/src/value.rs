//! Runtime values flowing through compiled resolvers.
//!
//! - [`Instance`] - a value of a declared type, tagged with its [`Target`]
//! - [`Resolved`] - what a resolver produces
//! - [`FieldCall`] - what a resolver receives (parent, materialized arguments, context)
//! - [`Resolver`] - an explicit field resolver

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock};

use async_graphql::{Name, Number, Value};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::SchemaError;
use crate::target::Target;

type ProjectFn = fn(&(dyn Any + Send + Sync)) -> Option<serde_json::Value>;

/// Borrows the part of an extending value that belongs to the extended type.
pub(crate) type Upcast = fn(&(dyn Any + Send + Sync)) -> Option<&(dyn Any + Send + Sync)>;

pub(crate) fn upcast<C, P>(value: &(dyn Any + Send + Sync)) -> Option<&(dyn Any + Send + Sync)>
where
    C: AsRef<P> + Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    value
        .downcast_ref::<C>()
        .map(|child| AsRef::<P>::as_ref(child) as &(dyn Any + Send + Sync))
}

/// Upcasts from each extending object type to the type it extends.
#[derive(Clone, Default)]
pub(crate) struct Lineage(HashMap<TypeId, (TypeId, Upcast)>);

impl Lineage {
    pub(crate) fn insert(&mut self, child: Target, parent: Target, upcast: Upcast) {
        self.0.insert(child.type_id(), (parent.type_id(), upcast));
    }
}

type Properties = Option<serde_json::Map<String, serde_json::Value>>;

fn project<T: Serialize + 'static>(data: &(dyn Any + Send + Sync)) -> Option<serde_json::Value> {
    data.downcast_ref::<T>()
        .and_then(|value| serde_json::to_value(value).ok())
}

/// A value of a declared type.
///
/// The instance's [`Target`] is the discriminant used to resolve interface and
/// union types at runtime.
#[derive(Clone)]
pub struct Instance {
    target: Target,
    data: Arc<dyn Any + Send + Sync>,
    project: Option<ProjectFn>,
    properties: Arc<OnceLock<Properties>>,
}

impl Instance {
    /// Wraps a serializable value. Fields without an explicit resolver are
    /// looked up on its serialized form.
    pub fn new<T>(value: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self {
            target: Target::of::<T>(),
            data: Arc::new(value),
            project: Some(project::<T>),
            properties: Arc::new(OnceLock::new()),
        }
    }

    /// Wraps a value that only explicit resolvers can read.
    pub fn opaque<T>(value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self {
            target: Target::of::<T>(),
            data: Arc::new(value),
            project: None,
            properties: Arc::new(OnceLock::new()),
        }
    }

    /// Returns the declaring type of this instance.
    #[must_use]
    pub fn target(&self) -> Target {
        self.target
    }

    /// Returns the wrapped value if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }

    /// Returns the wrapped value as a `T`, walking up the extends links of
    /// `lineage` until a `T` is found.
    pub(crate) fn downcast_in<T: 'static>(&self, lineage: &Lineage) -> Option<&T> {
        let mut data: &(dyn Any + Send + Sync) = self.data.as_ref();
        let mut current = self.target.type_id();
        loop {
            if let Some(value) = data.downcast_ref::<T>() {
                return Some(value);
            }
            let (parent, upcast) = lineage.0.get(&current)?;
            data = upcast(data)?;
            current = *parent;
        }
    }

    /// Returns whether the instance is a `T`.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.data.is::<T>()
    }

    /// Looks up a property by name on the serialized form of the value.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<Value> {
        let properties = self.properties.get_or_init(|| {
            match self.project.and_then(|project| project(self.data.as_ref())) {
                Some(serde_json::Value::Object(map)) => Some(map),
                _ => None,
            }
        });
        properties
            .as_ref()
            .and_then(|map| map.get(name))
            .map(json_to_graphql_value)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// The output of a field resolver.
#[derive(Clone, Debug)]
pub enum Resolved {
    /// A plain engine value (scalars, enums, raw objects, `null`).
    Value(Value),
    /// A value of a declared type.
    Instance(Instance),
    /// A list of resolved values.
    List(Vec<Resolved>),
}

impl Resolved {
    /// `null`.
    pub const NULL: Resolved = Resolved::Value(Value::Null);

    /// Builds a list from anything convertible into resolved values.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Resolved>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Returns whether this is `null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }

    /// Applies `f` to every element when this is a list; other values are
    /// returned untouched.
    #[must_use]
    pub fn map_items(self, f: &dyn Fn(Resolved) -> Resolved) -> Self {
        match self {
            Self::List(items) => Self::List(items.into_iter().map(f).collect()),
            Self::Value(Value::List(items)) => {
                Self::List(items.into_iter().map(|item| f(Self::Value(item))).collect())
            }
            other => other,
        }
    }

    /// Name of the runtime type, used in resolution errors.
    #[must_use]
    pub fn runtime_type_name(&self) -> &'static str {
        match self {
            Self::Instance(instance) => instance.target().name(),
            _ => "Unknown",
        }
    }
}

impl From<Value> for Resolved {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Instance> for Resolved {
    fn from(instance: Instance) -> Self {
        Self::Instance(instance)
    }
}

impl From<String> for Resolved {
    fn from(value: String) -> Self {
        Self::Value(Value::String(value))
    }
}

impl From<&str> for Resolved {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_string()))
    }
}

impl From<bool> for Resolved {
    fn from(value: bool) -> Self {
        Self::Value(Value::Boolean(value))
    }
}

impl From<i32> for Resolved {
    fn from(value: i32) -> Self {
        Self::Value(Value::Number(value.into()))
    }
}

impl From<f64> for Resolved {
    fn from(value: f64) -> Self {
        Number::from_f64(value)
            .map(|n| Self::Value(Value::Number(n)))
            .unwrap_or(Self::NULL)
    }
}

impl<T: Into<Resolved>> From<Option<T>> for Resolved {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::NULL)
    }
}

impl<T: Into<Resolved>> From<Vec<T>> for Resolved {
    fn from(values: Vec<T>) -> Self {
        Self::list(values)
    }
}

/// The parent value a field is resolved on.
#[derive(Clone, Debug, Default)]
pub enum Parent {
    /// No parent (a root field without a root value).
    #[default]
    None,
    /// A value of a declared type.
    Instance(Instance),
    /// A plain engine value, typically an object produced by property lookup.
    Value(Value),
}

impl Parent {
    /// Looks up `name` on the parent. Missing properties resolve to `null`.
    #[must_use]
    pub fn property(&self, name: &str) -> Resolved {
        match self {
            Self::Instance(instance) => instance.property(name).map(Resolved::Value),
            Self::Value(Value::Object(map)) => map.get(name).cloned().map(Resolved::Value),
            _ => None,
        }
        .unwrap_or(Resolved::NULL)
    }

    /// Returns the parent instance, if any.
    #[must_use]
    pub fn instance(&self) -> Option<&Instance> {
        match self {
            Self::Instance(instance) => Some(instance),
            _ => None,
        }
    }
}

/// Arguments as handed to a resolver after materialization.
#[derive(Clone, Default)]
pub enum Arguments {
    /// The field declares no arguments.
    #[default]
    None,
    /// The raw value of a single scalar-like argument.
    Raw(Value),
    /// An instance of the declared args or input type.
    Instance(Arc<dyn Any + Send + Sync>),
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Raw(value) => f.debug_tuple("Raw").field(value).finish(),
            Self::Instance(_) => f.write_str("Instance(..)"),
        }
    }
}

/// Request-scoped value made available to every resolver.
#[derive(Clone)]
pub struct ContextValue(Arc<dyn Any + Send + Sync>);

impl ContextValue {
    /// Wraps a context value.
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Returns the context if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContextValue(..)")
    }
}

/// Parent value for root fields.
#[derive(Clone, Debug)]
pub struct RootValue(pub Instance);

/// Everything a resolver gets to see for one field invocation.
#[derive(Clone)]
pub struct FieldCall {
    field: String,
    parent: Parent,
    args: Arguments,
    context: Option<ContextValue>,
    lineage: Arc<Lineage>,
}

impl FieldCall {
    /// Creates a field call.
    pub fn new(
        field: impl Into<String>,
        parent: Parent,
        args: Arguments,
        context: Option<ContextValue>,
    ) -> Self {
        Self {
            field: field.into(),
            parent,
            args,
            context,
            lineage: Arc::default(),
        }
    }

    pub(crate) fn with_lineage(mut self, lineage: Arc<Lineage>) -> Self {
        self.lineage = lineage;
        self
    }

    /// Name of the field being resolved.
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field
    }

    /// The parent value.
    #[must_use]
    pub fn parent(&self) -> &Parent {
        &self.parent
    }

    /// The parent as a `T`. A parent of an object type extending `T` is
    /// presented as its `T` part.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::UnexpectedParent` if the parent is not a `T`.
    pub fn parent_as<T: 'static>(&self) -> Result<&T, SchemaError> {
        self.parent
            .instance()
            .and_then(|instance| instance.downcast_in::<T>(&self.lineage))
            .ok_or_else(|| SchemaError::UnexpectedParent {
                field: self.field.clone(),
                expected: Target::of::<T>().name().to_string(),
            })
    }

    /// The materialized args or input instance as a `T`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::UnexpectedArguments` if no `T` was materialized.
    pub fn args<T: 'static>(&self) -> Result<&T, SchemaError> {
        match &self.args {
            Arguments::Instance(instance) => instance.downcast_ref::<T>(),
            _ => None,
        }
        .ok_or_else(|| SchemaError::UnexpectedArguments {
            field: self.field.clone(),
            expected: Target::of::<T>().name().to_string(),
        })
    }

    /// The raw value of a single argument.
    #[must_use]
    pub fn arg_value(&self) -> Option<&Value> {
        match &self.args {
            Arguments::Raw(value) => Some(value),
            _ => None,
        }
    }

    /// Deserializes the raw value of a single argument.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::UnexpectedArguments` when the field has no raw
    /// argument and `SchemaError::InputConstruction` when it does not fit `T`.
    pub fn arg<T: DeserializeOwned + 'static>(&self) -> Result<T, SchemaError> {
        let type_name = Target::of::<T>().name().to_string();
        let value = self
            .arg_value()
            .ok_or_else(|| SchemaError::UnexpectedArguments {
                field: self.field.clone(),
                expected: type_name.clone(),
            })?;
        value
            .clone()
            .into_json()
            .and_then(serde_json::from_value)
            .map_err(|source| SchemaError::InputConstruction { type_name, source })
    }

    /// The materialized arguments.
    #[must_use]
    pub fn arguments(&self) -> &Arguments {
        &self.args
    }

    /// The request context as a `T`.
    #[must_use]
    pub fn context<T: 'static>(&self) -> Option<&T> {
        self.context.as_ref().and_then(ContextValue::downcast_ref::<T>)
    }

    /// Looks up `name` on the parent value.
    #[must_use]
    pub fn property(&self, name: &str) -> Resolved {
        self.parent.property(name)
    }
}

impl fmt::Debug for FieldCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldCall")
            .field("field", &self.field)
            .field("parent", &self.parent)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// Future returned by a [`Resolver`].
pub type ResolverFuture = BoxFuture<'static, async_graphql::Result<Resolved>>;

/// An explicit field resolver, the behaviour attached to a field declaration.
#[derive(Clone)]
pub struct Resolver(Arc<dyn Fn(FieldCall) -> ResolverFuture + Send + Sync>);

impl Resolver {
    /// Creates an asynchronous resolver.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(FieldCall) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = async_graphql::Result<Resolved>> + Send + 'static,
    {
        Self(Arc::new(move |call| f(call).boxed()))
    }

    /// Creates a synchronous resolver.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&FieldCall) -> async_graphql::Result<Resolved> + Send + Sync + 'static,
    {
        Self(Arc::new(move |call| futures_util::future::ready(f(&call)).boxed()))
    }

    /// Creates a resolver bound to a parent of type `T`, the equivalent of a
    /// method on the declaring type.
    pub fn method<T, F>(f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&T, &FieldCall) -> async_graphql::Result<Resolved> + Send + Sync + 'static,
    {
        Self::sync(move |call| {
            let this = call.parent_as::<T>()?;
            f(this, call)
        })
    }

    /// Invokes the resolver.
    pub fn call(&self, call: FieldCall) -> ResolverFuture {
        (self.0)(call)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver(..)")
    }
}

/// Converts a `serde_json::Value` to an engine value.
pub fn json_to_graphql_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => Value::Number(n.clone()),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(arr) => Value::List(arr.iter().map(json_to_graphql_value).collect()),
        serde_json::Value::Object(obj) => Value::Object(
            obj.iter()
                .map(|(k, v)| (Name::new(k), json_to_graphql_value(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct User {
        id: String,
        name: String,
    }

    struct Secret;

    fn user() -> User {
        User {
            id: "1".into(),
            name: "Ada".into(),
        }
    }

    #[test]
    fn test_instance_property_lookup() {
        let instance = Instance::new(user());
        assert_eq!(instance.property("name"), Some(Value::String("Ada".into())));
        assert_eq!(instance.property("missing"), None);
        assert!(instance.is::<User>());
        assert_eq!(instance.target().name(), "User");
    }

    #[test]
    fn test_opaque_instance_has_no_properties() {
        let instance = Instance::opaque(Secret);
        assert_eq!(instance.property("anything"), None);
        assert!(instance.downcast_ref::<Secret>().is_some());
    }

    #[test]
    fn test_parent_property_on_raw_object() {
        let parent = Parent::Value(json_to_graphql_value(&serde_json::json!({"id": "7"})));
        assert!(matches!(parent.property("id"), Resolved::Value(Value::String(s)) if s == "7"));
        assert!(parent.property("other").is_null());
        assert!(Parent::None.property("id").is_null());
    }

    #[test]
    fn test_map_items_over_raw_list() {
        let list = Resolved::Value(Value::List(vec![Value::Null, Value::Boolean(true)]));
        let mapped = list.map_items(&|item| if item.is_null() { Resolved::from("x") } else { item });
        match mapped {
            Resolved::List(items) => {
                assert!(matches!(&items[0], Resolved::Value(Value::String(s)) if s == "x"));
                assert!(matches!(&items[1], Resolved::Value(Value::Boolean(true))));
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_field_call_accessors() {
        let call = FieldCall::new(
            "name",
            Parent::Instance(Instance::new(user())),
            Arguments::Raw(Value::Number(3.into())),
            Some(ContextValue::new(42_u32)),
        );
        assert_eq!(call.parent_as::<User>().unwrap().name, "Ada");
        assert!(call.parent_as::<Secret>().is_err());
        assert_eq!(call.arg::<i32>().unwrap(), 3);
        assert!(call.args::<User>().is_err());
        assert_eq!(call.context::<u32>(), Some(&42));
    }

    struct Admin {
        user: User,
        level: i32,
    }

    impl AsRef<User> for Admin {
        fn as_ref(&self) -> &User {
            &self.user
        }
    }

    struct Owner(Admin);

    impl AsRef<Admin> for Owner {
        fn as_ref(&self) -> &Admin {
            &self.0
        }
    }

    #[test]
    fn test_parent_as_follows_extends_links() {
        let mut lineage = Lineage::default();
        lineage.insert(Target::of::<Admin>(), Target::of::<User>(), upcast::<Admin, User>);
        lineage.insert(Target::of::<Owner>(), Target::of::<Admin>(), upcast::<Owner, Admin>);
        let lineage = Arc::new(lineage);

        let owner = Owner(Admin {
            user: user(),
            level: 3,
        });
        let call = FieldCall::new(
            "name",
            Parent::Instance(Instance::opaque(owner)),
            Arguments::None,
            None,
        )
        .with_lineage(lineage);
        assert_eq!(call.parent_as::<Admin>().unwrap().level, 3);
        assert_eq!(call.parent_as::<User>().unwrap().name, "Ada");
        assert!(call.parent_as::<Secret>().is_err());
    }

    #[test]
    fn test_parent_as_without_lineage_is_exact() {
        let admin = Admin {
            user: user(),
            level: 1,
        };
        let call = FieldCall::new(
            "name",
            Parent::Instance(Instance::opaque(admin)),
            Arguments::None,
            None,
        );
        assert!(call.parent_as::<Admin>().is_ok());
        assert!(call.parent_as::<User>().is_err());
    }

    #[tokio::test]
    async fn test_method_resolver_binds_parent() {
        let resolver = Resolver::method(|user: &User, _call| Ok(Resolved::from(user.id.clone())));
        let call = FieldCall::new(
            "id",
            Parent::Instance(Instance::new(user())),
            Arguments::None,
            None,
        );
        let resolved = resolver.call(call).await.unwrap();
        assert!(matches!(resolved, Resolved::Value(Value::String(s)) if s == "1"));
    }
}
