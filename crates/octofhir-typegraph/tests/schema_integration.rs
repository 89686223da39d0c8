//! Integration tests for declaring, compiling and executing type graphs.
//!
//! These tests verify the complete flow from declarations through the
//! registry and compiler to query execution on the built schema.

use std::sync::Arc;

use async_graphql::Value;
use octofhir_typegraph::compiler::CompiledType;
use octofhir_typegraph::value::Parent;
use octofhir_typegraph::wrappers::{
    EnumType, ScalarType, UnionType, enum_type, id, int, scalar_type, string, union_type,
};
use octofhir_typegraph::{
    Arg, CompileSchemaOptions, ExecutionRequest, Extends, Field, InputField, InputObjectType, Instance,
    InterfaceType, ObjectType, Registry, Resolved, Resolver, SchemaBundle, SchemaConfig,
    SchemaError, TypeSpec, compile_schema, execute, list, nullable,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

// =============================================================================
// Test Types
// =============================================================================

struct Entity;

#[derive(Debug, Clone, Serialize)]
struct User {
    id: String,
    name: String,
}

#[derive(Debug, Clone, Serialize)]
struct Bot {
    id: String,
    model: String,
}

#[derive(Debug, Clone, Serialize)]
struct Admin {
    #[serde(flatten)]
    user: User,
    level: i32,
}

impl AsRef<User> for Admin {
    fn as_ref(&self) -> &User {
        &self.user
    }
}

struct Orphan;

struct Query;

struct Mutation;

#[derive(Debug, Deserialize)]
struct SearchInput {
    foo: String,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    bar: String,
    input: SearchInput,
}

#[derive(Debug, Deserialize)]
struct NewUser {
    name: String,
    #[serde(default)]
    role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct Root {
    greeting: String,
}

struct AppContext {
    viewer: String,
}

// =============================================================================
// Test Helpers
// =============================================================================

fn user(id: &str, name: &str) -> Instance {
    Instance::new(User {
        id: id.to_string(),
        name: name.to_string(),
    })
}

fn bot(id: &str) -> Instance {
    Instance::new(Bot {
        id: id.to_string(),
        model: "T-800".to_string(),
    })
}

fn admin(id: &str, name: &str, level: i32) -> Instance {
    Instance::new(Admin {
        user: User {
            id: id.to_string(),
            name: name.to_string(),
        },
        level,
    })
}

fn declare_entities(registry: &mut Registry) {
    registry
        .declare::<Entity>()
        .field(Field::new("id").ty(id()))
        .interface(InterfaceType::new().name("Node"))
        .unwrap();
    registry
        .declare::<User>()
        .field(Field::infer::<String>("name"))
        .implements::<Entity>()
        .object(ObjectType::new())
        .unwrap();
    registry
        .declare::<Bot>()
        .field(Field::infer::<String>("model"))
        .implements::<Entity>()
        .object(ObjectType::new())
        .unwrap();
}

fn compile(registry: &Registry) -> SchemaBundle {
    compile_schema(
        registry,
        &CompileSchemaOptions::query::<Query>(),
        &SchemaConfig::default(),
    )
    .unwrap()
}

async fn run(registry: &Registry, request: ExecutionRequest) -> serde_json::Value {
    let schema = compile(registry).build_schema().unwrap();
    let response = execute(&schema, request).await;
    assert!(response.errors.is_empty(), "errors: {:?}", response.errors);
    response.data.into_json().unwrap()
}

// =============================================================================
// Interface Tests
// =============================================================================

#[tokio::test]
async fn test_interface_value_resolves_to_concrete_type() {
    let mut registry = Registry::new();
    declare_entities(&mut registry);
    registry
        .declare::<Query>()
        .field(
            Field::new("node")
                .ty(TypeSpec::of::<Entity>())
                .resolver(Resolver::sync(|_| Ok(user("1", "Ada").into()))),
        )
        .object(ObjectType::new())
        .unwrap();

    let data = run(
        &registry,
        ExecutionRequest::new("{ node { __typename id ... on User { name } } }"),
    )
    .await;
    assert_eq!(
        data,
        json!({"node": {"__typename": "User", "id": "1", "name": "Ada"}})
    );
}

#[tokio::test]
async fn test_implementers_are_discriminated_per_value() {
    let mut registry = Registry::new();
    declare_entities(&mut registry);
    registry
        .declare::<Query>()
        .arg("node", Arg::new("pick"))
        .field(
            Field::new("node")
                .ty(TypeSpec::of::<Entity>())
                .arg(int())
                .resolver(Resolver::sync(|call| {
                    let pick: i32 = call.arg()?;
                    Ok(if pick % 2 == 0 {
                        user(&pick.to_string(), "Ada").into()
                    } else {
                        bot(&pick.to_string()).into()
                    })
                })),
        )
        .object(ObjectType::new())
        .unwrap();

    let schema = compile(&registry).build_schema().unwrap();
    for pick in [3, 0, 1, 1, 4, 7, 2] {
        let query = format!("{{ node(pick: {pick}) {{ __typename id }} }}");
        let response = execute(&schema, ExecutionRequest::new(query)).await;
        assert!(response.errors.is_empty(), "errors: {:?}", response.errors);
        let expected = if pick % 2 == 0 { "User" } else { "Bot" };
        assert_eq!(
            response.data.into_json().unwrap(),
            json!({"node": {"__typename": expected, "id": pick.to_string()}})
        );
    }
}

#[tokio::test]
async fn test_list_of_interface_values() {
    let mut registry = Registry::new();
    declare_entities(&mut registry);
    registry
        .declare::<Query>()
        .field(
            Field::new("nodes")
                .ty(list(TypeSpec::of::<Entity>()))
                .resolver(Resolver::sync(|_| Ok(Resolved::list([user("1", "Ada"), bot("2")])))),
        )
        .object(ObjectType::new())
        .unwrap();

    let data = run(&registry, ExecutionRequest::new("{ nodes { __typename id } }")).await;
    assert_eq!(
        data,
        json!({"nodes": [
            {"__typename": "User", "id": "1"},
            {"__typename": "Bot", "id": "2"}
        ]})
    );
}

#[tokio::test]
async fn test_unknown_value_for_interface_is_reported() {
    let mut registry = Registry::new();
    declare_entities(&mut registry);
    registry
        .declare::<Query>()
        .field(
            Field::new("node")
                .ty(nullable(TypeSpec::of::<Entity>()))
                .resolver(Resolver::sync(|_| Ok(Instance::opaque(Orphan).into()))),
        )
        .object(ObjectType::new())
        .unwrap();

    let schema = compile(&registry).build_schema().unwrap();
    let response = execute(&schema, ExecutionRequest::new("{ node { id } }")).await;
    assert_eq!(response.errors.len(), 1);
    assert!(
        response.errors[0]
            .message
            .contains("Error resolving type for Node: Orphan not found in implementations"),
        "unexpected message: {}",
        response.errors[0].message
    );
}

// =============================================================================
// Inheritance Tests
// =============================================================================

#[tokio::test]
async fn test_extended_object_inherits_fields_and_interfaces() {
    let mut registry = Registry::new();
    declare_entities(&mut registry);
    registry
        .declare::<Admin>()
        .field(Field::infer::<i32>("level"))
        .object(ObjectType::new().extends(Extends::of::<Admin, User>()))
        .unwrap();
    registry
        .declare::<Query>()
        .field(
            Field::new("node")
                .ty(TypeSpec::of::<Entity>())
                .resolver(Resolver::sync(|_| Ok(admin("9", "Root", 3).into()))),
        )
        .object(ObjectType::new())
        .unwrap();

    let bundle = compile(&registry);
    let schema = bundle.build_schema().unwrap();
    assert!(schema.sdl().contains("type Admin implements Node"));

    let response = execute(
        &schema,
        ExecutionRequest::new("{ node { __typename id ... on Admin { name level } } }"),
    )
    .await;
    assert!(response.errors.is_empty(), "errors: {:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({"node": {"__typename": "Admin", "id": "9", "name": "Root", "level": 3}})
    );
}

fn declare_tagged_user(registry: &mut Registry) {
    registry
        .declare::<User>()
        .field(Field::infer::<String>("name"))
        .field(
            Field::new("tag")
                .ty(string())
                .resolver(Resolver::method(|this: &User, _| Ok(format!("@{}", this.name).into()))),
        )
        .object(ObjectType::new())
        .unwrap();
    registry
        .declare::<Admin>()
        .field(Field::infer::<i32>("level"))
        .object(ObjectType::new().extends(Extends::of::<Admin, User>()))
        .unwrap();
}

#[tokio::test]
async fn test_inherited_method_resolver_sees_extended_part() {
    let mut registry = Registry::new();
    declare_tagged_user(&mut registry);
    registry
        .declare::<Query>()
        .field(
            Field::new("admin")
                .ty(TypeSpec::of::<Admin>())
                .resolver(Resolver::sync(|_| Ok(admin("1", "root", 7).into()))),
        )
        .object(ObjectType::new())
        .unwrap();

    let data = run(&registry, ExecutionRequest::new("{ admin { tag name level } }")).await;
    assert_eq!(data, json!({"admin": {"tag": "@root", "name": "root", "level": 7}}));
}

#[tokio::test]
async fn test_union_descendant_uses_member_resolvers() {
    let members = union_type(UnionType::new("Account").member::<User>());

    let mut registry = Registry::new();
    declare_tagged_user(&mut registry);
    registry
        .declare::<Query>()
        .field(
            Field::new("accounts")
                .ty(list(members))
                .resolver(Resolver::sync(|_| {
                    Ok(Resolved::list([user("1", "ada"), admin("2", "root", 1)]))
                })),
        )
        .object(ObjectType::new())
        .unwrap();

    let data = run(
        &registry,
        ExecutionRequest::new("{ accounts { __typename ... on User { tag } } }"),
    )
    .await;
    assert_eq!(
        data,
        json!({"accounts": [
            {"__typename": "User", "tag": "@ada"},
            {"__typename": "User", "tag": "@root"}
        ]})
    );
}

#[tokio::test]
async fn test_declared_field_overrides_interface_field() {
    let mut registry = Registry::new();
    registry
        .declare::<Entity>()
        .field(Field::new("id").ty(id()))
        .interface(InterfaceType::new().name("Node"))
        .unwrap();
    registry
        .declare::<User>()
        .field(
            Field::new("id")
                .ty(id())
                .resolver(Resolver::method(|this: &User, _| Ok(format!("user:{}", this.id).into()))),
        )
        .field(Field::infer::<String>("name"))
        .implements::<Entity>()
        .object(ObjectType::new())
        .unwrap();
    registry
        .declare::<Query>()
        .field(
            Field::new("me")
                .ty(TypeSpec::of::<User>())
                .resolver(Resolver::sync(|_| Ok(user("7", "Ada").into()))),
        )
        .object(ObjectType::new())
        .unwrap();

    let data = run(&registry, ExecutionRequest::new("{ me { id name } }")).await;
    assert_eq!(data, json!({"me": {"id": "user:7", "name": "Ada"}}));
}

// =============================================================================
// Argument Tests
// =============================================================================

fn declare_search(registry: &mut Registry) {
    registry
        .declare::<SearchInput>()
        .input_field(InputField::infer::<String>("foo"))
        .input_object(InputObjectType::new())
        .unwrap();
    registry
        .declare::<SearchArgs>()
        .input_field(InputField::infer::<String>("bar"))
        .input_field(InputField::new("input").ty(TypeSpec::of::<SearchInput>()))
        .args()
        .unwrap();
    registry
        .declare::<Query>()
        .field(
            Field::new("search")
                .ty(string())
                .args::<SearchArgs>()
                .resolver(Resolver::sync(|call| {
                    let args = call.args::<SearchArgs>()?;
                    Ok(format!("{}:{}", args.bar, args.input.foo).into())
                })),
        )
        .object(ObjectType::new())
        .unwrap();
}

#[tokio::test]
async fn test_args_bundle_is_materialized() {
    let mut registry = Registry::new();
    declare_search(&mut registry);

    let bundle = compile(&registry);
    let resolver = bundle.query.fields["search"].resolver.clone();
    let raw = Value::from_json(json!({"bar": "x", "input": {"foo": "y"}})).unwrap();
    let resolved = resolver.resolve(Parent::None, &raw, None).await.unwrap();
    assert!(matches!(resolved, Resolved::Value(Value::String(s)) if s == "x:y"));
}

#[tokio::test]
async fn test_args_bundle_through_query() {
    let mut registry = Registry::new();
    declare_search(&mut registry);

    let data = run(
        &registry,
        ExecutionRequest::new(r#"{ search(bar: "x", input: {foo: "y"}) }"#),
    )
    .await;
    assert_eq!(data, json!({"search": "x:y"}));

    let data = run(
        &registry,
        ExecutionRequest::new("query($input: SearchInput!) { search(bar: \"a\", input: $input) }")
            .variables(json!({"input": {"foo": "b"}})),
    )
    .await;
    assert_eq!(data, json!({"search": "a:b"}));
}

#[tokio::test]
async fn test_mutation_with_input_object_arg() {
    let mut registry = Registry::new();
    declare_entities(&mut registry);
    registry
        .declare::<NewUser>()
        .input_field(InputField::infer::<String>("name"))
        .input_field(InputField::new("role").ty(nullable(string())).default_value("member"))
        .input_object(InputObjectType::new().name("NewUserInput"))
        .unwrap();
    registry
        .declare::<Query>()
        .field(Field::new("ping").ty(string()).resolver(Resolver::sync(|_| Ok("pong".into()))))
        .object(ObjectType::new())
        .unwrap();
    registry
        .declare::<Mutation>()
        .arg("createUser", Arg::new("input"))
        .field(
            Field::new("createUser")
                .ty(TypeSpec::of::<User>())
                .arg(TypeSpec::of::<NewUser>())
                .resolver(Resolver::sync(|call| {
                    let input = call.args::<NewUser>()?;
                    let role = input.role.clone().unwrap_or_default();
                    Ok(user(&role, &input.name).into())
                })),
        )
        .object(ObjectType::new())
        .unwrap();

    let bundle = compile_schema(
        &registry,
        &CompileSchemaOptions::query::<Query>().mutation::<Mutation>(),
        &SchemaConfig::default(),
    )
    .unwrap();
    assert_eq!(bundle.mutation.as_ref().map(|m| m.name.as_str()), Some("Mutation"));

    let schema = bundle.build_schema().unwrap();
    let response = execute(
        &schema,
        ExecutionRequest::new(r#"mutation { createUser(input: {name: "Ada"}) { id name } }"#),
    )
    .await;
    assert!(response.errors.is_empty(), "errors: {:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({"createUser": {"id": "member", "name": "Ada"}})
    );
}

// =============================================================================
// Wrapper Tests
// =============================================================================

#[tokio::test]
async fn test_enum_values_round_trip() {
    let color = enum_type(
        EnumType::new("Color")
            .value("RED", "r")
            .value("GREEN", "g"),
    );

    let mut registry = Registry::new();
    registry
        .declare::<Query>()
        .arg("echo", Arg::new("color"))
        .field(
            Field::new("echo")
                .ty(color.clone())
                .arg(color)
                .resolver(Resolver::sync(|call| {
                    let internal: String = call.arg()?;
                    assert_eq!(internal, "g");
                    Ok(internal.into())
                })),
        )
        .object(ObjectType::new())
        .unwrap();

    let data = run(&registry, ExecutionRequest::new("{ echo(color: GREEN) }")).await;
    assert_eq!(data, json!({"echo": "GREEN"}));
}

#[tokio::test]
async fn test_list_of_nullable_scalar_skips_null() {
    let shout = scalar_type(ScalarType::new("Shout").serialize(|value| match value {
        Value::String(s) if s.is_empty() => Value::String("(empty)".into()),
        Value::String(s) => Value::String(s.to_uppercase()),
        other => other,
    }));

    let mut registry = Registry::new();
    registry
        .declare::<Query>()
        .field(
            Field::new("words")
                .ty(list(nullable(shout)))
                .resolver(Resolver::sync(|_| Ok(vec![Some(""), None, Some("hi")].into()))),
        )
        .object(ObjectType::new())
        .unwrap();

    let data = run(&registry, ExecutionRequest::new("{ words }")).await;
    assert_eq!(data, json!({"words": ["(empty)", null, "HI"]}));
}

#[tokio::test]
async fn test_union_members_resolve() {
    let result = union_type(
        UnionType::new("SearchResult")
            .member::<User>()
            .member::<Bot>(),
    );

    let mut registry = Registry::new();
    declare_entities(&mut registry);
    registry
        .declare::<Query>()
        .field(
            Field::new("results")
                .ty(list(result))
                .resolver(Resolver::sync(|_| Ok(Resolved::list([bot("2"), user("1", "Ada")])))),
        )
        .object(ObjectType::new())
        .unwrap();

    let data = run(
        &registry,
        ExecutionRequest::new(
            "{ results { __typename ... on User { name } ... on Bot { model } } }",
        ),
    )
    .await;
    assert_eq!(
        data,
        json!({"results": [
            {"__typename": "Bot", "model": "T-800"},
            {"__typename": "User", "name": "Ada"}
        ]})
    );
}

#[tokio::test]
async fn test_nullable_field_is_not_required() {
    let mut registry = Registry::new();
    registry
        .declare::<Query>()
        .field(
            Field::new("maybe")
                .ty(nullable(string()))
                .resolver(Resolver::sync(|_| Ok(Resolved::NULL))),
        )
        .field(Field::new("always").ty(string()).resolver(Resolver::sync(|_| Ok("x".into()))))
        .object(ObjectType::new())
        .unwrap();

    let schema = compile(&registry).build_schema().unwrap();
    let sdl = schema.sdl();
    assert!(sdl.contains("maybe: String\n"), "sdl: {sdl}");
    assert!(sdl.contains("always: String!"), "sdl: {sdl}");

    let response = execute(&schema, ExecutionRequest::new("{ maybe always }")).await;
    assert!(response.errors.is_empty());
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({"maybe": null, "always": "x"})
    );
}

// =============================================================================
// Root and Context Tests
// =============================================================================

#[tokio::test]
async fn test_root_and_context_values() {
    let mut registry = Registry::new();
    registry
        .declare::<Query>()
        .field(Field::infer::<String>("greeting"))
        .field(
            Field::new("viewer")
                .ty(nullable(string()))
                .resolver(Resolver::new(|call| async move {
                    let viewer = call
                        .context::<AppContext>()
                        .map(|context| context.viewer.clone());
                    Ok::<_, async_graphql::Error>(Resolved::from(viewer))
                })),
        )
        .object(ObjectType::new())
        .unwrap();

    let request = ExecutionRequest::new("{ greeting viewer }")
        .root_value(Instance::new(Root {
            greeting: "hello".into(),
        }))
        .context_value(AppContext {
            viewer: "ada".into(),
        });
    let data = run(&registry, request).await;
    assert_eq!(data, json!({"greeting": "hello", "viewer": "ada"}));

    let data = run(&registry, ExecutionRequest::new("{ viewer }")).await;
    assert_eq!(data, json!({"viewer": null}));
}

// =============================================================================
// Metadata Tests
// =============================================================================

fn declare_documented(registry: &mut Registry) {
    registry
        .declare::<Entity>()
        .field(Field::new("id").ty(id()).description("Global id"))
        .interface(InterfaceType::new().name("Node").description("Identified object"))
        .unwrap();
    registry
        .declare::<User>()
        .field(Field::infer::<String>("name").description("Display name"))
        .field(Field::infer::<String>("handle").deprecated("Use name"))
        .implements::<Entity>()
        .object(ObjectType::new().description("A person"))
        .unwrap();
    registry
        .declare::<SearchInput>()
        .input_field(InputField::infer::<String>("foo").description("Search term"))
        .input_object(InputObjectType::new().description("Search filter"))
        .unwrap();
    registry
        .declare::<Query>()
        .arg("users", Arg::new("limit").description("Page size").default_value(10))
        .field(
            Field::new("users")
                .ty(list(TypeSpec::of::<User>()))
                .arg(int()),
        )
        .arg("search", Arg::new("input").description("Search input"))
        .field(
            Field::new("search")
                .ty(list(TypeSpec::of::<User>()))
                .arg(TypeSpec::of::<SearchInput>()),
        )
        .object(ObjectType::new())
        .unwrap();
}

#[test]
fn test_descriptions_and_deprecation_reach_sdl() {
    let mut registry = Registry::new();
    declare_documented(&mut registry);

    let sdl = compile(&registry).build_schema().unwrap().sdl();
    for text in [
        "A person",
        "Identified object",
        "Global id",
        "Display name",
        "Search filter",
        "Search term",
    ] {
        assert!(sdl.contains(text), "missing {text:?} in:\n{sdl}");
    }
    assert!(sdl.contains(r#"@deprecated(reason: "Use name")"#), "sdl:\n{sdl}");
}

#[tokio::test]
async fn test_descriptions_and_deprecation_are_introspectable() {
    let mut registry = Registry::new();
    declare_documented(&mut registry);

    let data = run(
        &registry,
        ExecutionRequest::new(
            r#"{
                user: __type(name: "User") {
                    description
                    fields(includeDeprecated: true) { name description isDeprecated deprecationReason }
                }
                query: __type(name: "Query") {
                    fields { name args { name description defaultValue } }
                }
                input: __type(name: "SearchInput") {
                    description
                    inputFields { name description }
                }
            }"#,
        ),
    )
    .await;
    assert_eq!(
        data,
        json!({
            "user": {
                "description": "A person",
                "fields": [
                    {"name": "id", "description": "Global id", "isDeprecated": false, "deprecationReason": null},
                    {"name": "name", "description": "Display name", "isDeprecated": false, "deprecationReason": null},
                    {"name": "handle", "description": null, "isDeprecated": true, "deprecationReason": "Use name"}
                ]
            },
            "query": {
                "fields": [
                    {"name": "users", "args": [{"name": "limit", "description": "Page size", "defaultValue": "10"}]},
                    {"name": "search", "args": [{"name": "input", "description": "Search input", "defaultValue": null}]}
                ]
            },
            "input": {
                "description": "Search filter",
                "inputFields": [{"name": "foo", "description": "Search term"}]
            }
        })
    );
}

// =============================================================================
// Schema Assembly Tests
// =============================================================================

#[test]
fn test_unreachable_types_are_kept() {
    let mut registry = Registry::new();
    registry
        .declare::<Orphan>()
        .field(Field::new("value").ty(string()))
        .object(ObjectType::new())
        .unwrap();
    registry
        .declare::<Query>()
        .field(Field::new("ping").ty(string()))
        .object(ObjectType::new())
        .unwrap();

    let bundle = compile(&registry);
    let names: Vec<&str> = bundle.types.iter().map(CompiledType::name).collect();
    assert_eq!(names, vec!["Orphan"]);
    assert!(bundle.get("Orphan").is_some());

    let schema = bundle.build_schema().unwrap();
    assert!(schema.sdl().contains("type Orphan"));
}

#[test]
fn test_compiled_roots_are_shared() {
    let mut registry = Registry::new();
    declare_entities(&mut registry);
    registry
        .declare::<Query>()
        .field(Field::new("node").ty(TypeSpec::of::<Entity>()))
        .object(ObjectType::new())
        .unwrap();

    let bundle = compile(&registry);
    let query = bundle
        .definitions()
        .iter()
        .find_map(|ty| match ty {
            CompiledType::Object(object) if object.name == "Query" => Some(object.clone()),
            _ => None,
        })
        .unwrap();
    assert!(Arc::ptr_eq(&query, &bundle.query));
    // Implementers are only known through the interface, not referenced.
    let names: Vec<&str> = bundle.types.iter().map(CompiledType::name).collect();
    assert_eq!(names, vec!["User", "Bot"]);
}

#[test]
fn test_root_must_be_object() {
    let mut registry = Registry::new();
    declare_entities(&mut registry);

    let err = compile_schema(
        &registry,
        &CompileSchemaOptions::query::<Entity>(),
        &SchemaConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::InvalidRoot { root: "Query", .. }));

    let err = compile_schema(
        &registry,
        &CompileSchemaOptions::query::<Query>(),
        &SchemaConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::NotDecorated { .. }));
}

#[test]
fn test_orphaned_declarations() {
    let mut registry = Registry::new();
    registry
        .declare::<Query>()
        .field(Field::new("ping").ty(string()))
        .object(ObjectType::new())
        .unwrap();
    registry
        .declare::<Orphan>()
        .field(Field::new("lost").ty(string()))
        .finish()
        .unwrap();

    let err = compile_schema(
        &registry,
        &CompileSchemaOptions::query::<Query>(),
        &SchemaConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::OrphanedDeclarations { ref type_names } if type_names == &["Orphan"]));

    let config = SchemaConfig {
        reject_orphaned_declarations: false,
        ..SchemaConfig::default()
    };
    let bundle = compile_schema(&registry, &CompileSchemaOptions::query::<Query>(), &config).unwrap();
    assert!(bundle.get("Orphan").is_none());
}

#[test]
fn test_arg_for_undeclared_field_is_rejected() {
    let mut registry = Registry::new();
    registry
        .declare::<Query>()
        .arg("pingg", Arg::new("times").ty(int()))
        .field(Field::new("ping").ty(string()))
        .object(ObjectType::new())
        .unwrap();

    let err = compile_schema(
        &registry,
        &CompileSchemaOptions::query::<Query>(),
        &SchemaConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::OrphanedArgs { ref fields } if fields == &["Query.pingg"]));
    assert_eq!(err.error_code(), "ORPHANED_ARGS");

    let config = SchemaConfig {
        reject_orphaned_declarations: false,
        ..SchemaConfig::default()
    };
    let schema = compile_schema(&registry, &CompileSchemaOptions::query::<Query>(), &config)
        .unwrap()
        .build_schema()
        .unwrap();
    assert!(schema.sdl().contains("ping: String!"));
}
