//! Query execution against a built schema.

use async_graphql::dynamic::Schema;
use async_graphql::{Request, Response, Variables};
use tracing::trace;

use crate::value::{ContextValue, Instance, RootValue};

/// A query with its optional root value, context value and variables.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    query: String,
    root_value: Option<Instance>,
    context_value: Option<ContextValue>,
    variables: Option<serde_json::Value>,
}

impl ExecutionRequest {
    /// Creates a request for `query`.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            root_value: None,
            context_value: None,
            variables: None,
        }
    }

    /// Sets the parent value of root fields.
    #[must_use]
    pub fn root_value(mut self, root: Instance) -> Self {
        self.root_value = Some(root);
        self
    }

    /// Sets the context value available to every resolver.
    #[must_use]
    pub fn context_value<T: Send + Sync + 'static>(mut self, context: T) -> Self {
        self.context_value = Some(ContextValue::new(context));
        self
    }

    /// Sets the variables, as a JSON object.
    #[must_use]
    pub fn variables(mut self, variables: serde_json::Value) -> Self {
        self.variables = Some(variables);
        self
    }
}

/// Executes `request` against `schema`. Resolver failures are reported in the
/// response's `errors`.
pub async fn execute(schema: &Schema, request: ExecutionRequest) -> Response {
    trace!(query = %request.query, "Executing GraphQL request");

    let mut gql_request = Request::new(request.query);
    if let Some(variables) = request.variables {
        gql_request = gql_request.variables(Variables::from_json(variables));
    }
    if let Some(root) = request.root_value {
        gql_request = gql_request.data(RootValue(root));
    }
    if let Some(context) = request.context_value {
        gql_request = gql_request.data(context);
    }

    schema.execute(gql_request).await
}
