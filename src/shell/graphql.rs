use async_graphql::{EmptySubscription, Schema, http::GraphiQLSource};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{Extension, response::Html};

use crate::modules::visits::core::ports::StoreError;
pub use crate::modules::visits::use_cases::list_scanned_visitors::inbound::graphql::QueryRoot;
pub use crate::modules::visits::use_cases::scan_visitor::inbound::graphql::MutationRoot;
use crate::shell::state::AppState;

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(state: AppState) -> AppSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(state)
        .finish()
}

/// GraphQL twin of `store_error_response`: backend failures are logged and
/// hidden from the client.
pub fn store_error(error: &StoreError) -> async_graphql::Error {
    match error {
        StoreError::Backend(message) => {
            tracing::error!(error = %message, "visit log storage failure");
            async_graphql::Error::new("Internal server error")
        }
        other => async_graphql::Error::new(other.to_string()),
    }
}

pub async fn graphql(Extension(schema): Extension<AppSchema>, req: GraphQLRequest) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

pub async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint("/gql").finish())
}

#[cfg(test)]
mod graphql_schema_tests {
    use super::build_schema;
    use crate::tests::fixtures::{make_offline_test_state, make_test_state};

    #[tokio::test]
    async fn it_should_scan_and_list_through_graphql() {
        let (state, _) = make_test_state();
        let schema = build_schema(state);

        let scanned = schema
            .execute(r#"mutation { scanVisitor(visitorId: "VIS-25-000123") { action cell entryId } }"#)
            .await;
        assert!(scanned.errors.is_empty(), "{:?}", scanned.errors);
        let scanned = scanned.data.into_json().unwrap();
        assert_eq!(scanned["scanVisitor"]["action"], "time_in");
        assert_eq!(scanned["scanVisitor"]["cell"], "Cell - 1");

        let listed = schema
            .execute("{ scannedVisitors { id visitorName timeOut } }")
            .await
            .data
            .into_json()
            .unwrap();
        assert_eq!(listed["scannedVisitors"][0]["id"], scanned["scanVisitor"]["entryId"]);
        assert_eq!(listed["scannedVisitors"][0]["visitorName"], "Juan Dela Cruz");
        assert_eq!(listed["scannedVisitors"][0]["timeOut"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn it_should_surface_resolver_errors() {
        let (state, _) = make_test_state();
        let response = build_schema(state)
            .execute(r#"mutation { scanVisitor(visitorId: "VIS-99-999999") { action } }"#)
            .await;
        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].message.starts_with("Visitor not found"));
    }

    #[tokio::test]
    async fn it_should_hide_storage_failures_from_graphql_clients() {
        let schema = build_schema(make_offline_test_state());

        let scanned = schema
            .execute(r#"mutation { scanVisitor(visitorId: "VIS-25-000123") { action } }"#)
            .await;
        assert_eq!(scanned.errors.len(), 1);
        assert_eq!(scanned.errors[0].message, "Internal server error");

        let listed = schema.execute("{ scannedVisitors { id } }").await;
        assert_eq!(listed.errors.len(), 1);
        assert_eq!(listed.errors[0].message, "Internal server error");
    }

    #[tokio::test]
    async fn it_should_keep_range_errors_readable() {
        let (state, _) = make_test_state();
        let response = build_schema(state)
            .execute(r#"{ scannedVisitors(startDate: "2025-03-01") { id } }"#)
            .await;
        assert_eq!(response.errors.len(), 1);
        assert_ne!(response.errors[0].message, "Internal server error");
    }
}
