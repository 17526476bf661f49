use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, put},
};
use serde::Serialize;

use crate::modules::visits::core::ports::StoreError;
use crate::modules::visits::use_cases::delete_scanned_visitors::inbound::http as delete_http;
use crate::modules::visits::use_cases::edit_scanned_visitor::inbound::http as edit_http;
use crate::modules::visits::use_cases::list_scanned_visitors::inbound::http as list_http;
use crate::modules::visits::use_cases::scan_visitor::inbound::http as scan_http;
use crate::shell::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/scanned_visitors",
            get(list_http::handle).post(scan_http::handle),
        )
        .route("/api/scanned_visitors/all", delete(delete_http::handle_all))
        .route(
            "/api/scanned_visitors/{id}",
            put(edit_http::handle).delete(delete_http::handle_one),
        )
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

pub fn store_error_response(error: &StoreError) -> Response {
    match error {
        StoreError::NotFound(_) => error_response(StatusCode::NOT_FOUND, error.to_string()),
        StoreError::OpenEntryExists { .. } => error_response(StatusCode::CONFLICT, error.to_string()),
        StoreError::InvalidInterval(_) => error_response(StatusCode::BAD_REQUEST, error.to_string()),
        StoreError::Backend(message) => {
            tracing::error!(error = %message, "visit log storage failure");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}
