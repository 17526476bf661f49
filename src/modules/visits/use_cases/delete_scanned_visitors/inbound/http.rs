use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::visits::core::visit_log::DateRange;
use crate::modules::visits::use_cases::delete_scanned_visitors::command::DeleteScannedVisitors;
use crate::modules::visits::use_cases::delete_scanned_visitors::handler::delete_scanned_visitors;
use crate::shell::http::{error_response, store_error_response};
use crate::shell::state::AppState;

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRangeBody {
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
    pub deleted: u64,
}

async fn run(state: &AppState, command: DeleteScannedVisitors, message: &'static str) -> Response {
    match delete_scanned_visitors(state.admin.as_ref(), command).await {
        Ok(deleted) => Json(DeletedResponse { message, deleted }).into_response(),
        Err(e) => store_error_response(&e),
    }
}

pub async fn handle_one(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    run(&state, DeleteScannedVisitors::One(id), "Visit log entry deleted").await
}

/// An empty body clears the whole log.
pub async fn handle_all(State(state): State<AppState>, body: Bytes) -> Response {
    let params = if body.iter().all(u8::is_ascii_whitespace) {
        DeleteRangeBody::default()
    } else {
        match serde_json::from_slice::<DeleteRangeBody>(&body) {
            Ok(params) => params,
            Err(e) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        }
    };

    let range = match DateRange::from_params(
        params.date.as_deref(),
        params.start_date.as_deref(),
        params.end_date.as_deref(),
    ) {
        Ok(range) => range,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };
    run(&state, DeleteScannedVisitors::All(range), "Visit log entries deleted").await
}
