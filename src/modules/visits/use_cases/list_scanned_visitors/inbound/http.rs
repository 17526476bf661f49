use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::modules::visits::use_cases::list_scanned_visitors::handler::{
    ListError, ListFilter, list_scanned_visitors,
};
use crate::shell::http::{error_response, store_error_response};
use crate::shell::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListScannedVisitorsParams {
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub async fn handle(
    State(state): State<AppState>,
    Query(params): Query<ListScannedVisitorsParams>,
) -> Response {
    let filter = ListFilter {
        date: params.date,
        start_date: params.start_date,
        end_date: params.end_date,
    };
    match list_scanned_visitors(state.queries.as_ref(), &filter).await {
        Ok(entries) => Json(entries).into_response(),
        Err(ListError::InvalidRange(e)) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        Err(ListError::Store(e)) => store_error_response(&e),
    }
}
