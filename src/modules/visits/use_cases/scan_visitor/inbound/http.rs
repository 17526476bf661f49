use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use uuid::Uuid;

use crate::modules::visits::use_cases::scan_visitor::command::ScanVisitor;
use crate::modules::visits::use_cases::scan_visitor::decision::{ResolveError, ScanAction, ScanOutcome};
use crate::shared::core::primitives::format_local;
use crate::shell::http::{error_response, store_error_response};
use crate::shell::state::AppState;

#[derive(Deserialize)]
pub struct ScanVisitorBody {
    #[serde(default, deserialize_with = "string_or_number")]
    pub visitor_id: Option<String>,
    pub visitor_name: Option<String>,
    pub pdl_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub cell: Option<String>,
    pub device_time: Option<String>,
    pub purpose: Option<String>,
    #[serde(default)]
    pub only_check: bool,
}

impl ScanVisitorBody {
    pub fn into_command(self, received_at: DateTime<Utc>) -> ScanVisitor {
        ScanVisitor {
            visitor_id: self.visitor_id,
            visitor_name: self.visitor_name,
            pdl_name: self.pdl_name,
            cell: self.cell,
            device_time: self.device_time,
            purpose: self.purpose,
            only_check: self.only_check,
            received_at,
        }
    }
}

#[derive(Serialize)]
pub struct ScanVisitorResponse {
    pub message: &'static str,
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_out: Option<String>,
    pub action: ScanAction,
    pub visitor_name: String,
    pub pdl_name: String,
    pub cell: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    pub verified_conjugal: bool,
}

impl From<ScanOutcome> for ScanVisitorResponse {
    fn from(outcome: ScanOutcome) -> Self {
        Self {
            message: outcome.message(),
            id: outcome.entry_id,
            time_in: outcome.time_in.as_ref().map(format_local),
            time_out: outcome.time_out.as_ref().map(format_local),
            action: outcome.action,
            visitor_name: outcome.visitor_name,
            pdl_name: outcome.pdl_name,
            cell: outcome.cell,
            purpose: outcome.purpose,
            verified_conjugal: outcome.verified_conjugal,
        }
    }
}

pub async fn handle(
    State(state): State<AppState>,
    body: Result<Json<ScanVisitorBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text()),
    };

    match state.resolver.handle(body.into_command(Utc::now())).await {
        Ok(outcome) => {
            let status = match outcome.action {
                ScanAction::TimeIn => StatusCode::CREATED,
                _ => StatusCode::OK,
            };
            (status, Json(ScanVisitorResponse::from(outcome))).into_response()
        }
        Err(ResolveError::NotFound(message)) => error_response(StatusCode::NOT_FOUND, message),
        Err(ResolveError::InvalidInput(message)) => error_response(StatusCode::BAD_REQUEST, message),
        Err(ResolveError::Storage(e)) => store_error_response(&e),
    }
}

/// Old QR codes encode the visitor's numeric id, which some clients post as a
/// JSON number.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!("expected a string or number, got {other}"))),
    }
}
