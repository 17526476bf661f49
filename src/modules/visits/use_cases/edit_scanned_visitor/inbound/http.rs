use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::modules::visits::use_cases::edit_scanned_visitor::command::EditScannedVisitor;
use crate::modules::visits::use_cases::edit_scanned_visitor::handler::{EditError, edit_scanned_visitor};
use crate::shared::core::primitives::parse_local;
use crate::shell::http::{error_response, store_error_response};
use crate::shell::state::AppState;

#[derive(Deserialize)]
pub struct EditScannedVisitorBody {
    pub time_in: Option<String>,
    /// Absent keeps the current value, `null` reopens the visit.
    #[serde(default, deserialize_with = "present")]
    pub time_out: Option<Option<String>>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Option<String>>, D::Error> {
    Option::<String>::deserialize(deserializer).map(Some)
}

fn parse_field(field: &str, value: &str) -> Result<NaiveDateTime, String> {
    parse_local(value).ok_or_else(|| format!("invalid {field}: {value} (expected YYYY-MM-DD HH:MM:SS)"))
}

impl EditScannedVisitorBody {
    pub fn into_command(self, id: Uuid) -> Result<EditScannedVisitor, String> {
        let time_in = self
            .time_in
            .as_deref()
            .map(|value| parse_field("time_in", value))
            .transpose()?;
        let time_out = match self.time_out {
            Some(Some(value)) => Some(Some(parse_field("time_out", &value)?)),
            Some(None) => Some(None),
            None => None,
        };
        Ok(EditScannedVisitor {
            id,
            time_in,
            time_out,
        })
    }
}

pub async fn handle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<EditScannedVisitorBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text()),
    };
    let command = match body.into_command(id) {
        Ok(command) => command,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    match edit_scanned_visitor(state.admin.as_ref(), command).await {
        Ok(entry) => Json(entry).into_response(),
        Err(e @ (EditError::NothingToUpdate | EditError::InvalidInterval)) => {
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(EditError::Store(e)) => store_error_response(&e),
    }
}
