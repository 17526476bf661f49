use async_graphql::{Context, Object, Result as GqlResult, SimpleObject};
use chrono::Utc;

use crate::modules::visits::use_cases::scan_visitor::command::ScanVisitor;
use crate::modules::visits::use_cases::scan_visitor::decision::{ResolveError, ScanOutcome};
use crate::shared::core::primitives::format_local;
use crate::shell::graphql::store_error;
use crate::shell::state::AppState;

#[derive(SimpleObject, Clone)]
pub struct GqlScanOutcome {
    pub action: String,
    pub message: String,
    pub entry_id: Option<String>,
    pub visitor_name: String,
    pub pdl_name: String,
    pub cell: String,
    pub purpose: Option<String>,
    pub verified_conjugal: bool,
    pub time_in: Option<String>,
    pub time_out: Option<String>,
}

impl From<ScanOutcome> for GqlScanOutcome {
    fn from(o: ScanOutcome) -> Self {
        Self {
            action: o.action.as_str().to_string(),
            message: o.message().to_string(),
            entry_id: o.entry_id.map(|id| id.to_string()),
            time_in: o.time_in.as_ref().map(format_local),
            time_out: o.time_out.as_ref().map(format_local),
            visitor_name: o.visitor_name,
            pdl_name: o.pdl_name,
            cell: o.cell,
            purpose: o.purpose,
            verified_conjugal: o.verified_conjugal,
        }
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn scan_visitor(
        &self,
        context: &Context<'_>,
        visitor_id: Option<String>,
        visitor_name: Option<String>,
        pdl_name: Option<String>,
        cell: Option<String>,
        device_time: Option<String>,
        purpose: Option<String>,
        only_check: Option<bool>,
    ) -> GqlResult<GqlScanOutcome> {
        let state = context.data_unchecked::<AppState>();

        let command = ScanVisitor {
            visitor_id,
            visitor_name,
            pdl_name,
            cell,
            device_time,
            purpose,
            only_check: only_check.unwrap_or(false),
            received_at: Utc::now(),
        };

        let outcome = state
            .resolver
            .handle(command)
            .await
            .map_err(|e| match e {
                ResolveError::Storage(store) => store_error(&store),
                other => async_graphql::Error::new(other.to_string()),
            })?;
        Ok(outcome.into())
    }
}
