use async_graphql::{Context, Object, Result as GqlResult, SimpleObject};

use crate::modules::visits::core::visit_log::VisitLogEntry;
use crate::modules::visits::use_cases::list_scanned_visitors::handler::{
    ListError, ListFilter, list_scanned_visitors,
};
use crate::shared::core::primitives::format_local;
use crate::shell::graphql::store_error;
use crate::shell::state::AppState;

#[derive(SimpleObject, Clone)]
pub struct GqlVisitLog {
    pub id: String,
    pub visitor_id: Option<i64>,
    pub visitor_code: Option<String>,
    pub visitor_name: String,
    pub pdl_name: String,
    pub cell: String,
    pub time_in: String,
    pub time_out: Option<String>,
    pub scan_date: String,
    pub relationship: String,
    pub contact_number: String,
    pub purpose: String,
}

impl From<VisitLogEntry> for GqlVisitLog {
    fn from(e: VisitLogEntry) -> Self {
        Self {
            id: e.id.to_string(),
            visitor_id: e.visitor_id,
            visitor_code: e.visitor_code,
            visitor_name: e.visitor_name,
            pdl_name: e.pdl_name,
            cell: e.cell,
            time_in: format_local(&e.time_in),
            time_out: e.time_out.as_ref().map(format_local),
            scan_date: format_local(&e.scan_date),
            relationship: e.relationship,
            contact_number: e.contact_number,
            purpose: e.purpose,
        }
    }
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn scanned_visitors(
        &self,
        context: &Context<'_>,
        date: Option<String>,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> GqlResult<Vec<GqlVisitLog>> {
        let state = context.data_unchecked::<AppState>();
        let filter = ListFilter {
            date,
            start_date,
            end_date,
        };
        let list = list_scanned_visitors(state.queries.as_ref(), &filter)
            .await
            .map_err(|e| match e {
                ListError::Store(store) => store_error(&store),
                other => async_graphql::Error::new(other.to_string()),
            })?;
        Ok(list.into_iter().map(Into::into).collect())
    }
}
