use thiserror::Error;

use crate::modules::visits::core::ports::{StoreError, VisitLogQueries};
use crate::modules::visits::core::visit_log::{DateRange, DateRangeError, VisitLogEntry};

#[derive(Debug, Error)]
pub enum ListError {
    #[error(transparent)]
    InvalidRange(#[from] DateRangeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Raw filter values as they arrive from a query string or GraphQL arguments.
#[derive(Debug, Default, Clone)]
pub struct ListFilter {
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub async fn list_scanned_visitors(
    queries: &dyn VisitLogQueries,
    filter: &ListFilter,
) -> Result<Vec<VisitLogEntry>, ListError> {
    let range = DateRange::from_params(
        filter.date.as_deref(),
        filter.start_date.as_deref(),
        filter.end_date.as_deref(),
    )?;
    Ok(queries.list(range).await?)
}
