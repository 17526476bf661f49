// Ports define what the visit log core needs from the outside world.
//
// Purpose
// - Describe the directories (visitors, PDLs, cells) and the visit log store as traits.
//
// Boundaries
// - No concrete input or output here. Adapters implement these traits in the adapters layer.
//
// Testing guidance
// - In memory implementations live next to the PostgreSQL ones and support an offline toggle.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;
use uuid::Uuid;

use crate::modules::visits::core::visit_log::{DateRange, NewVisitLogEntry, VisitLogEntry};
use crate::modules::visits::core::visitor::{CellRecord, PdlRecord, VisitorRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("visit log entry not found: {0}")]
    NotFound(Uuid),

    #[error("an open visit already exists for {visitor_name} / {pdl_name} / {cell}")]
    OpenEntryExists {
        visitor_name: String,
        pdl_name: String,
        cell: String,
    },

    #[error("time_out must not be before time_in for visit log entry {0}")]
    InvalidInterval(Uuid),

    #[error("backend error: {0}")]
    Backend(String),
}

/// How a visit log row points back at its visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitorLink<'a> {
    Code(&'a str),
    Id(i64),
}

#[async_trait]
pub trait VisitorDirectory: Send + Sync {
    async fn get_by_visitor_code(&self, visitor_code: &str) -> Result<Option<VisitorRecord>, StoreError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<VisitorRecord>, StoreError>;

    /// Exact name match, restricted to visitors of `pdl_name` when given.
    async fn find_by_exact_name(
        &self,
        name: &str,
        pdl_name: Option<&str>,
    ) -> Result<Option<VisitorRecord>, StoreError>;

    async fn find_by_visitor_and_pdl_name(
        &self,
        visitor_name: &str,
        pdl_name: &str,
    ) -> Result<Option<VisitorRecord>, StoreError>;
}

#[async_trait]
pub trait PdlDirectory: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Option<PdlRecord>, StoreError>;
}

#[async_trait]
pub trait CellDirectory: Send + Sync {
    async fn get_by_cell_number(&self, cell_number: &str) -> Result<Option<CellRecord>, StoreError>;
}

/// Write side used by the scan resolver.
#[async_trait]
pub trait VisitLogStore: Send + Sync {
    async fn find_open_scan_by_visitor(
        &self,
        link: VisitorLink<'_>,
    ) -> Result<Option<VisitLogEntry>, StoreError>;

    /// Case-insensitive visitor name match on open entries.
    async fn find_open_scan_by_visitor_name(
        &self,
        visitor_name: &str,
    ) -> Result<Option<VisitLogEntry>, StoreError>;

    /// Case-insensitive (visitor, pdl, cell) match on open entries.
    async fn find_open_scan_by_visitor_details(
        &self,
        visitor_name: &str,
        pdl_name: &str,
        cell: &str,
    ) -> Result<Option<VisitLogEntry>, StoreError>;

    /// Newest entry for the triple with `time_in >= since`, open or not.
    async fn find_recent_scan_by_visitor_details(
        &self,
        visitor_name: &str,
        pdl_name: &str,
        cell: &str,
        since: NaiveDateTime,
    ) -> Result<Option<VisitLogEntry>, StoreError>;

    /// Fails with `OpenEntryExists` when another open entry holds the same key.
    async fn add(&self, entry: NewVisitLogEntry) -> Result<VisitLogEntry, StoreError>;

    /// Closes the entry if it is still open. `Ok(None)` means somebody else
    /// closed it first.
    async fn update_time_out(
        &self,
        id: Uuid,
        time_out: NaiveDateTime,
    ) -> Result<Option<VisitLogEntry>, StoreError>;
}

#[async_trait]
pub trait VisitLogQueries: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<VisitLogEntry>, StoreError>;

    /// Newest `time_in` first.
    async fn list(&self, range: Option<DateRange>) -> Result<Vec<VisitLogEntry>, StoreError>;
}

#[async_trait]
pub trait VisitLogAdmin: Send + Sync {
    /// `time_out: Some(None)` reopens the entry. Fails with `InvalidInterval`
    /// when the resulting `time_out` would precede `time_in`.
    async fn update_times(
        &self,
        id: Uuid,
        time_in: Option<NaiveDateTime>,
        time_out: Option<Option<NaiveDateTime>>,
    ) -> Result<VisitLogEntry, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Deletes everything when `range` is `None`; returns the number of rows removed.
    async fn delete_all(&self, range: Option<DateRange>) -> Result<u64, StoreError>;
}
