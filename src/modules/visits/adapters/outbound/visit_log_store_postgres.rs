use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::modules::visits::adapters::outbound::directory_postgres::backend;
use crate::modules::visits::core::ports::{
    StoreError, VisitLogAdmin, VisitLogQueries, VisitLogStore, VisitorLink,
};
use crate::modules::visits::core::visit_log::{DateRange, NewVisitLogEntry, VisitLogEntry};

const COLUMNS: &str = "id, visitor_id, visitor_code, visitor_name, pdl_name, cell, \
                       time_in, time_out, scan_date, relationship, contact_number, purpose";

/// Same expression as the `visit_logs_one_open_visit` index.
const OPEN_KEY_MATCH: &str = "lower(trim(visitor_name)) = lower(trim($1)) \
                              AND lower(trim(pdl_name)) = lower(trim($2)) \
                              AND lower(trim(cell)) = lower(trim($3))";

#[derive(FromRow)]
struct VisitLogRow {
    id: Uuid,
    visitor_id: Option<i64>,
    visitor_code: Option<String>,
    visitor_name: String,
    pdl_name: String,
    cell: String,
    time_in: NaiveDateTime,
    time_out: Option<NaiveDateTime>,
    scan_date: NaiveDateTime,
    relationship: String,
    contact_number: String,
    purpose: String,
}

impl From<VisitLogRow> for VisitLogEntry {
    fn from(row: VisitLogRow) -> Self {
        Self {
            id: row.id,
            visitor_id: row.visitor_id,
            visitor_code: row.visitor_code,
            visitor_name: row.visitor_name,
            pdl_name: row.pdl_name,
            cell: row.cell,
            time_in: row.time_in,
            time_out: row.time_out,
            scan_date: row.scan_date,
            relationship: row.relationship,
            contact_number: row.contact_number,
            purpose: row.purpose,
        }
    }
}

pub struct PgVisitLogStore {
    pool: PgPool,
}

impl PgVisitLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        condition: &str,
        binds: &[&str],
    ) -> Result<Option<VisitLogEntry>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM visit_logs WHERE {condition} \
             ORDER BY time_in DESC, id DESC LIMIT 1"
        );
        let mut query = sqlx::query_as::<_, VisitLogRow>(&sql);
        for value in binds {
            query = query.bind(*value);
        }
        let row = query.fetch_optional(&self.pool).await.map_err(backend)?;
        Ok(row.map(Into::into))
    }

    async fn exists(&self, id: Uuid) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM visit_logs WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(backend)
    }
}

fn open_conflict(e: sqlx::Error, visitor_name: &str, pdl_name: &str, cell: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::OpenEntryExists {
            visitor_name: visitor_name.to_string(),
            pdl_name: pdl_name.to_string(),
            cell: cell.to_string(),
        },
        _ => backend(e),
    }
}

fn range_bounds(range: Option<DateRange>) -> (Option<NaiveDate>, Option<NaiveDate>) {
    match range {
        Some(range) => (Some(range.start), Some(range.end)),
        None => (None, None),
    }
}

#[async_trait]
impl VisitLogStore for PgVisitLogStore {
    async fn find_open_scan_by_visitor(
        &self,
        link: VisitorLink<'_>,
    ) -> Result<Option<VisitLogEntry>, StoreError> {
        let row: Option<VisitLogRow> = match link {
            VisitorLink::Code(code) => sqlx::query_as::<_, VisitLogRow>(&format!(
                "SELECT {COLUMNS} FROM visit_logs WHERE visitor_code = $1 AND time_out IS NULL \
                 ORDER BY time_in DESC, id DESC LIMIT 1"
            ))
            .bind(code)
            .fetch_optional(&self.pool)
            .await,
            VisitorLink::Id(id) => sqlx::query_as::<_, VisitLogRow>(&format!(
                "SELECT {COLUMNS} FROM visit_logs WHERE visitor_id = $1 AND time_out IS NULL \
                 ORDER BY time_in DESC, id DESC LIMIT 1"
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await,
        }
        .map_err(backend)?;
        Ok(row.map(Into::into))
    }

    async fn find_open_scan_by_visitor_name(
        &self,
        visitor_name: &str,
    ) -> Result<Option<VisitLogEntry>, StoreError> {
        self.fetch_one_where(
            "lower(trim(visitor_name)) = lower(trim($1)) AND time_out IS NULL",
            &[visitor_name],
        )
        .await
    }

    async fn find_open_scan_by_visitor_details(
        &self,
        visitor_name: &str,
        pdl_name: &str,
        cell: &str,
    ) -> Result<Option<VisitLogEntry>, StoreError> {
        self.fetch_one_where(
            &format!("{OPEN_KEY_MATCH} AND time_out IS NULL"),
            &[visitor_name, pdl_name, cell],
        )
        .await
    }

    async fn find_recent_scan_by_visitor_details(
        &self,
        visitor_name: &str,
        pdl_name: &str,
        cell: &str,
        since: NaiveDateTime,
    ) -> Result<Option<VisitLogEntry>, StoreError> {
        let row: Option<VisitLogRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM visit_logs WHERE {OPEN_KEY_MATCH} AND time_in >= $4 \
             ORDER BY time_in DESC, id DESC LIMIT 1"
        ))
        .bind(visitor_name)
        .bind(pdl_name)
        .bind(cell)
        .bind(since)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        Ok(row.map(Into::into))
    }

    async fn add(&self, entry: NewVisitLogEntry) -> Result<VisitLogEntry, StoreError> {
        let row: VisitLogRow = sqlx::query_as(&format!(
            "INSERT INTO visit_logs ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NULL, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        ))
        .bind(Uuid::now_v7())
        .bind(entry.visitor_id)
        .bind(entry.visitor_code.as_deref())
        .bind(&entry.visitor_name)
        .bind(&entry.pdl_name)
        .bind(&entry.cell)
        .bind(entry.time_in)
        .bind(&entry.relationship)
        .bind(&entry.contact_number)
        .bind(&entry.purpose)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| open_conflict(e, &entry.visitor_name, &entry.pdl_name, &entry.cell))?;
        Ok(row.into())
    }

    async fn update_time_out(
        &self,
        id: Uuid,
        time_out: NaiveDateTime,
    ) -> Result<Option<VisitLogEntry>, StoreError> {
        let row: Option<VisitLogRow> = sqlx::query_as(&format!(
            "UPDATE visit_logs SET time_out = $2 WHERE id = $1 AND time_out IS NULL \
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(time_out)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match row {
            Some(row) => Ok(Some(row.into())),
            None if self.exists(id).await? => Ok(None),
            None => Err(StoreError::NotFound(id)),
        }
    }
}

#[async_trait]
impl VisitLogQueries for PgVisitLogStore {
    async fn get(&self, id: Uuid) -> Result<Option<VisitLogEntry>, StoreError> {
        let row: Option<VisitLogRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM visit_logs WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;
        Ok(row.map(Into::into))
    }

    async fn list(&self, range: Option<DateRange>) -> Result<Vec<VisitLogEntry>, StoreError> {
        let (start, end) = range_bounds(range);
        let rows: Vec<VisitLogRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM visit_logs \
             WHERE $1::date IS NULL OR time_in::date BETWEEN $1 AND $2 \
             ORDER BY time_in DESC, id DESC"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl VisitLogAdmin for PgVisitLogStore {
    async fn update_times(
        &self,
        id: Uuid,
        time_in: Option<NaiveDateTime>,
        time_out: Option<Option<NaiveDateTime>>,
    ) -> Result<VisitLogEntry, StoreError> {
        let result: Result<Option<VisitLogRow>, sqlx::Error> = sqlx::query_as(&format!(
            "UPDATE visit_logs SET time_in = COALESCE($2, time_in), \
             time_out = CASE WHEN $3 THEN $4 ELSE time_out END \
             WHERE id = $1 AND (CASE WHEN $3 THEN $4 ELSE time_out END IS NULL \
             OR CASE WHEN $3 THEN $4 ELSE time_out END >= COALESCE($2, time_in)) \
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(time_in)
        .bind(time_out.is_some())
        .bind(time_out.flatten())
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(row)) => Ok(row.into()),
            Ok(None) if self.exists(id).await? => Err(StoreError::InvalidInterval(id)),
            Ok(None) => Err(StoreError::NotFound(id)),
            Err(e) => {
                // A reopen can collide with another open visit; name it after this row.
                let current = VisitLogQueries::get(self, id).await?.ok_or(StoreError::NotFound(id))?;
                Err(open_conflict(e, &current.visitor_name, &current.pdl_name, &current.cell))
            }
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let done = sqlx::query("DELETE FROM visit_logs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(done.rows_affected() > 0)
    }

    async fn delete_all(&self, range: Option<DateRange>) -> Result<u64, StoreError> {
        let (start, end) = range_bounds(range);
        let done = sqlx::query(
            "DELETE FROM visit_logs WHERE $1::date IS NULL OR time_in::date BETWEEN $1 AND $2",
        )
        .bind(start)
        .bind(end)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(done.rows_affected())
    }
}
