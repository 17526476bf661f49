use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::modules::visits::core::ports::{CellDirectory, PdlDirectory, StoreError, VisitorDirectory};
use crate::modules::visits::core::visitor::{CellRecord, PdlRecord, VisitorRecord};

const VISITOR_COLUMNS: &str =
    "id, visitor_code, pdl_id, name, relationship, contact_number, verified_conjugal";

#[derive(FromRow)]
struct VisitorRow {
    id: i64,
    visitor_code: String,
    pdl_id: i64,
    name: String,
    relationship: String,
    contact_number: String,
    verified_conjugal: bool,
}

impl From<VisitorRow> for VisitorRecord {
    fn from(row: VisitorRow) -> Self {
        Self {
            id: row.id,
            visitor_code: row.visitor_code,
            pdl_id: row.pdl_id,
            name: row.name,
            relationship: row.relationship,
            contact_number: row.contact_number,
            verified_conjugal: row.verified_conjugal,
        }
    }
}

#[derive(FromRow)]
struct PdlRow {
    id: i64,
    last_name: String,
    first_name: String,
    middle_name: Option<String>,
    cell_number: String,
}

impl From<PdlRow> for PdlRecord {
    fn from(row: PdlRow) -> Self {
        Self {
            id: row.id,
            last_name: row.last_name,
            first_name: row.first_name,
            middle_name: row.middle_name,
            cell_number: row.cell_number,
        }
    }
}

#[derive(FromRow)]
struct CellRow {
    id: i64,
    cell_number: String,
    label: String,
}

impl From<CellRow> for CellRecord {
    fn from(row: CellRow) -> Self {
        Self {
            id: row.id,
            cell_number: row.cell_number,
            label: row.label,
        }
    }
}

/// Visitors, PDLs and cells read from the registration tables.
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn visitors_named(&self, name: &str) -> Result<Vec<VisitorRecord>, StoreError> {
        let rows: Vec<VisitorRow> = sqlx::query_as(&format!(
            "SELECT {VISITOR_COLUMNS} FROM visitors WHERE name = $1 ORDER BY id"
        ))
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

pub(crate) fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl VisitorDirectory for PgDirectory {
    async fn get_by_visitor_code(&self, visitor_code: &str) -> Result<Option<VisitorRecord>, StoreError> {
        let row: Option<VisitorRow> = sqlx::query_as(&format!(
            "SELECT {VISITOR_COLUMNS} FROM visitors WHERE visitor_code = $1"
        ))
        .bind(visitor_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        Ok(row.map(Into::into))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<VisitorRecord>, StoreError> {
        let row: Option<VisitorRow> =
            sqlx::query_as(&format!("SELECT {VISITOR_COLUMNS} FROM visitors WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;
        Ok(row.map(Into::into))
    }

    async fn find_by_exact_name(
        &self,
        name: &str,
        pdl_name: Option<&str>,
    ) -> Result<Option<VisitorRecord>, StoreError> {
        let candidates = self.visitors_named(name).await?;
        let Some(pdl_name) = pdl_name else {
            return Ok(candidates.into_iter().next());
        };
        // PDL display names are composed, so the match happens here rather than in SQL.
        for candidate in candidates {
            let pdl = PdlDirectory::get_by_id(self, candidate.pdl_id).await?;
            if pdl.is_some_and(|pdl| pdl.display_name() == pdl_name) {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    async fn find_by_visitor_and_pdl_name(
        &self,
        visitor_name: &str,
        pdl_name: &str,
    ) -> Result<Option<VisitorRecord>, StoreError> {
        self.find_by_exact_name(visitor_name, Some(pdl_name)).await
    }
}

#[async_trait]
impl PdlDirectory for PgDirectory {
    async fn get_by_id(&self, id: i64) -> Result<Option<PdlRecord>, StoreError> {
        let row: Option<PdlRow> = sqlx::query_as(
            "SELECT id, last_name, first_name, middle_name, cell_number FROM pdls WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl CellDirectory for PgDirectory {
    async fn get_by_cell_number(&self, cell_number: &str) -> Result<Option<CellRecord>, StoreError> {
        let row: Option<CellRow> = sqlx::query_as(
            "SELECT id, cell_number, label FROM cells \
             WHERE trim(cell_number) = $1 OR lower(trim(label)) = lower($1) \
             ORDER BY id LIMIT 1",
        )
        .bind(cell_number.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        Ok(row.map(Into::into))
    }
}
