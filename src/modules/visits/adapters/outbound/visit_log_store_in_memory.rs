// In memory implementation of the visit log ports.
//
// Purpose
// - Support resolver tests and local development without a database.
//
// Responsibilities
// - Keep rows in insertion order.
// - Enforce the single open entry per (visitor, pdl, cell) key on insert and reopen.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::modules::visits::core::ports::{
    StoreError, VisitLogAdmin, VisitLogQueries, VisitLogStore, VisitorLink,
};
use crate::modules::visits::core::visit_log::{DateRange, NewVisitLogEntry, OpenKey, VisitLogEntry};

#[derive(Default)]
pub struct InMemoryVisitLogStore {
    rows: RwLock<Vec<VisitLogEntry>>,
    delay_add_ms: AtomicU64,
    is_offline: bool,
}

impl InMemoryVisitLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    /// Holds every insert back before it takes the write lock, so concurrent
    /// scans can both pass their lookups first.
    pub fn set_delay_add_ms(&self, ms: u64) {
        self.delay_add_ms.store(ms, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.is_offline {
            return Err(StoreError::Backend("Visit log store offline".into()));
        }
        Ok(())
    }

    async fn newest_where(&self, predicate: impl Fn(&VisitLogEntry) -> bool) -> Option<VisitLogEntry> {
        self.rows
            .read()
            .await
            .iter()
            .filter(|row| predicate(row))
            .max_by_key(|row| row.time_in)
            .cloned()
    }
}

fn conflict(key_holder: &VisitLogEntry) -> StoreError {
    StoreError::OpenEntryExists {
        visitor_name: key_holder.visitor_name.clone(),
        pdl_name: key_holder.pdl_name.clone(),
        cell: key_holder.cell.clone(),
    }
}

#[async_trait::async_trait]
impl VisitLogStore for InMemoryVisitLogStore {
    async fn find_open_scan_by_visitor(
        &self,
        link: VisitorLink<'_>,
    ) -> Result<Option<VisitLogEntry>, StoreError> {
        self.ensure_online()?;
        Ok(self
            .newest_where(|row| {
                row.is_open()
                    && match link {
                        VisitorLink::Code(code) => row.visitor_code.as_deref() == Some(code),
                        VisitorLink::Id(id) => row.visitor_id == Some(id),
                    }
            })
            .await)
    }

    async fn find_open_scan_by_visitor_name(
        &self,
        visitor_name: &str,
    ) -> Result<Option<VisitLogEntry>, StoreError> {
        self.ensure_online()?;
        let wanted = visitor_name.trim().to_lowercase();
        Ok(self
            .newest_where(|row| row.is_open() && row.visitor_name.trim().to_lowercase() == wanted)
            .await)
    }

    async fn find_open_scan_by_visitor_details(
        &self,
        visitor_name: &str,
        pdl_name: &str,
        cell: &str,
    ) -> Result<Option<VisitLogEntry>, StoreError> {
        self.ensure_online()?;
        let key = OpenKey::new(visitor_name, pdl_name, cell);
        Ok(self
            .newest_where(|row| row.is_open() && row.open_key() == key)
            .await)
    }

    async fn find_recent_scan_by_visitor_details(
        &self,
        visitor_name: &str,
        pdl_name: &str,
        cell: &str,
        since: NaiveDateTime,
    ) -> Result<Option<VisitLogEntry>, StoreError> {
        self.ensure_online()?;
        let key = OpenKey::new(visitor_name, pdl_name, cell);
        Ok(self
            .newest_where(|row| row.time_in >= since && row.open_key() == key)
            .await)
    }

    async fn add(&self, entry: NewVisitLogEntry) -> Result<VisitLogEntry, StoreError> {
        self.ensure_online()?;
        let delay = self.delay_add_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let mut rows = self.rows.write().await;
        let key = entry.open_key();
        if let Some(holder) = rows.iter().find(|row| row.is_open() && row.open_key() == key) {
            return Err(conflict(holder));
        }
        let entry = entry.into_entry(Uuid::now_v7());
        rows.push(entry.clone());
        Ok(entry)
    }

    async fn update_time_out(
        &self,
        id: Uuid,
        time_out: NaiveDateTime,
    ) -> Result<Option<VisitLogEntry>, StoreError> {
        self.ensure_online()?;
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(StoreError::NotFound(id))?;
        if !row.is_open() {
            return Ok(None);
        }
        row.time_out = Some(time_out);
        Ok(Some(row.clone()))
    }
}

#[async_trait::async_trait]
impl VisitLogQueries for InMemoryVisitLogStore {
    async fn get(&self, id: Uuid) -> Result<Option<VisitLogEntry>, StoreError> {
        self.ensure_online()?;
        Ok(self.rows.read().await.iter().find(|row| row.id == id).cloned())
    }

    async fn list(&self, range: Option<DateRange>) -> Result<Vec<VisitLogEntry>, StoreError> {
        self.ensure_online()?;
        let mut items: Vec<VisitLogEntry> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|row| range.is_none_or(|range| range.contains(&row.time_in)))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.time_in.cmp(&a.time_in).then_with(|| b.id.cmp(&a.id)));
        Ok(items)
    }
}

#[async_trait::async_trait]
impl VisitLogAdmin for InMemoryVisitLogStore {
    async fn update_times(
        &self,
        id: Uuid,
        time_in: Option<NaiveDateTime>,
        time_out: Option<Option<NaiveDateTime>>,
    ) -> Result<VisitLogEntry, StoreError> {
        self.ensure_online()?;
        let mut rows = self.rows.write().await;
        let index = rows
            .iter()
            .position(|row| row.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let effective_in = time_in.unwrap_or(rows[index].time_in);
        let effective_out = time_out.unwrap_or(rows[index].time_out);
        if effective_out.is_some_and(|out| out < effective_in) {
            return Err(StoreError::InvalidInterval(id));
        }

        if time_out == Some(None) {
            let key = rows[index].open_key();
            if let Some(holder) = rows
                .iter()
                .find(|row| row.id != id && row.is_open() && row.open_key() == key)
            {
                return Err(conflict(holder));
            }
        }

        let row = &mut rows[index];
        if let Some(time_in) = time_in {
            row.time_in = time_in;
        }
        if let Some(time_out) = time_out {
            row.time_out = time_out;
        }
        Ok(row.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.ensure_online()?;
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| row.id != id);
        Ok(rows.len() < before)
    }

    async fn delete_all(&self, range: Option<DateRange>) -> Result<u64, StoreError> {
        self.ensure_online()?;
        let mut rows = self.rows.write().await;
        let before = rows.len();
        match range {
            Some(range) => rows.retain(|row| !range.contains(&row.time_in)),
            None => rows.clear(),
        }
        Ok((before - rows.len()) as u64)
    }
}
