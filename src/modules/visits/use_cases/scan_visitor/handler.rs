use std::sync::Arc;

use chrono::{Duration, FixedOffset, NaiveDateTime, Offset, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::modules::visits::core::ports::{
    CellDirectory, PdlDirectory, StoreError, VisitLogStore, VisitorDirectory, VisitorLink,
};
use crate::modules::visits::core::visit_log::{NewVisitLogEntry, VisitLogEntry, normalize_purpose};
use crate::modules::visits::core::visitor::VisitorRecord;
use crate::modules::visits::use_cases::scan_visitor::command::{ScanIdentity, ScanVisitor};
use crate::modules::visits::use_cases::scan_visitor::decide::{decide_recent, decide_scan};
use crate::modules::visits::use_cases::scan_visitor::decision::{
    Decision, IDENTITY_REQUIRED, PDL_NOT_FOUND, ResolveError, ScanAction, ScanOutcome,
};
use crate::modules::visits::use_cases::scan_visitor::identify::identify_visitor;
use crate::shared::core::primitives::resolve_device_time;

#[derive(Debug, Clone, Copy)]
pub struct ResolverSettings {
    pub utc_offset: FixedOffset,
    pub duplicate_scan_window: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            utc_offset: FixedOffset::east_opt(8 * 3600).unwrap_or_else(|| Utc.fix()),
            duplicate_scan_window: Duration::seconds(5),
        }
    }
}

/// Everything a scan resolves to before the log is touched.
struct ScanTarget {
    visitor: VisitorRecord,
    pdl_name: String,
    cell: String,
    /// Cell strings to try for legacy open-entry lookups, canonical first.
    legacy_cells: Vec<String>,
    legacy_names: Option<(String, String)>,
}

pub struct VisitLogResolver {
    visitors: Arc<dyn VisitorDirectory>,
    pdls: Arc<dyn PdlDirectory>,
    cells: Arc<dyn CellDirectory>,
    store: Arc<dyn VisitLogStore>,
    settings: ResolverSettings,
}

impl VisitLogResolver {
    pub fn new(
        visitors: Arc<dyn VisitorDirectory>,
        pdls: Arc<dyn PdlDirectory>,
        cells: Arc<dyn CellDirectory>,
        store: Arc<dyn VisitLogStore>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            visitors,
            pdls,
            cells,
            store,
            settings,
        }
    }

    pub async fn handle(&self, command: ScanVisitor) -> Result<ScanOutcome, ResolveError> {
        let identity = command
            .identity()
            .ok_or_else(|| ResolveError::InvalidInput(IDENTITY_REQUIRED.into()))?;
        let target = self.resolve_target(&identity).await?;
        let purpose = normalize_purpose(command.purpose.as_deref());
        let timestamp = resolve_device_time(
            command.device_time.as_deref(),
            command.received_at,
            self.settings.utc_offset,
        );

        let existing = self.find_open_entry(&target).await?;
        match decide_scan(command.only_check, existing.as_ref()) {
            Decision::Planned { action, entry_id } => {
                debug!(action = action.as_str(), "scan preflight");
                Ok(planned_outcome(&target, action, entry_id, existing.as_ref(), purpose))
            }
            Decision::Close { entry_id } => self.close_visit(&target, entry_id, timestamp).await,
            Decision::AlreadyClosed { entry_id } => {
                Ok(already_closed_outcome(&target, entry_id, existing.as_ref()))
            }
            Decision::Open => self.open_visit(&target, purpose, timestamp).await,
        }
    }

    async fn resolve_target(&self, identity: &ScanIdentity) -> Result<ScanTarget, ResolveError> {
        let visitor = identify_visitor(identity, &*self.visitors).await?;
        let pdl = self
            .pdls
            .get_by_id(visitor.pdl_id)
            .await?
            .ok_or_else(|| ResolveError::NotFound(PDL_NOT_FOUND.into()))?;
        let cell = self.canonical_cell(&pdl.cell_number).await?;

        let (legacy_cells, legacy_names) = match identity {
            ScanIdentity::Legacy {
                visitor_name,
                pdl_name,
                cell: raw_cell,
            } => {
                let mut candidates = Vec::new();
                match raw_cell {
                    Some(raw) => {
                        candidates.push(self.canonical_cell(raw).await?);
                        candidates.push(raw.clone());
                        candidates.push(cell.clone());
                    }
                    None => {
                        candidates.push(cell.clone());
                        candidates.push(pdl.cell_number.trim().to_string());
                    }
                }
                let mut seen = Vec::new();
                candidates.retain(|c| {
                    let key = c.trim().to_lowercase();
                    if seen.contains(&key) {
                        return false;
                    }
                    seen.push(key);
                    true
                });
                (candidates, Some((visitor_name.clone(), pdl_name.clone())))
            }
            ScanIdentity::VisitorId { .. } => (Vec::new(), None),
        };

        Ok(ScanTarget {
            pdl_name: pdl.display_name(),
            cell,
            visitor,
            legacy_cells,
            legacy_names,
        })
    }

    async fn canonical_cell(&self, raw: &str) -> Result<String, StoreError> {
        Ok(match self.cells.get_by_cell_number(raw).await? {
            Some(cell) => cell.label,
            None => raw.trim().to_string(),
        })
    }

    /// First hit wins: rows linked by visitor code, rows linked by visitor
    /// id, then any open row with the visitor's name. Legacy scans match on
    /// the (visitor, pdl, cell) triple instead.
    async fn find_open_entry(&self, target: &ScanTarget) -> Result<Option<VisitLogEntry>, StoreError> {
        if let Some((visitor_name, pdl_name)) = &target.legacy_names {
            for cell in &target.legacy_cells {
                let found = self
                    .store
                    .find_open_scan_by_visitor_details(visitor_name, pdl_name, cell)
                    .await?;
                if found.is_some() {
                    return Ok(found);
                }
            }
            return Ok(None);
        }

        let visitor = &target.visitor;
        if let Some(found) = self
            .store
            .find_open_scan_by_visitor(VisitorLink::Code(&visitor.visitor_code))
            .await?
        {
            return Ok(Some(found));
        }
        if let Some(found) = self
            .store
            .find_open_scan_by_visitor(VisitorLink::Id(visitor.id))
            .await?
        {
            debug!(visitor_id = visitor.id, "open entry matched by visitor id");
            return Ok(Some(found));
        }
        let found = self.store.find_open_scan_by_visitor_name(&visitor.name).await?;
        if found.is_some() {
            debug!(visitor_id = visitor.id, "open entry matched by visitor name");
        }
        Ok(found)
    }

    async fn close_visit(
        &self,
        target: &ScanTarget,
        entry_id: Uuid,
        timestamp: NaiveDateTime,
    ) -> Result<ScanOutcome, ResolveError> {
        match self.store.update_time_out(entry_id, timestamp).await? {
            Some(entry) => {
                info!(entry_id = %entry.id, visitor = %entry.visitor_name, "visitor timed out");
                Ok(entry_outcome(target, ScanAction::TimeOut, &entry))
            }
            None => {
                info!(%entry_id, "visit was closed by a concurrent scan");
                Ok(already_closed_outcome(target, entry_id, None))
            }
        }
    }

    async fn open_visit(
        &self,
        target: &ScanTarget,
        purpose: String,
        timestamp: NaiveDateTime,
    ) -> Result<ScanOutcome, ResolveError> {
        if let Some(entry) = self.find_open_entry(target).await? {
            debug!(entry_id = %entry.id, "open entry appeared before insert");
            return self.close_visit(target, entry.id, timestamp).await;
        }

        let (visitor_name, pdl_name, cell) = self.log_names(target);
        let since = timestamp
            .checked_sub_signed(self.settings.duplicate_scan_window)
            .unwrap_or(timestamp);
        let recent = self
            .store
            .find_recent_scan_by_visitor_details(visitor_name, pdl_name, cell, since)
            .await?;
        if let Decision::Close { entry_id } = decide_recent(recent.as_ref()) {
            debug!(%entry_id, "recent duplicate scan, closing instead of opening");
            return self.close_visit(target, entry_id, timestamp).await;
        }

        let new_entry = NewVisitLogEntry {
            visitor_id: Some(target.visitor.id),
            visitor_code: Some(target.visitor.visitor_code.clone()),
            visitor_name: target.visitor.name.clone(),
            pdl_name: target.pdl_name.clone(),
            cell: target.cell.clone(),
            time_in: timestamp,
            relationship: target.visitor.relationship.clone(),
            contact_number: target.visitor.contact_number.clone(),
            purpose,
        };

        match self.store.add(new_entry).await {
            Ok(entry) => {
                info!(entry_id = %entry.id, visitor = %entry.visitor_name, "visitor timed in");
                Ok(entry_outcome(target, ScanAction::TimeIn, &entry))
            }
            Err(StoreError::OpenEntryExists {
                visitor_name,
                pdl_name,
                cell,
            }) => {
                warn!(%visitor_name, "concurrent time-in detected, closing the winning entry");
                let winner = self
                    .store
                    .find_open_scan_by_visitor_details(&visitor_name, &pdl_name, &cell)
                    .await?;
                match winner {
                    Some(winner) => self.close_visit(target, winner.id, timestamp).await,
                    None => Err(StoreError::OpenEntryExists {
                        visitor_name,
                        pdl_name,
                        cell,
                    }
                    .into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Names used to match rows of this visit: what a legacy client sent, or
    /// the directory's display strings.
    fn log_names<'a>(&self, target: &'a ScanTarget) -> (&'a str, &'a str, &'a str) {
        match &target.legacy_names {
            Some((visitor_name, pdl_name)) => (visitor_name, pdl_name, &target.cell),
            None => (&target.visitor.name, &target.pdl_name, &target.cell),
        }
    }
}

fn planned_outcome(
    target: &ScanTarget,
    action: ScanAction,
    entry_id: Option<Uuid>,
    existing: Option<&VisitLogEntry>,
    requested_purpose: String,
) -> ScanOutcome {
    ScanOutcome {
        action,
        preflight: true,
        entry_id,
        visitor_name: target.visitor.name.clone(),
        pdl_name: target.pdl_name.clone(),
        cell: target.cell.clone(),
        purpose: Some(existing.map_or(requested_purpose, |entry| entry.purpose.clone())),
        verified_conjugal: target.visitor.verified_conjugal,
        time_in: existing.map(|entry| entry.time_in),
        time_out: None,
    }
}

fn already_closed_outcome(
    target: &ScanTarget,
    entry_id: Uuid,
    existing: Option<&VisitLogEntry>,
) -> ScanOutcome {
    ScanOutcome {
        action: ScanAction::AlreadyTimedOut,
        preflight: false,
        entry_id: Some(entry_id),
        visitor_name: target.visitor.name.clone(),
        pdl_name: target.pdl_name.clone(),
        cell: target.cell.clone(),
        purpose: existing.map(|entry| entry.purpose.clone()),
        verified_conjugal: target.visitor.verified_conjugal,
        time_in: existing.map(|entry| entry.time_in),
        time_out: existing.and_then(|entry| entry.time_out),
    }
}

fn entry_outcome(target: &ScanTarget, action: ScanAction, entry: &VisitLogEntry) -> ScanOutcome {
    ScanOutcome {
        action,
        preflight: false,
        entry_id: Some(entry.id),
        visitor_name: entry.visitor_name.clone(),
        pdl_name: entry.pdl_name.clone(),
        cell: entry.cell.clone(),
        purpose: Some(entry.purpose.clone()),
        verified_conjugal: target.visitor.verified_conjugal,
        time_in: Some(entry.time_in),
        time_out: entry.time_out,
    }
}
