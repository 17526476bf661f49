// Shared test fixtures: the seeded directory, command builders and a wired resolver.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::modules::visits::adapters::outbound::directory_in_memory::InMemoryDirectory;
use crate::modules::visits::adapters::outbound::visit_log_store_in_memory::InMemoryVisitLogStore;
use crate::modules::visits::core::visit_log::NewVisitLogEntry;
use crate::modules::visits::use_cases::scan_visitor::command::ScanVisitor;
use crate::modules::visits::use_cases::scan_visitor::handler::{ResolverSettings, VisitLogResolver};
use crate::shared::core::primitives::parse_local;
use crate::shell::state::AppState;

const DIRECTORY_SEED: &str = include_str!("json/directory_seed.json");

/// 2025-03-01 10:00:00 in Manila.
pub fn base_received_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 2, 0, 0).unwrap()
}

pub fn seeded_directory() -> InMemoryDirectory {
    InMemoryDirectory::from_seed_json(DIRECTORY_SEED).unwrap()
}

pub fn make_resolver(
    directory: Arc<InMemoryDirectory>,
    store: Arc<InMemoryVisitLogStore>,
) -> VisitLogResolver {
    VisitLogResolver::new(
        directory.clone(),
        directory.clone(),
        directory,
        store,
        ResolverSettings::default(),
    )
}

pub fn make_test_state() -> (AppState, Arc<InMemoryVisitLogStore>) {
    let store = Arc::new(InMemoryVisitLogStore::new());
    let state = AppState::in_memory(
        Arc::new(seeded_directory()),
        store.clone(),
        ResolverSettings::default(),
    );
    (state, store)
}

pub fn make_offline_test_state() -> AppState {
    let mut store = InMemoryVisitLogStore::new();
    store.toggle_offline();
    AppState::in_memory(
        Arc::new(seeded_directory()),
        Arc::new(store),
        ResolverSettings::default(),
    )
}

pub struct ScanVisitorBuilder {
    inner: ScanVisitor,
}

impl Default for ScanVisitorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl ScanVisitorBuilder {
    pub fn new() -> Self {
        Self {
            inner: ScanVisitor {
                visitor_id: None,
                visitor_name: None,
                pdl_name: None,
                cell: None,
                device_time: None,
                purpose: None,
                only_check: false,
                received_at: base_received_at(),
            },
        }
    }

    pub fn legacy(visitor_name: impl Into<String>, pdl_name: impl Into<String>) -> Self {
        Self::new().visitor_name(visitor_name).pdl_name(pdl_name)
    }

    pub fn visitor_id(mut self, v: impl Into<String>) -> Self {
        self.inner.visitor_id = Some(v.into());
        self
    }

    pub fn visitor_name(mut self, v: impl Into<String>) -> Self {
        self.inner.visitor_name = Some(v.into());
        self
    }

    pub fn pdl_name(mut self, v: impl Into<String>) -> Self {
        self.inner.pdl_name = Some(v.into());
        self
    }

    pub fn cell(mut self, v: impl Into<String>) -> Self {
        self.inner.cell = Some(v.into());
        self
    }

    pub fn device_time(mut self, v: impl Into<String>) -> Self {
        self.inner.device_time = Some(v.into());
        self
    }

    pub fn purpose(mut self, v: impl Into<String>) -> Self {
        self.inner.purpose = Some(v.into());
        self
    }

    pub fn only_check(mut self, v: bool) -> Self {
        self.inner.only_check = v;
        self
    }

    pub fn received_after(mut self, seconds: u32) -> Self {
        self.inner.received_at = base_received_at() + Duration::seconds(i64::from(seconds));
        self
    }

    pub fn build(self) -> ScanVisitor {
        self.inner
    }
}

pub struct NewVisitLogEntryBuilder {
    inner: NewVisitLogEntry,
}

impl Default for NewVisitLogEntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl NewVisitLogEntryBuilder {
    pub fn new() -> Self {
        Self {
            inner: NewVisitLogEntry {
                visitor_id: Some(123),
                visitor_code: Some("VIS-25-000123".to_string()),
                visitor_name: "Juan Dela Cruz".to_string(),
                pdl_name: "Dela Cruz, Juan".to_string(),
                cell: "Cell - 1".to_string(),
                time_in: parse_local("2025-03-01 10:00:00").unwrap(),
                relationship: "Brother".to_string(),
                contact_number: "09171234567".to_string(),
                purpose: "normal".to_string(),
            },
        }
    }

    pub fn visitor_name(mut self, v: impl Into<String>) -> Self {
        self.inner.visitor_name = v.into();
        self
    }

    pub fn time_in(mut self, v: &str) -> Self {
        self.inner.time_in = parse_local(v).unwrap();
        self
    }

    pub fn purpose(mut self, v: impl Into<String>) -> Self {
        self.inner.purpose = v.into();
        self
    }

    pub fn build(self) -> NewVisitLogEntry {
        self.inner
    }
}

#[cfg(test)]
mod fixture_builder_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn the_seed_should_contain_the_reference_visitor() {
        let seed: serde_json::Value = serde_json::from_str(DIRECTORY_SEED).unwrap();
        assert_eq!(seed["visitors"][0]["visitor_code"], "VIS-25-000123");
    }

    #[rstest]
    fn setters_override_the_scan_defaults() {
        let command = ScanVisitorBuilder::legacy("A", "B")
            .cell("1")
            .device_time("2025-03-01T10:00:00")
            .purpose("conjugal")
            .only_check(true)
            .received_after(5)
            .build();
        assert_eq!(command.visitor_name.as_deref(), Some("A"));
        assert_eq!(command.pdl_name.as_deref(), Some("B"));
        assert_eq!(command.cell.as_deref(), Some("1"));
        assert_eq!(command.purpose.as_deref(), Some("conjugal"));
        assert!(command.only_check);
        assert_eq!(command.received_at, base_received_at() + Duration::seconds(5));
    }
}
