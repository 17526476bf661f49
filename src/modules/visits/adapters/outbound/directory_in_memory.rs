// In memory visitor, PDL and cell directories.
//
// Purpose
// - Run the service and its tests without a database.
//
// Responsibilities
// - Hold the three read-only record sets, optionally loaded from a JSON seed file.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tokio::sync::RwLock;

use crate::modules::visits::core::ports::{CellDirectory, PdlDirectory, StoreError, VisitorDirectory};
use crate::modules::visits::core::visitor::{CellRecord, PdlRecord, VisitorRecord};

#[derive(Debug, Default, Deserialize)]
pub struct DirectorySeed {
    #[serde(default)]
    pub visitors: Vec<VisitorRecord>,
    #[serde(default)]
    pub pdls: Vec<PdlRecord>,
    #[serde(default)]
    pub cells: Vec<CellRecord>,
}

#[derive(Default)]
pub struct InMemoryDirectory {
    visitors: RwLock<Vec<VisitorRecord>>,
    pdls: RwLock<HashMap<i64, PdlRecord>>,
    cells: RwLock<Vec<CellRecord>>,
    is_offline: bool,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: DirectorySeed) -> Self {
        Self {
            visitors: RwLock::new(seed.visitors),
            pdls: RwLock::new(seed.pdls.into_iter().map(|pdl| (pdl.id, pdl)).collect()),
            cells: RwLock::new(seed.cells),
            is_offline: false,
        }
    }

    pub fn from_seed_json(json: &str) -> anyhow::Result<Self> {
        let seed: DirectorySeed = serde_json::from_str(json)?;
        Ok(Self::from_seed(seed))
    }

    pub fn load_seed(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read seed file {}: {e}", path.display()))?;
        let directory = Self::from_seed_json(&json)?;
        tracing::info!(path = %path.display(), "loaded directory seed");
        Ok(directory)
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    pub async fn add_visitor(&self, visitor: VisitorRecord) {
        self.visitors.write().await.push(visitor);
    }

    pub async fn add_pdl(&self, pdl: PdlRecord) {
        self.pdls.write().await.insert(pdl.id, pdl);
    }

    pub async fn add_cell(&self, cell: CellRecord) {
        self.cells.write().await.push(cell);
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.is_offline {
            return Err(StoreError::Backend("Directory offline".into()));
        }
        Ok(())
    }

    async fn pdl_name_of(&self, pdl_id: i64) -> Option<String> {
        self.pdls.read().await.get(&pdl_id).map(PdlRecord::display_name)
    }
}

#[async_trait::async_trait]
impl VisitorDirectory for InMemoryDirectory {
    async fn get_by_visitor_code(&self, visitor_code: &str) -> Result<Option<VisitorRecord>, StoreError> {
        self.ensure_online()?;
        let visitors = self.visitors.read().await;
        Ok(visitors.iter().find(|v| v.visitor_code == visitor_code).cloned())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<VisitorRecord>, StoreError> {
        self.ensure_online()?;
        let visitors = self.visitors.read().await;
        Ok(visitors.iter().find(|v| v.id == id).cloned())
    }

    async fn find_by_exact_name(
        &self,
        name: &str,
        pdl_name: Option<&str>,
    ) -> Result<Option<VisitorRecord>, StoreError> {
        self.ensure_online()?;
        let candidates: Vec<VisitorRecord> = self
            .visitors
            .read()
            .await
            .iter()
            .filter(|v| v.name == name)
            .cloned()
            .collect();

        let Some(pdl_name) = pdl_name else {
            return Ok(candidates.into_iter().next());
        };
        for candidate in candidates {
            if self.pdl_name_of(candidate.pdl_id).await.as_deref() == Some(pdl_name) {
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

#[async_trait::async_trait]
impl PdlDirectory for InMemoryDirectory {
    async fn get_by_id(&self, id: i64) -> Result<Option<PdlRecord>, StoreError> {
        self.ensure_online()?;
        Ok(self.pdls.read().await.get(&id).cloned())
    }
}

#[async_trait::async_trait]
impl CellDirectory for InMemoryDirectory {
    async fn get_by_cell_number(&self, cell_number: &str) -> Result<Option<CellRecord>, StoreError> {
        self.ensure_online()?;
        let cells = self.cells.read().await;
        Ok(cells.iter().find(|c| c.matches(cell_number)).cloned())
    }
}

#[cfg(test)]
mod in_memory_directory_tests {
    use super::*;
    use crate::tests::fixtures::seeded_directory;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn it_should_find_a_visitor_by_code_and_by_id() {
        let directory = seeded_directory();
        let by_code = directory.get_by_visitor_code("VIS-25-000123").await.unwrap();
        let by_id = VisitorDirectory::get_by_id(&directory, 123).await.unwrap();
        assert_eq!(by_code, by_id);
        assert_eq!(by_code.unwrap().name, "Juan Dela Cruz");
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_scope_exact_name_lookups_by_pdl_name() {
        let directory = seeded_directory();
        let scoped = directory
            .find_by_exact_name("Juan Dela Cruz", Some("Dela Cruz, Juan"))
            .await
            .unwrap();
        assert_eq!(scoped.map(|v| v.id), Some(123));

        let wrong_pdl = directory
            .find_by_visitor_and_pdl_name("Juan Dela Cruz", "Reyes, Pedro Garcia")
            .await
            .unwrap();
        assert!(wrong_pdl.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_resolve_cells_by_number_or_label() {
        let directory = seeded_directory();
        let by_number = directory.get_by_cell_number("1").await.unwrap();
        let by_label = directory.get_by_cell_number("Cell - 1").await.unwrap();
        assert_eq!(by_number, by_label);
        assert!(directory.get_by_cell_number("7").await.unwrap().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_accept_records_added_after_construction() {
        let directory = InMemoryDirectory::new();
        directory
            .add_pdl(PdlRecord {
                id: 9,
                last_name: "Lim".into(),
                first_name: "Rosa".into(),
                middle_name: None,
                cell_number: "3".into(),
            })
            .await;
        directory
            .add_cell(CellRecord {
                id: 3,
                cell_number: "3".into(),
                label: "Cell - 3".into(),
            })
            .await;
        assert_eq!(
            PdlDirectory::get_by_id(&directory, 9).await.unwrap().map(|p| p.display_name()),
            Some("Lim, Rosa".to_string())
        );
        assert!(directory.get_by_cell_number("3").await.unwrap().is_some());

        directory
            .add_visitor(VisitorRecord {
                id: 300,
                visitor_code: "VIS-25-000300".into(),
                pdl_id: 9,
                name: "Carlo Lim".into(),
                relationship: "Son".into(),
                contact_number: String::new(),
                verified_conjugal: false,
            })
            .await;
        let found = directory
            .find_by_visitor_and_pdl_name("Carlo Lim", "Lim, Rosa")
            .await
            .unwrap();
        assert_eq!(found.map(|v| v.id), Some(300));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_if_the_directory_is_offline() {
        let mut directory = seeded_directory();
        directory.toggle_offline();
        let result = directory.get_by_visitor_code("VIS-25-000123").await;
        assert!(matches!(result, Err(StoreError::Backend(message)) if message == "Directory offline"));
    }

    #[rstest]
    fn it_should_reject_a_malformed_seed() {
        assert!(InMemoryDirectory::from_seed_json("{\"visitors\": 3}").is_err());
    }
}
