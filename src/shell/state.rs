use std::sync::Arc;

use sqlx::PgPool;

use crate::modules::visits::adapters::outbound::directory_in_memory::InMemoryDirectory;
use crate::modules::visits::adapters::outbound::directory_postgres::PgDirectory;
use crate::modules::visits::adapters::outbound::visit_log_store_in_memory::InMemoryVisitLogStore;
use crate::modules::visits::adapters::outbound::visit_log_store_postgres::PgVisitLogStore;
use crate::modules::visits::core::ports::{VisitLogAdmin, VisitLogQueries};
use crate::modules::visits::use_cases::scan_visitor::handler::{ResolverSettings, VisitLogResolver};

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<VisitLogResolver>,
    pub queries: Arc<dyn VisitLogQueries>,
    pub admin: Arc<dyn VisitLogAdmin>,
}

impl AppState {
    pub fn in_memory(
        directory: Arc<InMemoryDirectory>,
        store: Arc<InMemoryVisitLogStore>,
        settings: ResolverSettings,
    ) -> Self {
        let resolver = VisitLogResolver::new(
            directory.clone(),
            directory.clone(),
            directory,
            store.clone(),
            settings,
        );
        Self {
            resolver: Arc::new(resolver),
            queries: store.clone(),
            admin: store,
        }
    }

    pub fn postgres(pool: PgPool, settings: ResolverSettings) -> Self {
        let directory = Arc::new(PgDirectory::new(pool.clone()));
        let store = Arc::new(PgVisitLogStore::new(pool));
        let resolver = VisitLogResolver::new(
            directory.clone(),
            directory.clone(),
            directory,
            store.clone(),
            settings,
        );
        Self {
            resolver: Arc::new(resolver),
            queries: store.clone(),
            admin: store,
        }
    }
}
