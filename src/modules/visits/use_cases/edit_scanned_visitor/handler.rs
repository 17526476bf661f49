use thiserror::Error;
use tracing::info;

use crate::modules::visits::core::ports::{StoreError, VisitLogAdmin};
use crate::modules::visits::core::visit_log::VisitLogEntry;
use crate::modules::visits::use_cases::edit_scanned_visitor::command::EditScannedVisitor;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("nothing to update: supply time_in and/or time_out")]
    NothingToUpdate,

    #[error("time_out must not be before time_in")]
    InvalidInterval,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for EditError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::InvalidInterval(_) => Self::InvalidInterval,
            other => Self::Store(other),
        }
    }
}

/// The interval check runs inside `update_times`, against the row as it is
/// at write time.
pub async fn edit_scanned_visitor(
    admin: &dyn VisitLogAdmin,
    command: EditScannedVisitor,
) -> Result<VisitLogEntry, EditError> {
    if command.is_empty() {
        return Err(EditError::NothingToUpdate);
    }

    let updated = admin
        .update_times(command.id, command.time_in, command.time_out)
        .await?;
    info!(entry_id = %updated.id, reopened = updated.is_open(), "visit log entry edited");
    Ok(updated)
}

#[cfg(test)]
mod edit_scanned_visitor_tests {
    use super::*;
    use crate::modules::visits::adapters::outbound::visit_log_store_in_memory::InMemoryVisitLogStore;
    use crate::modules::visits::core::ports::{VisitLogQueries, VisitLogStore};
    use crate::shared::core::primitives::parse_local;
    use crate::tests::fixtures::NewVisitLogEntryBuilder;
    use rstest::rstest;
    use uuid::Uuid;

    async fn store_with_closed_visit() -> (InMemoryVisitLogStore, Uuid) {
        let store = InMemoryVisitLogStore::new();
        let entry = store.add(NewVisitLogEntryBuilder::new().build()).await.unwrap();
        store
            .update_time_out(entry.id, parse_local("2025-03-01 11:00:00").unwrap())
            .await
            .unwrap();
        (store, entry.id)
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_overwrite_time_in() {
        let (store, id) = store_with_closed_visit().await;
        let command = EditScannedVisitor {
            id,
            time_in: parse_local("2025-03-01 09:30:00"),
            time_out: None,
        };
        let updated = edit_scanned_visitor(&store, command).await.unwrap();
        assert_eq!(updated.time_in, parse_local("2025-03-01 09:30:00").unwrap());
        assert_eq!(updated.time_out, parse_local("2025-03-01 11:00:00"));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reopen_a_visit() {
        let (store, id) = store_with_closed_visit().await;
        let command = EditScannedVisitor {
            id,
            time_in: None,
            time_out: Some(None),
        };
        let updated = edit_scanned_visitor(&store, command).await.unwrap();
        assert!(updated.is_open());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_refuse_a_time_out_before_time_in() {
        let (store, id) = store_with_closed_visit().await;
        let command = EditScannedVisitor {
            id,
            time_in: None,
            time_out: Some(parse_local("2025-03-01 08:00:00")),
        };
        let result = edit_scanned_visitor(&store, command).await;
        assert!(matches!(result, Err(EditError::InvalidInterval)));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_check_the_interval_against_a_concurrently_closed_visit() {
        let store = InMemoryVisitLogStore::new();
        let entry = store.add(NewVisitLogEntryBuilder::new().build()).await.unwrap();
        // The visit was open when the admin loaded it; a scan closes it before the edit lands.
        store
            .update_time_out(entry.id, parse_local("2025-03-01 10:30:00").unwrap())
            .await
            .unwrap();

        let command = EditScannedVisitor {
            id: entry.id,
            time_in: parse_local("2025-03-01 11:00:00"),
            time_out: None,
        };
        let result = edit_scanned_visitor(&store, command).await;
        assert!(matches!(result, Err(EditError::InvalidInterval)));

        let stored = store.get(entry.id).await.unwrap().unwrap();
        assert!(stored.time_out.unwrap() >= stored.time_in);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_refuse_an_empty_edit_and_an_unknown_id() {
        let (store, id) = store_with_closed_visit().await;
        let empty = EditScannedVisitor {
            id,
            time_in: None,
            time_out: None,
        };
        assert!(matches!(
            edit_scanned_visitor(&store, empty).await,
            Err(EditError::NothingToUpdate)
        ));

        let unknown = EditScannedVisitor {
            id: Uuid::now_v7(),
            time_in: parse_local("2025-03-01 09:00:00"),
            time_out: None,
        };
        assert!(matches!(
            edit_scanned_visitor(&store, unknown).await,
            Err(EditError::Store(StoreError::NotFound(_)))
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_refuse_to_reopen_over_another_open_visit() {
        let (store, id) = store_with_closed_visit().await;
        store
            .add(NewVisitLogEntryBuilder::new().time_in("2025-03-01 12:00:00").build())
            .await
            .unwrap();
        let command = EditScannedVisitor {
            id,
            time_in: None,
            time_out: Some(None),
        };
        assert!(matches!(
            edit_scanned_visitor(&store, command).await,
            Err(EditError::Store(StoreError::OpenEntryExists { .. }))
        ));
    }
}
