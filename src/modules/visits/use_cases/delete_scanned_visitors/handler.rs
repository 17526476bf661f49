use tracing::info;

use crate::modules::visits::core::ports::{StoreError, VisitLogAdmin};
use crate::modules::visits::use_cases::delete_scanned_visitors::command::DeleteScannedVisitors;

/// Returns the number of rows removed.
pub async fn delete_scanned_visitors(
    admin: &dyn VisitLogAdmin,
    command: DeleteScannedVisitors,
) -> Result<u64, StoreError> {
    match command {
        DeleteScannedVisitors::One(id) => {
            if !admin.delete(id).await? {
                return Err(StoreError::NotFound(id));
            }
            info!(entry_id = %id, "visit log entry deleted");
            Ok(1)
        }
        DeleteScannedVisitors::All(range) => {
            let deleted = admin.delete_all(range).await?;
            match range {
                Some(range) => {
                    info!(start = %range.start, end = %range.end, deleted, "visit log entries deleted")
                }
                None => info!(deleted, "visit log cleared"),
            }
            Ok(deleted)
        }
    }
}
