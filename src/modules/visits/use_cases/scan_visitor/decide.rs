// Pure decision functions for a scan.
//
// Responsibilities
// - Map (preflight flag, open entry lookup result) to a Decision.
// - Decide whether a very recent duplicate should be closed instead of opening a new row.
// - Never perform input or output.

use crate::modules::visits::core::visit_log::VisitLogEntry;
use crate::modules::visits::use_cases::scan_visitor::decision::{Decision, ScanAction};

pub fn decide_scan(only_check: bool, existing: Option<&VisitLogEntry>) -> Decision {
    match (only_check, existing) {
        (true, Some(entry)) => Decision::Planned {
            action: ScanAction::TimeOut,
            entry_id: Some(entry.id),
        },
        (true, None) => Decision::Planned {
            action: ScanAction::TimeInPending,
            entry_id: None,
        },
        (false, Some(entry)) if entry.is_open() => Decision::Close { entry_id: entry.id },
        (false, Some(entry)) => Decision::AlreadyClosed { entry_id: entry.id },
        (false, None) => Decision::Open,
    }
}

/// A row for the same visit created inside the duplicate window that is
/// still open is the time-out target; anything else means a fresh time-in.
pub fn decide_recent(recent: Option<&VisitLogEntry>) -> Decision {
    match recent {
        Some(entry) if entry.is_open() => Decision::Close { entry_id: entry.id },
        _ => Decision::Open,
    }
}
