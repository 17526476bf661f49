use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::modules::visits::core::ports::StoreError;

pub const IDENTITY_REQUIRED: &str = "visitor_id (or visitor_name and pdl_name) is required";
pub const PDL_NOT_FOUND: &str = "PDL not found for this visitor";

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanAction {
    TimeIn,
    TimeOut,
    TimeInPending,
    AlreadyTimedOut,
}

impl ScanAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanAction::TimeIn => "time_in",
            ScanAction::TimeOut => "time_out",
            ScanAction::TimeInPending => "time_in_pending",
            ScanAction::AlreadyTimedOut => "already_timed_out",
        }
    }
}

/// What to do with the open entry found (or not) for a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Preflight only, nothing is written.
    Planned {
        action: ScanAction,
        entry_id: Option<Uuid>,
    },
    Close {
        entry_id: Uuid,
    },
    AlreadyClosed {
        entry_id: Uuid,
    },
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub action: ScanAction,
    pub preflight: bool,
    pub entry_id: Option<Uuid>,
    pub visitor_name: String,
    pub pdl_name: String,
    pub cell: String,
    pub purpose: Option<String>,
    pub verified_conjugal: bool,
    pub time_in: Option<NaiveDateTime>,
    pub time_out: Option<NaiveDateTime>,
}

impl ScanOutcome {
    pub fn message(&self) -> &'static str {
        match (self.action, self.preflight) {
            (ScanAction::TimeIn, _) => "Visitor timed in successfully",
            (ScanAction::TimeOut, false) => "Visitor timed out successfully",
            (ScanAction::TimeOut, true) => "Visitor has an open visit and will be timed out",
            (ScanAction::TimeInPending, _) => "Visitor will be timed in",
            (ScanAction::AlreadyTimedOut, _) => "Visitor has already timed out",
        }
    }
}
