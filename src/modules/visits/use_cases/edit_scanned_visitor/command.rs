use chrono::NaiveDateTime;
use uuid::Uuid;

/// Overwrites the timestamps of one visit log row. `time_out: Some(None)`
/// reopens the visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditScannedVisitor {
    pub id: Uuid,
    pub time_in: Option<NaiveDateTime>,
    pub time_out: Option<Option<NaiveDateTime>>,
}

impl EditScannedVisitor {
    pub fn is_empty(&self) -> bool {
        self.time_in.is_none() && self.time_out.is_none()
    }
}
