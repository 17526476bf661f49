use uuid::Uuid;

use crate::modules::visits::core::visit_log::DateRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteScannedVisitors {
    One(Uuid),
    /// Every row whose `time_in` falls in the range, or the whole log.
    All(Option<DateRange>),
}
