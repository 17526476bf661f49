use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanVisitor {
    pub visitor_id: Option<String>,
    pub visitor_name: Option<String>,
    pub pdl_name: Option<String>,
    pub cell: Option<String>,
    pub device_time: Option<String>,
    pub purpose: Option<String>,
    pub only_check: bool,
    pub received_at: DateTime<Utc>,
}

/// Who the scan claims to be, after blank fields are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanIdentity {
    VisitorId {
        visitor_id: String,
        visitor_name: Option<String>,
        pdl_name: Option<String>,
    },
    Legacy {
        visitor_name: String,
        pdl_name: String,
        cell: Option<String>,
    },
}

impl ScanIdentity {
    pub fn is_legacy(&self) -> bool {
        matches!(self, ScanIdentity::Legacy { .. })
    }
}

impl ScanVisitor {
    pub fn identity(&self) -> Option<ScanIdentity> {
        let visitor_name = non_blank(&self.visitor_name);
        let pdl_name = non_blank(&self.pdl_name);

        if let Some(visitor_id) = non_blank(&self.visitor_id) {
            return Some(ScanIdentity::VisitorId {
                visitor_id,
                visitor_name,
                pdl_name,
            });
        }

        match (visitor_name, pdl_name) {
            (Some(visitor_name), Some(pdl_name)) => Some(ScanIdentity::Legacy {
                visitor_name,
                pdl_name,
                cell: non_blank(&self.cell),
            }),
            _ => None,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
