use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorRecord {
    pub id: i64,
    pub visitor_code: String,
    pub pdl_id: i64,
    pub name: String,
    #[serde(default)]
    pub relationship: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub verified_conjugal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdlRecord {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub cell_number: String,
}

impl PdlRecord {
    /// `Last, First Middle`, without the middle name when it is blank.
    pub fn display_name(&self) -> String {
        let base = format!("{}, {}", self.last_name.trim(), self.first_name.trim());
        match self.middle_name.as_deref().map(str::trim) {
            Some(middle) if !middle.is_empty() => format!("{base} {middle}"),
            _ => base,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    pub id: i64,
    pub cell_number: String,
    pub label: String,
}

impl CellRecord {
    /// A raw cell string matches either the cell number or the label itself.
    pub fn matches(&self, raw: &str) -> bool {
        let raw = raw.trim();
        self.cell_number.trim() == raw || self.label.trim().eq_ignore_ascii_case(raw)
    }
}

#[cfg(test)]
mod visitor_record_tests {
    use super::*;
    use rstest::rstest;

    fn pdl(middle_name: Option<&str>) -> PdlRecord {
        PdlRecord {
            id: 1,
            last_name: "Dela Cruz".into(),
            first_name: "Juan".into(),
            middle_name: middle_name.map(Into::into),
            cell_number: "1".into(),
        }
    }

    #[rstest]
    #[case(None, "Dela Cruz, Juan")]
    #[case(Some(""), "Dela Cruz, Juan")]
    #[case(Some("  "), "Dela Cruz, Juan")]
    #[case(Some("Santos"), "Dela Cruz, Juan Santos")]
    fn it_should_format_the_pdl_display_name(
        #[case] middle_name: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(pdl(middle_name).display_name(), expected);
    }

    #[rstest]
    fn it_should_match_a_cell_by_number_or_label() {
        let cell = CellRecord {
            id: 1,
            cell_number: "1".into(),
            label: "Cell - 1".into(),
        };
        assert!(cell.matches(" 1 "));
        assert!(cell.matches("cell - 1"));
        assert!(!cell.matches("11"));
    }
}
