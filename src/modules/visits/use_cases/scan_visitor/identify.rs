// Visitor identification for a scan.
//
// The strategies are tried in a fixed order and the first hit wins. The
// order itself is a pure function of the scan identity.

use crate::modules::visits::core::ports::{StoreError, VisitorDirectory};
use crate::modules::visits::core::visitor::VisitorRecord;
use crate::modules::visits::use_cases::scan_visitor::command::ScanIdentity;
use crate::modules::visits::use_cases::scan_visitor::decision::ResolveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifyStrategy {
    VisitorCode,
    /// Old QR codes carry the numeric primary key.
    NumericId,
    ExactName,
    VisitorAndPdlName,
}

impl IdentifyStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            IdentifyStrategy::VisitorCode => "visitor_code",
            IdentifyStrategy::NumericId => "numeric id",
            IdentifyStrategy::ExactName => "visitor_name",
            IdentifyStrategy::VisitorAndPdlName => "visitor_name and pdl_name",
        }
    }
}

pub fn strategies_for(identity: &ScanIdentity) -> Vec<IdentifyStrategy> {
    match identity {
        ScanIdentity::VisitorId {
            visitor_id,
            visitor_name,
            ..
        } => {
            let mut strategies = vec![IdentifyStrategy::VisitorCode];
            if is_numeric(visitor_id) {
                strategies.push(IdentifyStrategy::NumericId);
            }
            if visitor_name.is_some() {
                strategies.push(IdentifyStrategy::ExactName);
            }
            strategies
        }
        ScanIdentity::Legacy { .. } => vec![IdentifyStrategy::VisitorAndPdlName],
    }
}

pub async fn identify_visitor(
    identity: &ScanIdentity,
    directory: &dyn VisitorDirectory,
) -> Result<VisitorRecord, ResolveError> {
    let strategies = strategies_for(identity);
    for strategy in &strategies {
        if let Some(visitor) = try_strategy(*strategy, identity, directory).await? {
            tracing::debug!(strategy = strategy.label(), visitor_id = visitor.id, "visitor identified");
            return Ok(visitor);
        }
    }
    Err(ResolveError::NotFound(not_found_message(identity, &strategies)))
}

async fn try_strategy(
    strategy: IdentifyStrategy,
    identity: &ScanIdentity,
    directory: &dyn VisitorDirectory,
) -> Result<Option<VisitorRecord>, StoreError> {
    match (strategy, identity) {
        (IdentifyStrategy::VisitorCode, ScanIdentity::VisitorId { visitor_id, .. }) => {
            directory.get_by_visitor_code(visitor_id).await
        }
        (IdentifyStrategy::NumericId, ScanIdentity::VisitorId { visitor_id, .. }) => {
            match visitor_id.parse::<i64>() {
                Ok(id) => directory.get_by_id(id).await,
                Err(_) => Ok(None),
            }
        }
        (
            IdentifyStrategy::ExactName,
            ScanIdentity::VisitorId {
                visitor_name: Some(visitor_name),
                pdl_name,
                ..
            },
        ) => {
            directory
                .find_by_exact_name(visitor_name, pdl_name.as_deref())
                .await
        }
        (
            IdentifyStrategy::VisitorAndPdlName,
            ScanIdentity::Legacy {
                visitor_name,
                pdl_name,
                ..
            },
        ) => {
            directory
                .find_by_visitor_and_pdl_name(visitor_name, pdl_name)
                .await
        }
        _ => Ok(None),
    }
}

fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn not_found_message(identity: &ScanIdentity, strategies: &[IdentifyStrategy]) -> String {
    let tried = strategies
        .iter()
        .map(IdentifyStrategy::label)
        .collect::<Vec<_>>()
        .join(", ");
    match identity {
        ScanIdentity::VisitorId {
            visitor_id,
            visitor_name: Some(visitor_name),
            ..
        } => format!("Visitor not found: {visitor_id} / {visitor_name} (tried {tried})"),
        ScanIdentity::VisitorId { visitor_id, .. } => {
            format!("Visitor not found: {visitor_id} (tried {tried})")
        }
        ScanIdentity::Legacy {
            visitor_name,
            pdl_name,
            ..
        } => format!("Visitor not found: {visitor_name} visiting {pdl_name} (tried {tried})"),
    }
}

#[cfg(test)]
mod identify_visitor_tests {
    use super::*;
    use crate::tests::fixtures::seeded_directory;
    use rstest::rstest;

    fn by_id(visitor_id: &str, visitor_name: Option<&str>) -> ScanIdentity {
        ScanIdentity::VisitorId {
            visitor_id: visitor_id.into(),
            visitor_name: visitor_name.map(Into::into),
            pdl_name: None,
        }
    }

    #[rstest]
    #[case(by_id("VIS-25-000123", None), vec![IdentifyStrategy::VisitorCode])]
    #[case(by_id("123", None), vec![IdentifyStrategy::VisitorCode, IdentifyStrategy::NumericId])]
    #[case(
        by_id("123", Some("Juan Dela Cruz")),
        vec![IdentifyStrategy::VisitorCode, IdentifyStrategy::NumericId, IdentifyStrategy::ExactName]
    )]
    #[case(
        ScanIdentity::Legacy {
            visitor_name: "Juan Dela Cruz".into(),
            pdl_name: "Dela Cruz, Juan".into(),
            cell: None,
        },
        vec![IdentifyStrategy::VisitorAndPdlName]
    )]
    fn it_should_order_the_strategies(
        #[case] identity: ScanIdentity,
        #[case] expected: Vec<IdentifyStrategy>,
    ) {
        assert_eq!(strategies_for(&identity), expected);
    }

    #[rstest]
    #[case(by_id("VIS-25-000123", None))]
    #[case(by_id("123", None))]
    #[case(by_id("QR-LOST", Some("Juan Dela Cruz")))]
    #[case(ScanIdentity::Legacy {
        visitor_name: "Juan Dela Cruz".into(),
        pdl_name: "Dela Cruz, Juan".into(),
        cell: Some("1".into()),
    })]
    #[tokio::test]
    async fn it_should_identify_the_visitor_through_every_strategy(#[case] identity: ScanIdentity) {
        let directory = seeded_directory();
        let visitor = identify_visitor(&identity, &directory).await.unwrap();
        assert_eq!(visitor.id, 123);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_name_the_identifiers_tried_when_nothing_matches() {
        let directory = seeded_directory();
        let result = identify_visitor(&by_id("999", None), &directory).await;
        match result {
            Err(ResolveError::NotFound(message)) => {
                assert_eq!(message, "Visitor not found: 999 (tried visitor_code, numeric id)");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
