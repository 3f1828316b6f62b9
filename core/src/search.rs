use crate::request::{BooleanMode, SearchRequest};
use crate::stage::{PipelineStage, SearchClause, TextOperator};

/// Compiles the request's free-text terms into a `$search` stage.
///
/// The primary term is searched over `primary_fields` and the optional one
/// over `secondary_fields`. Without any term there is no search stage and the
/// pipeline only filters.
pub fn build_search_stage(request: &SearchRequest) -> Option<PipelineStage> {
    let primary = request
        .primary_term
        .clone()
        .map(|term| TextOperator::new(term, &request.primary_fields));
    let optional = request
        .optional_term
        .clone()
        .map(|term| TextOperator::new(term, &request.secondary_fields));

    let clause = match (primary, optional, request.boolean_mode) {
        (None, None, _) => return None,
        (Some(primary), Some(optional), BooleanMode::And) => SearchClause::Compound {
            must: vec![primary, optional],
            should: Vec::new(),
            must_not: Vec::new(),
        },
        (Some(primary), Some(optional), BooleanMode::Or) => SearchClause::Compound {
            must: Vec::new(),
            should: vec![primary, optional],
            must_not: Vec::new(),
        },
        (Some(primary), Some(optional), BooleanMode::MustNot) => SearchClause::Compound {
            must: vec![primary],
            should: Vec::new(),
            must_not: vec![optional],
        },
        // Without a relation the optional term is ignored.
        (Some(primary), _, _) => SearchClause::Single(primary),
        // Only an optional term: exclude it, or search it on its own.
        (None, Some(optional), BooleanMode::MustNot) => SearchClause::Compound {
            must: Vec::new(),
            should: Vec::new(),
            must_not: vec![optional],
        },
        (None, Some(optional), _) => SearchClause::Single(optional),
    };
    Some(PipelineStage::Search(clause))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{MatchKind, SearchTerm};

    fn request(primary: &str, optional: &str, mode: BooleanMode) -> SearchRequest {
        SearchRequest {
            primary_term: SearchTerm::parse(primary),
            optional_term: SearchTerm::parse(optional),
            boolean_mode: mode,
            secondary_fields: vec!["authors".to_string()],
            ..Default::default()
        }
    }

    fn clause(request: &SearchRequest) -> SearchClause {
        match build_search_stage(request) {
            Some(PipelineStage::Search(clause)) => clause,
            other => panic!("expected a search stage, got {other:?}"),
        }
    }

    #[test]
    fn no_terms_no_stage() {
        assert_eq!(build_search_stage(&request("", "", BooleanMode::And)), None);
    }

    #[test]
    fn single_term_uses_primary_fields() {
        match clause(&request("borges", "cortázar", BooleanMode::None)) {
            SearchClause::Single(operator) => {
                assert_eq!(operator.term.text, "borges");
                assert_eq!(operator.paths.len(), 12);
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn and_requires_both_terms() {
        match clause(&request("\"poesía\"", "antología", BooleanMode::And)) {
            SearchClause::Compound { must, should, must_not } => {
                assert_eq!(must.len(), 2);
                assert_eq!(must[0].term.kind, MatchKind::Phrase);
                assert_eq!(must[1].paths, vec!["authors"]);
                assert!(should.is_empty() && must_not.is_empty());
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn or_uses_should() {
        match clause(&request("poesía", "prosa", BooleanMode::Or)) {
            SearchClause::Compound { must, should, must_not } => {
                assert!(must.is_empty() && must_not.is_empty());
                assert_eq!(should.len(), 2);
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn mustnot_excludes_the_optional_term() {
        match clause(&request("poesía", "antología", BooleanMode::MustNot)) {
            SearchClause::Compound { must, should, must_not } => {
                assert_eq!(must[0].term.text, "poesía");
                assert_eq!(must_not[0].term.text, "antología");
                assert!(should.is_empty());
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn lone_optional_term_searches_its_own_fields() {
        match clause(&request("", "cortázar", BooleanMode::Or)) {
            SearchClause::Single(operator) => assert_eq!(operator.paths, vec!["authors"]),
            other => panic!("{other:?}"),
        }
    }
}
