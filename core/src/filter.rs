use crate::request::SearchRequest;
use crate::stage::{MatchClause, PipelineStage, RequiredField};

/// Compiles exact-match and date-range constraints into `$match` stages.
///
/// Order: date range, one equality per supplied facet, then the null
/// exclusions. Undated records are dropped whenever a date bound is set, and
/// records without a publisher whenever the publisher filter is set; the other
/// facets get no such exclusion.
pub fn build_filter_stages(request: &SearchRequest) -> Vec<PipelineStage> {
    let mut stages = Vec::new();

    if request.has_date_filter() {
        stages.push(PipelineStage::Match(MatchClause::DateRange {
            start: request.start_date,
            end: request.end_date,
        }));
    }

    for (facet, value) in request.exact_filters() {
        stages.push(PipelineStage::Match(MatchClause::Equals { facet, value: value.to_string() }));
    }

    if request.has_date_filter() {
        stages.push(PipelineStage::Match(MatchClause::NotNull(RequiredField::Year)));
    }
    if request.publisher.is_some() {
        stages.push(PipelineStage::Match(MatchClause::NotNull(RequiredField::Publisher)));
    }

    stages
}
