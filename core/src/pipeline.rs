use crate::filter::build_filter_stages;
use crate::request::SearchRequest;
use crate::search::build_search_stage;
use crate::sort::build_sort_stages;
use crate::stage::{DerivedField, Pipeline, PipelineStage};

/// The two pipelines issued for one search.
///
/// `count` and `results` share every stage up to and including the
/// `normalized_date` projection, so the total always describes the set that
/// pagination walks over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub count: Pipeline,
    pub results: Pipeline,
}

pub fn compile(request: &SearchRequest) -> CompiledQuery {
    let mut shared = Pipeline::new();
    if let Some(stage) = build_search_stage(request) {
        shared.push(stage);
    }
    for stage in build_filter_stages(request) {
        shared.push(stage);
    }
    shared.push(PipelineStage::AddFields(DerivedField::NormalizedDate));

    let mut count = shared.clone();
    count.push(PipelineStage::Count);

    let mut results = shared;
    for stage in build_sort_stages(request.sort_mode) {
        results.push(stage);
    }
    results.push(PipelineStage::Skip(request.skip()));
    results.push(PipelineStage::Limit(request.page_size));

    tracing::debug!(
        sort = ?request.sort_mode,
        page = request.page,
        page_size = request.page_size,
        count_stages = count.len(),
        result_stages = results.len(),
        "compiled search pipelines"
    );
    CompiledQuery { count, results }
}
