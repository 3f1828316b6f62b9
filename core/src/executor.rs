use async_trait::async_trait;
use std::collections::HashMap;

use crate::document::{Facet, ResultPage, StoredDocument};
use crate::error::{SearchError, StoreError};
use crate::pipeline::compile;
use crate::project::project;
use crate::request::SearchRequest;
use crate::stage::Pipeline;

/// Runs compiled pipelines against a document store.
///
/// Implementations only read. Timeouts and cancellation are theirs to
/// enforce; whatever they report comes back as a single [`StoreError`].
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Runs a result pipeline and decodes the returned records.
    async fn execute(&self, pipeline: &Pipeline) -> Result<Vec<StoredDocument>, StoreError>;

    /// Runs a pipeline ending in a count stage. No rows means zero.
    async fn count(&self, pipeline: &Pipeline) -> Result<u64, StoreError>;

    /// Distinct non-null values of a facet field.
    async fn distinct(&self, facet: Facet) -> Result<Vec<String>, StoreError>;
}

/// Parses raw query parameters and runs the search.
pub async fn search(executor: &dyn QueryExecutor, params: &HashMap<String, String>) -> Result<ResultPage, SearchError> {
    let request = SearchRequest::from_params(params)?;
    run(executor, &request).await
}

/// Compiles `request`, runs the count and result pipelines concurrently and
/// projects the page. Either pipeline failing fails the whole search.
pub async fn run(executor: &dyn QueryExecutor, request: &SearchRequest) -> Result<ResultPage, SearchError> {
    let compiled = compile(request);
    let (total_documents, documents) =
        futures::try_join!(executor.count(&compiled.count), executor.execute(&compiled.results))?;

    tracing::debug!(total_documents, returned = documents.len(), page = request.page, "search completed");
    Ok(ResultPage {
        total_documents,
        total_pages: request.total_pages(total_documents),
        current_page: request.page,
        results: documents.into_iter().map(project).collect(),
    })
}

pub async fn distinct_values(executor: &dyn QueryExecutor, facet: Facet) -> Result<Vec<String>, SearchError> {
    Ok(executor.distinct(facet).await?)
}
