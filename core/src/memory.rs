//! In-process executor over a fixed set of documents.
//!
//! Interprets the typed stages with the same semantics the store applies to
//! their rendered form: analyzed fuzzy/phrase matching with score ordering,
//! `$dateFromParts` carry rules, null-lowest comparisons and stable sorts.
//! Backs fixture-driven serving and the crate's tests.
//!
//! `_id` tie-breaks compare the string form, so numeric ids order as text
//! ("10" before "9") where the store would order them by value.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::path::Path;

use crate::analysis::{analyze, contains_phrase, within_one_edit};
use crate::dates::{bound_date, full_date, sentinel_date, Bound};
use crate::document::{Facet, StoredDocument};
use crate::error::StoreError;
use crate::executor::QueryExecutor;
use crate::fixtures::load_documents;
use crate::request::MatchKind;
use crate::stage::{
    DerivedField, Direction, MatchClause, Pipeline, PipelineStage, RequiredField, SearchClause, SortField, SortKey,
    TextOperator,
};
use crate::title::normalize_title;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Vec<StoredDocument>,
}

/// A document flowing through the pipeline, with the fields stages add.
struct Row<'a> {
    doc: &'a StoredDocument,
    score: u32,
    normalized_date: Option<NaiveDate>,
    sort_date: Option<NaiveDate>,
    normalized_title: Option<String>,
}

enum Output<'a> {
    Rows(Vec<Row<'a>>),
    Count(u64),
}

impl MemoryStore {
    pub fn new(documents: Vec<StoredDocument>) -> Self {
        Self { documents }
    }

    /// Loads a JSON or JSONL fixture file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        Ok(Self::new(load_documents(path)?))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn evaluate(&self, pipeline: &Pipeline) -> Output<'_> {
        let mut rows: Vec<Row<'_>> = self.documents.iter().map(Row::new).collect();
        for stage in pipeline.stages() {
            match stage {
                PipelineStage::Search(clause) => {
                    rows = rows
                        .into_iter()
                        .filter_map(|mut row| {
                            row.score = score_clause(clause, row.doc)?;
                            Some(row)
                        })
                        .collect();
                    rows.sort_by(|a, b| b.score.cmp(&a.score));
                }
                PipelineStage::Match(clause) => rows.retain(|row| matches_clause(clause, row.doc)),
                PipelineStage::AddFields(field) => rows.iter_mut().for_each(|row| row.derive(*field)),
                PipelineStage::Sort(keys) => rows.sort_by(|a, b| compare_rows(a, b, keys)),
                PipelineStage::Skip(n) => {
                    let n = usize::try_from(*n).unwrap_or(usize::MAX).min(rows.len());
                    rows.drain(..n);
                }
                PipelineStage::Limit(n) => rows.truncate(usize::try_from(*n).unwrap_or(usize::MAX)),
                PipelineStage::Count => return Output::Count(rows.len() as u64),
            }
        }
        Output::Rows(rows)
    }
}

#[async_trait]
impl QueryExecutor for MemoryStore {
    async fn execute(&self, pipeline: &Pipeline) -> Result<Vec<StoredDocument>, StoreError> {
        match self.evaluate(pipeline) {
            Output::Rows(rows) => Ok(rows.into_iter().map(|row| row.doc.clone()).collect()),
            Output::Count(_) => Err(StoreError::Decode("count output is not a document stream".into())),
        }
    }

    async fn count(&self, pipeline: &Pipeline) -> Result<u64, StoreError> {
        match self.evaluate(pipeline) {
            Output::Count(total) => Ok(total),
            Output::Rows(_) => Err(StoreError::Execution("pipeline has no count stage".into())),
        }
    }

    async fn distinct(&self, facet: Facet) -> Result<Vec<String>, StoreError> {
        let mut values: Vec<String> = Vec::new();
        for value in self.documents.iter().filter_map(|doc| doc.facet(facet)) {
            if !values.iter().any(|seen| seen == value) {
                values.push(value.to_string());
            }
        }
        Ok(values)
    }
}

impl<'a> Row<'a> {
    fn new(doc: &'a StoredDocument) -> Self {
        Self { doc, score: 0, normalized_date: None, sort_date: None, normalized_title: None }
    }

    fn derive(&mut self, field: DerivedField) {
        let doc = self.doc;
        match field {
            DerivedField::NormalizedDate => self.normalized_date = full_date(doc.year, doc.month, doc.day),
            DerivedField::SortDate { sentinel_year } => {
                self.sort_date = self.normalized_date.or_else(|| sentinel_date(sentinel_year));
            }
            DerivedField::NormalizedTitle => self.normalized_title = doc.title.as_deref().map(normalize_title),
        }
    }
}

fn compare_rows(a: &Row<'_>, b: &Row<'_>, keys: &[SortKey]) -> Ordering {
    for key in keys {
        // None orders first, as null does in the store.
        let ordering = match key.field {
            SortField::SortDate => a.sort_date.cmp(&b.sort_date),
            SortField::NormalizedTitle => a.normalized_title.cmp(&b.normalized_title),
            SortField::Id => a.doc.id.cmp(&b.doc.id),
        };
        let ordering = match key.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn matches_clause(clause: &MatchClause, doc: &StoredDocument) -> bool {
    match clause {
        MatchClause::DateRange { start, end } => {
            // A missing year yields a null date: below every start, within every end.
            let after_start = start.map_or(true, |start| {
                bound_date(doc.year, doc.month, doc.day, Bound::Start).is_some_and(|date| date >= start)
            });
            let before_end = end.map_or(true, |end| {
                bound_date(doc.year, doc.month, doc.day, Bound::End).map_or(true, |date| date <= end)
            });
            after_start && before_end
        }
        MatchClause::Equals { facet, value } => doc.facet(*facet) == Some(value.as_str()),
        MatchClause::NotNull(RequiredField::Year) => doc.year.is_some(),
        MatchClause::NotNull(RequiredField::Publisher) => doc.publisher.is_some(),
    }
}

/// Score of a document under a search clause, `None` when it does not match.
fn score_clause(clause: &SearchClause, doc: &StoredDocument) -> Option<u32> {
    match clause {
        SearchClause::Single(operator) => Some(score_operator(operator, doc)).filter(|score| *score > 0),
        SearchClause::Compound { must, should, must_not } => {
            if must_not.iter().any(|operator| score_operator(operator, doc) > 0) {
                return None;
            }
            let mut score = 0;
            for operator in must {
                match score_operator(operator, doc) {
                    0 => return None,
                    s => score += s,
                }
            }
            let should_score: u32 = should.iter().map(|operator| score_operator(operator, doc)).sum();
            if must.is_empty() && !should.is_empty() && should_score == 0 {
                return None;
            }
            Some(score + should_score)
        }
    }
}

/// Number of (field value, query token) hits; zero means no match.
fn score_operator(operator: &TextOperator, doc: &StoredDocument) -> u32 {
    let query = analyze(&operator.term.text);
    if query.is_empty() {
        return 0;
    }
    let mut score = 0;
    for path in &operator.paths {
        for value in field_values(doc, path) {
            let tokens = analyze(value);
            score += match operator.term.kind {
                MatchKind::Phrase => u32::from(contains_phrase(&tokens, &query)),
                MatchKind::Fuzzy => query
                    .iter()
                    .filter(|q| tokens.iter().any(|token| within_one_edit(q, token)))
                    .count() as u32,
            };
        }
    }
    score
}

fn field_values<'a>(doc: &'a StoredDocument, path: &str) -> Vec<&'a str> {
    let single = |value: &'a Option<String>| value.as_deref().into_iter().collect::<Vec<_>>();
    let many = |values: &'a Option<Vec<String>>| values.iter().flatten().map(String::as_str).collect::<Vec<_>>();
    match path {
        "title" => single(&doc.title),
        "source" => single(&doc.source),
        "type" => single(&doc.doc_type),
        "publisher" => single(&doc.publisher),
        "city" => single(&doc.city),
        "book" => single(&doc.book),
        "folder_names" => many(&doc.folder_names),
        "authors" => many(&doc.authors),
        "editor" => many(&doc.editor),
        "translator" => many(&doc.translator),
        "illustrator" => many(&doc.illustrator),
        "coordinator" => many(&doc.coordinator),
        "director" => many(&doc.director),
        _ => Vec::new(),
    }
}
