//! Typed aggregation stages.
//!
//! Builders produce [`PipelineStage`] values; nothing downstream inspects raw
//! JSON. [`Pipeline::to_documents`] renders the stages into the aggregation
//! documents the store understands, and the in-memory executor interprets
//! the typed form directly.

use chrono::{Datelike, NaiveDate};
use serde_json::{json, Map, Value};

use crate::dates::Bound;
use crate::document::Facet;
use crate::request::{MatchKind, SearchTerm};
use crate::title::{ACCENT_FOLDS, FIRST_LETTER_PATTERN};

/// Name of the full-text index queried by the search stage.
pub const SEARCH_INDEX: &str = "default";
pub const FUZZY_MAX_EDITS: u32 = 1;

pub const NORMALIZED_DATE_FIELD: &str = "normalized_date";
pub const SORT_DATE_FIELD: &str = "sort_date";
pub const NORMALIZED_TITLE_FIELD: &str = "normalized_title";
pub const COUNT_FIELD: &str = "total_documents";

/// One full-text operator: a term searched over an ordered list of paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOperator {
    pub term: SearchTerm,
    pub paths: Vec<String>,
}

impl TextOperator {
    pub fn new(term: SearchTerm, paths: &[String]) -> Self {
        Self { term, paths: paths.to_vec() }
    }

    fn operator_name(&self) -> &'static str {
        match self.term.kind {
            MatchKind::Phrase => "phrase",
            MatchKind::Fuzzy => "text",
        }
    }

    fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".into(), json!(self.term.text));
        body.insert("path".into(), json!(self.paths));
        if self.term.kind == MatchKind::Fuzzy {
            body.insert("fuzzy".into(), json!({ "maxEdits": FUZZY_MAX_EDITS }));
        }
        Value::Object(body)
    }

    pub fn to_document(&self) -> Value {
        single(self.operator_name(), self.body())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchClause {
    Single(TextOperator),
    Compound {
        must: Vec<TextOperator>,
        should: Vec<TextOperator>,
        must_not: Vec<TextOperator>,
    },
}

impl SearchClause {
    fn to_document(&self) -> Value {
        let mut search = Map::new();
        search.insert("index".into(), json!(SEARCH_INDEX));
        match self {
            SearchClause::Single(operator) => {
                search.insert(operator.operator_name().into(), operator.body());
            }
            SearchClause::Compound { must, should, must_not } => {
                let mut compound = Map::new();
                for (key, operators) in [("must", must), ("should", should), ("mustNot", must_not)] {
                    if !operators.is_empty() {
                        let rendered = operators.iter().map(TextOperator::to_document).collect();
                        compound.insert(key.into(), Value::Array(rendered));
                    }
                }
                search.insert("compound".into(), Value::Object(compound));
            }
        }
        single("$search", Value::Object(search))
    }
}

/// Fields that get a null-exclusion match when their filter is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Year,
    Publisher,
}

impl RequiredField {
    pub fn name(self) -> &'static str {
        match self {
            RequiredField::Year => "year",
            RequiredField::Publisher => "publisher",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchClause {
    /// Partial stored dates widened per bound, compared inclusively.
    DateRange {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    Equals {
        facet: Facet,
        value: String,
    },
    NotNull(RequiredField),
}

impl MatchClause {
    fn to_document(&self) -> Value {
        let filter = match self {
            MatchClause::DateRange { start, end } => {
                let mut conditions = Vec::new();
                if let Some(start) = start {
                    conditions.push(json!({
                        "$expr": { "$gte": [stored_date(Bound::Start), literal_date(*start)] }
                    }));
                }
                if let Some(end) = end {
                    conditions.push(json!({
                        "$expr": { "$lte": [stored_date(Bound::End), literal_date(*end)] }
                    }));
                }
                json!({ "$and": conditions })
            }
            MatchClause::Equals { facet, value } => single(facet.field(), json!(value)),
            MatchClause::NotNull(field) => single(field.name(), json!({ "$ne": null })),
        };
        single("$match", filter)
    }
}

fn stored_date(bound: Bound) -> Value {
    let (month, day) = bound.default_month_day();
    json!({
        "$dateFromParts": {
            "year": "$year",
            "month": { "$ifNull": ["$month", month] },
            "day": { "$ifNull": ["$day", day] }
        }
    })
}

fn literal_date(date: NaiveDate) -> Value {
    json!({
        "$dateFromParts": { "year": date.year(), "month": date.month(), "day": date.day() }
    })
}

/// Fields computed by `$addFields` stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedField {
    /// Full date when year, month and day are all present, null otherwise.
    NormalizedDate,
    /// Normalized date, or 31 December of the sentinel year.
    SortDate { sentinel_year: i32 },
    /// Accent-folded title starting at its first letter.
    NormalizedTitle,
}

impl DerivedField {
    pub fn name(self) -> &'static str {
        match self {
            DerivedField::NormalizedDate => NORMALIZED_DATE_FIELD,
            DerivedField::SortDate { .. } => SORT_DATE_FIELD,
            DerivedField::NormalizedTitle => NORMALIZED_TITLE_FIELD,
        }
    }

    fn expression(self) -> Value {
        match self {
            DerivedField::NormalizedDate => {
                let present = |field: &str| json!({ "$ne": [{ "$ifNull": [field, null] }, null] });
                json!({
                    "$cond": {
                        "if": { "$and": [present("$year"), present("$month"), present("$day")] },
                        "then": {
                            "$dateFromParts": { "year": "$year", "month": "$month", "day": "$day" }
                        },
                        "else": null
                    }
                })
            }
            DerivedField::SortDate { sentinel_year } => json!({
                "$ifNull": [
                    format!("${NORMALIZED_DATE_FIELD}"),
                    { "$dateFromParts": { "year": sentinel_year, "month": 12, "day": 31 } }
                ]
            }),
            DerivedField::NormalizedTitle => {
                let folded = ACCENT_FOLDS.iter().fold(json!("$title"), |input, (find, replacement)| {
                    json!({ "$replaceAll": { "input": input, "find": find, "replacement": replacement } })
                });
                json!({
                    "$let": {
                        "vars": { "folded": folded },
                        "in": {
                            "$cond": {
                                "if": {
                                    "$regexMatch": { "input": "$$folded", "regex": FIRST_LETTER_PATTERN, "options": "s" }
                                },
                                "then": {
                                    "$getField": {
                                        "field": "match",
                                        "input": {
                                            "$regexFind": { "input": "$$folded", "regex": FIRST_LETTER_PATTERN, "options": "s" }
                                        }
                                    }
                                },
                                "else": "$$folded"
                            }
                        }
                    }
                })
            }
        }
    }

    fn to_document(self) -> Value {
        single("$addFields", single(self.name(), self.expression()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    SortDate,
    NormalizedTitle,
    Id,
}

impl SortField {
    pub fn name(self) -> &'static str {
        match self {
            SortField::SortDate => SORT_DATE_FIELD,
            SortField::NormalizedTitle => NORMALIZED_TITLE_FIELD,
            SortField::Id => "_id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub direction: Direction,
}

impl SortKey {
    pub fn ascending(field: SortField) -> Self {
        Self { field, direction: Direction::Ascending }
    }

    pub fn descending(field: SortField) -> Self {
        Self { field, direction: Direction::Descending }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStage {
    Search(SearchClause),
    Match(MatchClause),
    AddFields(DerivedField),
    Sort(Vec<SortKey>),
    Skip(u64),
    Limit(u64),
    Count,
}

impl PipelineStage {
    pub fn to_document(&self) -> Value {
        match self {
            PipelineStage::Search(clause) => clause.to_document(),
            PipelineStage::Match(clause) => clause.to_document(),
            PipelineStage::AddFields(field) => field.to_document(),
            PipelineStage::Sort(keys) => {
                // Key order is the sort precedence.
                let mut spec = Map::new();
                for key in keys {
                    let direction = match key.direction {
                        Direction::Ascending => 1,
                        Direction::Descending => -1,
                    };
                    spec.insert(key.field.name().into(), json!(direction));
                }
                single("$sort", Value::Object(spec))
            }
            PipelineStage::Skip(n) => json!({ "$skip": signed(*n) }),
            PipelineStage::Limit(n) => json!({ "$limit": signed(*n) }),
            PipelineStage::Count => json!({ "$count": COUNT_FIELD }),
        }
    }
}

/// Ordered stage sequence. Only the compiler appends to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<PipelineStage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, stage: PipelineStage) {
        self.stages.push(stage);
    }

    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn to_documents(&self) -> Vec<Value> {
        self.stages.iter().map(PipelineStage::to_document).collect()
    }
}

impl FromIterator<PipelineStage> for Pipeline {
    fn from_iter<I: IntoIterator<Item = PipelineStage>>(iter: I) -> Self {
        Self { stages: iter.into_iter().collect() }
    }
}

// The store has no unsigned integers.
fn signed(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn single(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}
