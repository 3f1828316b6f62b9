use chrono::NaiveDate;
use std::collections::HashMap;

use crate::dates::{parse_bound, Bound};
use crate::document::Facet;
use crate::error::SearchError;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;
/// Largest page, page size or skip the store accepts (a signed 64-bit integer).
pub const MAX_PAGING_VALUE: u64 = i64::MAX as u64;

/// Fields searched when the caller does not name any.
pub const DEFAULT_FIELDS: [&str; 12] = [
    "title",
    "source",
    "authors",
    "editor",
    "folder_names",
    "publisher",
    "translator",
    "illustrator",
    "coordinator",
    "director",
    "city",
    "book",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Exact contiguous phrase, no edit tolerance.
    Phrase,
    /// Analyzed text match tolerating one edit per term.
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    pub text: String,
    pub kind: MatchKind,
}

impl SearchTerm {
    /// Reads a raw query term. A term wrapped in double quotes is a phrase
    /// (quotes stripped); anything else is fuzzy. Blank terms are absent.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }
        if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
            let text = raw.trim_matches('"');
            if text.trim().is_empty() {
                return None;
            }
            return Some(Self { text: text.to_string(), kind: MatchKind::Phrase });
        }
        Some(Self { text: raw.to_string(), kind: MatchKind::Fuzzy })
    }
}

/// How the optional term combines with the primary one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BooleanMode {
    #[default]
    None,
    And,
    Or,
    MustNot,
}

impl BooleanMode {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "and" => BooleanMode::And,
            "or" => BooleanMode::Or,
            "mustnot" => BooleanMode::MustNot,
            _ => BooleanMode::None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    #[default]
    Relevance,
    Date,
    DateAsc,
    Title,
    TitleDesc,
}

impl SortMode {
    /// Unknown modes fall back to relevance.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "date" => SortMode::Date,
            "date-asc" => SortMode::DateAsc,
            "title" => SortMode::Title,
            "title-desc" => SortMode::TitleDesc,
            _ => SortMode::Relevance,
        }
    }
}

/// A fully parsed search request. Built once per HTTP request and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub primary_term: Option<SearchTerm>,
    pub optional_term: Option<SearchTerm>,
    pub boolean_mode: BooleanMode,
    pub primary_fields: Vec<String>,
    pub secondary_fields: Vec<String>,
    pub source: Option<String>,
    pub doc_type: Option<String>,
    pub publisher: Option<String>,
    pub city: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort_mode: SortMode,
    pub page: u64,
    pub page_size: u64,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            primary_term: None,
            optional_term: None,
            boolean_mode: BooleanMode::None,
            primary_fields: default_fields(),
            secondary_fields: default_fields(),
            source: None,
            doc_type: None,
            publisher: None,
            city: None,
            start_date: None,
            end_date: None,
            sort_mode: SortMode::Relevance,
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchRequest {
    /// Builds a request from raw query parameters.
    ///
    /// Empty values count as unset. `page` and `limit` (alias `pageSize`)
    /// silently fall back to their defaults when they do not parse; only a
    /// malformed date bound is an error.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, SearchError> {
        let get = |key: &str| params.get(key).map(String::as_str).filter(|value| !value.is_empty());
        let owned = |key: &str| get(key).map(str::to_string);

        Ok(Self {
            primary_term: get("query").and_then(SearchTerm::parse),
            optional_term: get("optionalQuery").and_then(SearchTerm::parse),
            boolean_mode: get("searchTypeValue").map(BooleanMode::parse).unwrap_or_default(),
            primary_fields: parse_fields(get("fields")),
            secondary_fields: parse_fields(get("fields2")),
            source: owned("source"),
            doc_type: owned("type"),
            publisher: owned("publisher"),
            city: owned("city"),
            start_date: get("startDate").map(|raw| parse_bound(raw, Bound::Start)).transpose()?,
            end_date: get("endDate").map(|raw| parse_bound(raw, Bound::End)).transpose()?,
            sort_mode: get("sortBy").map(SortMode::parse).unwrap_or_default(),
            page: parse_positive(get("page"), DEFAULT_PAGE),
            page_size: parse_positive(get("limit").or_else(|| get("pageSize")), DEFAULT_PAGE_SIZE),
        })
    }

    /// Supplied exact-match filters, in facet order.
    pub fn exact_filters(&self) -> impl Iterator<Item = (Facet, &str)> + '_ {
        Facet::ALL.into_iter().filter_map(move |facet| {
            let value = match facet {
                Facet::Source => self.source.as_deref(),
                Facet::Type => self.doc_type.as_deref(),
                Facet::Publisher => self.publisher.as_deref(),
                Facet::City => self.city.as_deref(),
            };
            value.map(|value| (facet, value))
        })
    }

    pub fn has_date_filter(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size).min(MAX_PAGING_VALUE)
    }

    pub fn total_pages(&self, total_documents: u64) -> u64 {
        total_documents.div_ceil(self.page_size.max(1))
    }
}

fn default_fields() -> Vec<String> {
    DEFAULT_FIELDS.iter().map(|field| field.to_string()).collect()
}

// Comma-separated, order kept, duplicates dropped.
fn parse_fields(raw: Option<&str>) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for field in raw.unwrap_or_default().split(',').map(str::trim).filter(|f| !f.is_empty()) {
        if !fields.iter().any(|known| known == field) {
            fields.push(field.to_string());
        }
    }
    if fields.is_empty() {
        default_fields()
    } else {
        fields
    }
}

fn parse_positive(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| (1..=MAX_PAGING_VALUE).contains(value))
        .unwrap_or(default)
}
