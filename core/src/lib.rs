//! Query compiler and result projector for the bibliographic search API.
//!
//! A request's loose query parameters are parsed into a [`SearchRequest`],
//! compiled into a pair of aggregation [`Pipeline`]s (one counting, one
//! paginated) and run through a [`QueryExecutor`]. Raw [`StoredDocument`]s
//! coming back are reshaped into [`ProjectedDocument`]s.

pub mod analysis;
pub mod dates;
pub mod document;
pub mod error;
pub mod executor;
pub mod filter;
pub mod fixtures;
pub mod memory;
pub mod pipeline;
pub mod project;
pub mod request;
pub mod search;
pub mod sort;
pub mod stage;
pub mod title;

pub use document::{DocumentId, Facet, Pages, PersonName, ProjectedDocument, ResultPage, StoredDocument};
pub use error::{SearchError, StoreError};
pub use executor::{distinct_values, run, search, QueryExecutor};
pub use memory::MemoryStore;
pub use pipeline::{compile, CompiledQuery};
pub use request::{BooleanMode, MatchKind, SearchRequest, SearchTerm, SortMode};
pub use stage::{Pipeline, PipelineStage};
