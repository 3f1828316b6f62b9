//! MongoDB Atlas executor: runs rendered pipelines through `aggregate`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use biblio_core::stage::COUNT_FIELD;
use biblio_core::{Facet, Pipeline, QueryExecutor, StoreError, StoredDocument};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::{Client, Collection};

pub const DEFAULT_DATABASE: &str = "archivo_digital";
pub const DEFAULT_COLLECTION: &str = "bilbiografia_1.0";

#[derive(Clone)]
pub struct MongoExecutor {
    collection: Collection<Document>,
}

impl MongoExecutor {
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await.context("connecting to MongoDB")?;
        tracing::info!(database, collection, "using MongoDB collection");
        Ok(Self { collection: client.database(database).collection(collection) })
    }

    async fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<Document>, StoreError> {
        let stages = encode_pipeline(pipeline)?;
        let cursor = self.collection.aggregate(stages).await.map_err(execution)?;
        cursor.try_collect::<Vec<Document>>().await.map_err(execution)
    }
}

#[async_trait]
impl QueryExecutor for MongoExecutor {
    async fn execute(&self, pipeline: &Pipeline) -> Result<Vec<StoredDocument>, StoreError> {
        self.aggregate(pipeline).await?.into_iter().map(decode_document).collect()
    }

    async fn count(&self, pipeline: &Pipeline) -> Result<u64, StoreError> {
        match self.aggregate(pipeline).await?.first() {
            Some(row) => read_count(row),
            None => Ok(0),
        }
    }

    async fn distinct(&self, facet: Facet) -> Result<Vec<String>, StoreError> {
        let values = self.collection.distinct(facet.field(), doc! {}).await.map_err(execution)?;
        Ok(values
            .into_iter()
            .filter_map(|value| match value {
                Bson::String(text) => Some(text),
                _ => None,
            })
            .collect())
    }
}

fn execution(err: mongodb::error::Error) -> StoreError {
    StoreError::Execution(err.to_string())
}

fn encode_pipeline(pipeline: &Pipeline) -> Result<Vec<Document>, StoreError> {
    pipeline
        .to_documents()
        .iter()
        .map(|stage| bson::to_document(stage).map_err(|e| StoreError::Encode(e.to_string())))
        .collect()
}

fn read_count(row: &Document) -> Result<u64, StoreError> {
    let total = match row.get(COUNT_FIELD) {
        Some(Bson::Int32(n)) => i64::from(*n),
        Some(Bson::Int64(n)) => *n,
        other => return Err(StoreError::Decode(format!("{COUNT_FIELD} is {other:?}"))),
    };
    u64::try_from(total).map_err(|_| StoreError::Decode(format!("negative {COUNT_FIELD}: {total}")))
}

/// Decodes a stored record, handing the ObjectId `_id` over as its hex string.
fn decode_document(mut document: Document) -> Result<StoredDocument, StoreError> {
    if let Some(Bson::ObjectId(oid)) = document.get("_id") {
        let hex = oid.to_hex();
        document.insert("_id", hex);
    }
    bson::from_document(document).map_err(|e| StoreError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use biblio_core::{compile, SearchRequest};
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn object_ids_become_hex_strings() {
        let oid = ObjectId::parse_str("65a1f0c2e4b0a1b2c3d4e5f6").unwrap();
        let record = decode_document(doc! { "_id": oid, "title": "Ficciones", "year": 1944, "authors": "Borges" }).unwrap();
        assert_eq!(record.id.0, "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(record.year, Some(1944));
        assert_eq!(record.authors, Some(vec!["Borges".to_string()]));
    }

    #[test]
    fn loosely_typed_records_still_decode() {
        let record = decode_document(doc! {
            "_id": 12_i32,
            "year": 1950.0_f64,
            "pages": 240.0_f64,
            "authors": ["Silvina Ocampo", null],
        })
        .unwrap();
        assert_eq!(record.id.0, "12");
        assert_eq!(record.year, Some(1950));
        assert_eq!(record.pages, Some(biblio_core::Pages::Fractional(240.0)));
        assert_eq!(record.authors, Some(vec!["Silvina Ocampo".to_string()]));
    }

    #[test]
    fn deep_pages_encode_within_range() {
        let params: std::collections::HashMap<String, String> = [("page", "10000000000000000"), ("limit", "1000")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let request = SearchRequest::from_params(&params).unwrap();
        let stages = encode_pipeline(&compile(&request).results).unwrap();
        assert_eq!(stages[stages.len() - 2], doc! { "$skip": i64::MAX });
    }

    #[test]
    fn counts_accept_both_integer_widths() {
        assert_eq!(read_count(&doc! { "total_documents": 7_i32 }).unwrap(), 7);
        assert_eq!(read_count(&doc! { "total_documents": 7_i64 }).unwrap(), 7);
        assert!(read_count(&doc! { "total_documents": "7" }).is_err());
    }

    #[test]
    fn compiled_pipelines_encode_to_bson() {
        let request = SearchRequest {
            publisher: Some("Losada".into()),
            sort_mode: biblio_core::SortMode::Title,
            ..Default::default()
        };
        let stages = encode_pipeline(&compile(&request).results).unwrap();
        assert_eq!(stages[0], doc! { "$match": { "publisher": "Losada" } });
        assert_eq!(stages[1], doc! { "$match": { "publisher": { "$ne": null } } });
        assert!(stages.iter().any(|stage| stage.contains_key("$sort")));
    }
}
