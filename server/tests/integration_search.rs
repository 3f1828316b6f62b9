use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use biblio_core::{Facet, MemoryStore, Pipeline, QueryExecutor, StoreError, StoredDocument};
use http_body_util::BodyExt;
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use tower::ServiceExt;

fn catalogue() -> MemoryStore {
    let record = |id: &str, title: &str, source: &str, year: Option<i32>| StoredDocument {
        id: id.into(),
        title: Some(title.into()),
        source: Some(source.into()),
        year,
        ..Default::default()
    };
    MemoryStore::new(vec![
        record("1", "Historias del café", "Archivo", Some(1961)),
        record("2", "Historia del cafe", "Hemeroteca", None),
        record("3", "Poesía completa", "Archivo", Some(1975)),
    ])
}

struct FailingExecutor;

#[async_trait]
impl QueryExecutor for FailingExecutor {
    async fn execute(&self, _pipeline: &Pipeline) -> Result<Vec<StoredDocument>, StoreError> {
        Err(StoreError::Execution("connection reset".into()))
    }

    async fn count(&self, _pipeline: &Pipeline) -> Result<u64, StoreError> {
        Err(StoreError::Execution("connection reset".into()))
    }

    async fn distinct(&self, _facet: Facet) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Execution("connection reset".into()))
    }
}

async fn call(app: Router, uri: &str) -> (StatusCode, Bytes) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

async fn call_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = call(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn search_returns_the_page_envelope() {
    let app = biblio_server::build_app(Arc::new(catalogue()));

    let (status, json) = call_json(app, "/search?query=cafe&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_documents"], 2);
    assert_eq!(json["total_pages"], 2);
    assert_eq!(json["current_page"], 1);
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0]["authors"].is_null());
    assert!(results[0].as_object().unwrap().contains_key("city"));
}

#[tokio::test]
async fn quoted_queries_are_phrase_searches() {
    let app = biblio_server::build_app(Arc::new(catalogue()));
    let (status, json) = call_json(app, "/search?query=%22caf%C3%A9%22").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_documents"], 1);
    assert_eq!(json["results"][0]["_id"], "1");
    assert_eq!(json["results"][0]["date"], "1961");
}

#[tokio::test]
async fn garbage_paging_falls_back_to_defaults() {
    let app = biblio_server::build_app(Arc::new(catalogue()));
    let (status, json) = call_json(app, "/search?page=abc&pageSize=-3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["current_page"], 1);
    assert_eq!(json["total_pages"], 1);
    assert_eq!(json["results"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn malformed_dates_are_rejected() {
    let app = biblio_server::build_app(Arc::new(catalogue()));
    let (status, json) = call_json(app, "/search?startDate=1961-01-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Error during search");
    assert!(json["error"].as_str().unwrap().contains("startDate"));
}

#[tokio::test]
async fn date_filters_drop_undated_records() {
    let app = biblio_server::build_app(Arc::new(catalogue()));
    let (_, json) = call_json(app, "/search?endDate=31%2F12%2F1970").await;
    assert_eq!(json["total_documents"], 1);
    assert_eq!(json["results"][0]["_id"], "1");
}

#[tokio::test]
async fn facets_list_distinct_values() {
    let app = biblio_server::build_app(Arc::new(catalogue()));
    let (status, json) = call_json(app.clone(), "/get_sources").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!(["Archivo", "Hemeroteca"]));

    let (status, json) = call_json(app, "/get_city").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([]));
}

#[tokio::test]
async fn store_failures_become_server_errors() {
    let app = biblio_server::build_app(Arc::new(FailingExecutor));

    let (status, json) = call_json(app.clone(), "/search?query=borges").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "Error during search");
    assert!(json["error"].as_str().unwrap().contains("connection reset"));

    let (status, json) = call_json(app, "/get_publishers").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "Error retrieving publishers");
}

#[tokio::test]
async fn root_and_health_respond() {
    let app = biblio_server::build_app(Arc::new(catalogue()));
    let (status, body) = call(app.clone(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"API is running!");

    let (status, body) = call(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn serves_fixture_files() {
    let mut file = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
    writeln!(file, r#"{{"_id": {{"$oid": "65a1f0c2e4b0a1b2c3d4e5f6"}}, "title": "Rayuela", "publisher": "Sudamericana"}}"#).unwrap();
    writeln!(file, r#"{{"_id": 2, "title": "Bestiario", "editor": "Sudamericana"}}"#).unwrap();
    let store = MemoryStore::load(file.path()).unwrap();
    let app = biblio_server::build_app(Arc::new(store));

    let (status, json) = call_json(app, "/search?publisher=Sudamericana").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_documents"], 1);
    assert_eq!(json["results"][0]["_id"], "65a1f0c2e4b0a1b2c3d4e5f6");
}
