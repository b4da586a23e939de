//! Tests HTTP du routeur avec un entrepôt en mémoire

use std::sync::{Arc, Mutex};

use aquagis_api::query::{QueryKind, SpatialQuery};
use aquagis_api::routes::{build_router, VERSION_DATE};
use aquagis_api::{AppState, AssetStore, AssetSummary, DmaSettings, StoreError};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Entrepôt en mémoire : lignes fixes par requête, échec optionnel
#[derive(Default)]
struct MemoryStore {
    points: Vec<AssetSummary>,
    lines: Vec<AssetSummary>,
    fail_on: Option<QueryKind>,
    calls: Mutex<Vec<QueryKind>>,
}

#[async_trait]
impl AssetStore for MemoryStore {
    async fn fetch_summaries(&self, query: &SpatialQuery) -> Result<Vec<AssetSummary>, StoreError> {
        self.calls.lock().unwrap().push(query.kind);
        if self.fail_on == Some(query.kind) {
            return Err(StoreError::Unavailable(format!("{} exploded", query.kind)));
        }
        Ok(match query.kind {
            QueryKind::PointsWithin => self.points.clone(),
            QueryKind::LinesIntersecting | QueryKind::LinesWithin => self.lines.clone(),
        })
    }
}

fn app(store: Arc<MemoryStore>) -> axum::Router {
    build_router(AppState::new(store, DmaSettings::default()))
}

async fn json_body(resp: Response<Body>) -> (StatusCode, Value) {
    let status = resp.status();
    let bytes = resp
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    let json: Value = serde_json::from_slice(&bytes).expect("valid JSON response");
    (status, json)
}

async fn post_dma(store: Arc<MemoryStore>, body: impl Into<Body>) -> (StatusCode, Value) {
    let resp = app(store)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/get_dma_resources")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();
    json_body(resp).await
}

async fn get(store: Arc<MemoryStore>, uri: &str) -> (StatusCode, Value) {
    let resp = app(store)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    json_body(resp).await
}

fn unit_square() -> Value {
    json!({
        "geom_type": "Polygon",
        "coordinates": [[[0, 0], [0, 1], [1, 1], [1, 0], [0, 0]]],
        "crs": 4326
    })
}

fn assert_exec_time(envelope: &Value) {
    let exec_time = envelope["exec_time_ms"].as_str().expect("exec_time_ms is a string");
    let (_, decimals) = exec_time.split_once('.').expect("decimal separator");
    assert_eq!(decimals.len(), 3, "exec_time_ms={exec_time}");
    assert!(exec_time.parse::<f64>().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_zero_assets() {
    let store = Arc::new(MemoryStore::default());
    let (status, body) = post_dma(store.clone(), unit_square().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"], unit_square());
    assert_eq!(
        body["response"],
        json!({
            "aquagis_points": [],
            "aquagis_line_intersection": [],
            "aquagis_line_within": []
        })
    );
    assert!(body.get("errors").is_none());
    assert_exec_time(&body);
    assert_eq!(store.calls.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_assets_summarised() {
    let store = Arc::new(MemoryStore {
        points: vec![AssetSummary {
            aquagis_type: Some("valve".into()),
            objects_count: 4,
            length: None,
        }],
        lines: vec![AssetSummary {
            aquagis_type: Some("pipe".into()),
            objects_count: 2,
            length: Some(153.25),
        }],
        ..Default::default()
    });
    let (status, body) = post_dma(store, unit_square().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["response"]["aquagis_points"],
        json!([{"aquagis_type": "valve", "objects_count": 4}])
    );
    assert_eq!(
        body["response"]["aquagis_line_within"],
        json!([{"aquagis_type": "pipe", "objects_count": 2, "length": 153.25}])
    );
}

#[tokio::test]
async fn test_point_geometry_rejected_with_200() {
    let store = Arc::new(MemoryStore::default());
    let request = json!({"geom_type": "Point", "coordinates": [[[42.7, 23.3]]]});
    let (status, body) = post_dma(store.clone(), request.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["errors"],
        json!([{
            "geom_type": "Point",
            "kind": "input",
            "msg": "Point is not suitable for DMA zone extraction"
        }])
    );
    assert_eq!(body["response"]["aquagis_points"], json!([]));
    assert!(store.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_geom_type_and_empty_coordinates() {
    for (request, field) in [
        (json!({"coordinates": [[[0, 0], [0, 1], [1, 1], [0, 0]]]}), "geom_type"),
        (json!({"geom_type": "Polygon", "coordinates": []}), "coordinates"),
    ] {
        let store = Arc::new(MemoryStore::default());
        let (status, body) = post_dma(store, request.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["errors"][0]["kind"], "input");
        assert_eq!(body["errors"][0]["field"], field);
        assert_eq!(body["response"]["aquagis_line_within"], json!([]));
    }
}

#[tokio::test]
async fn test_query_failure_keeps_points() {
    let store = Arc::new(MemoryStore {
        points: vec![AssetSummary {
            aquagis_type: Some("hydrant".into()),
            objects_count: 1,
            length: None,
        }],
        fail_on: Some(QueryKind::LinesIntersecting),
        ..Default::default()
    });
    let (status, body) = post_dma(store.clone(), unit_square().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["aquagis_points"][0]["aquagis_type"], "hydrant");
    assert_eq!(body["response"]["aquagis_line_intersection"], json!([]));
    assert_eq!(
        body["errors"],
        json!([{
            "query": "lines_intersecting",
            "kind": "query_execution",
            "error": "Store unavailable: lines_intersecting exploded"
        }])
    );
    assert_eq!(
        *store.calls.lock().unwrap(),
        vec![QueryKind::PointsWithin, QueryKind::LinesIntersecting]
    );
}

#[tokio::test]
async fn test_non_json_body() {
    let store = Arc::new(MemoryStore::default());
    let (status, body) = post_dma(store, "not json at all").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"], Value::Null);
    assert_eq!(body["errors"][0]["kind"], "input");
    assert_exec_time(&body);
}

#[tokio::test]
async fn test_healthcheck() {
    let (status, body) = get(Arc::new(MemoryStore::default()), "/healthcheck").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"service": "working"}));
}

#[tokio::test]
async fn test_check_and_index() {
    let store = Arc::new(MemoryStore::default());

    let (status, body) = get(store.clone(), "/v1/check").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["service"].is_string());
    assert!(body["author"].is_string());

    let (status, body) = get(store, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["version_date"], VERSION_DATE);
    assert_eq!(body["current_time"].as_str().unwrap().len(), 15);
    assert!(body["sys_cpu_count"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn test_get_on_dma_route_not_allowed() {
    let resp = app(Arc::new(MemoryStore::default()))
        .oneshot(
            Request::builder()
                .uri("/get_dma_resources")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}
