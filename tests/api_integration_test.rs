use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use httpmock::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use weather_sync::api::{build_router, AppState};
use weather_sync::core::fetcher::{WeatherFetcher, CURRENT_OBSERVATION_PATH};
use weather_sync::domain::model::Observation;
use weather_sync::{
    LocalStorage, PersistenceMirror, RestDocumentStore, StationPipeline, StationState, SyncEngine,
};

struct TestApp {
    router: Router,
    state: AppState,
    _data_dir: TempDir,
}

fn test_app(provider_url: &str, remote_url: Option<&str>, history: Vec<Observation>) -> TestApp {
    let data_dir = TempDir::new().unwrap();
    let mirror = PersistenceMirror::new(
        LocalStorage::new(data_dir.path()),
        remote_url.map(RestDocumentStore::new),
    );
    let fetcher = WeatherFetcher::new(provider_url, "ISANTI245", "test-key");
    let engine = SyncEngine::new(
        StationPipeline::new(fetcher, mirror),
        Arc::new(StationState::with_history(history)),
    );
    let state = AppState::new(Arc::new(engine), "ISANTI245");

    TestApp {
        router: build_router(state.clone(), None),
        state,
        _data_dir: data_dir,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(router, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_json(router: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(router, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn observation(timestamp: &str, temp: i64) -> Observation {
    serde_json::from_value(json!({"temp": temp, "timestamp": timestamp})).unwrap()
}

#[tokio::test]
async fn test_latest_is_not_found_when_history_empty() {
    let app = test_app("http://127.0.0.1:9", None, vec![]);

    let (status, body) = get_json(&app.router, "/latest").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_latest_returns_last_appended_record() {
    let history = vec![
        observation("2025-03-01 10:00:00", 20),
        observation("2025-03-01 10:15:00", 21),
    ];
    let app = test_app("http://127.0.0.1:9", None, history);

    let (status, body) = get_json(&app.router, "/latest").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["timestamp"], "2025-03-01 10:15:00");
    assert_eq!(body["data"]["temp"], 21);
}

#[tokio::test]
async fn test_records_and_health_counters() {
    let history = vec![
        observation("2025-03-01 10:00:00", 20),
        observation("2025-03-01 10:15:00", 21),
    ];
    let app = test_app("http://127.0.0.1:9", None, history);

    let (status, body) = get_json(&app.router, "/records").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, health) = get_json(&app.router, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["total_records"], 2);
    assert_eq!(health["total_flood_reports"], 0);
    assert_eq!(health["station"], "ISANTI245");
}

/// 供應商無法連線時：500 錯誤封包，歷史不變
#[tokio::test]
async fn test_refresh_with_unreachable_provider() {
    let history = vec![observation("2025-03-01 10:00:00", 20)];
    let app = test_app("http://127.0.0.1:9", None, history.clone());

    let (status, body) = post_json(&app.router, "/refresh", "").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(app.state.station().history().await, history);
}

#[tokio::test]
async fn test_refresh_then_download() {
    let provider = MockServer::start();
    let provider_mock = provider.mock(|when, then| {
        when.method(GET).path(CURRENT_OBSERVATION_PATH);
        then.status(200).json_body(json!({
            "observations": [{"humidity": 80, "metric": {"temp": 22.5, "pressure": 1012}}]
        }));
    });
    let app = test_app(&provider.base_url(), None, vec![]);

    // 尚未寫入彙整檔
    let request = Request::builder().uri("/download").body(Body::empty()).unwrap();
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get_json(&app.router, "/refresh").await;
    provider_mock.assert();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["pressure"], 1012);
    assert_eq!(body["data"]["heatIndex"], Value::Null);

    let request = Request::builder().uri("/download").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("attachment"));
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let saved: Vec<Observation> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(saved.len(), 1);
}

#[tokio::test]
async fn test_flood_reports_get_sequential_ids() {
    let remote = MockServer::start();
    let remote_mock = remote.mock(|when, then| {
        when.method(POST).path("/reportes_inundacion.json");
        then.status(200).json_body(json!({"name": "-Nxyz"}));
    });
    let app = test_app("http://127.0.0.1:9", Some(&remote.base_url()), vec![]);

    let (status, first) = post_json(
        &app.router,
        "/report_flood",
        r#"{"zone": "Barrio Norte", "level": "high"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = post_json(&app.router, "/report_flood", r#"{"zone": "Centro", "id": 99}"#).await;

    remote_mock.assert_hits(2);
    assert_eq!(first["data"]["id"], 1);
    assert_eq!(first["data"]["zone"], "Barrio Norte");
    assert!(first["data"]["timestamp"].is_string());
    assert_eq!(second["data"]["id"], 2);

    let (_, list) = get_json(&app.router, "/flood_history").await;
    assert_eq!(list["total"], 2);
    assert_eq!(list["data"][0]["id"], 1);
    assert_eq!(list["data"][1]["id"], 2);
}

#[tokio::test]
async fn test_flood_report_remote_failure_still_succeeds() {
    let remote = MockServer::start();
    remote.mock(|when, then| {
        when.method(POST).path("/reportes_inundacion.json");
        then.status(500);
    });
    let app = test_app("http://127.0.0.1:9", Some(&remote.base_url()), vec![]);

    let (status, body) = post_json(&app.router, "/report_flood", r#"{"zone": "Sur"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], 1);
}

#[tokio::test]
async fn test_flood_report_requires_json_object() {
    let app = test_app("http://127.0.0.1:9", None, vec![]);

    let (status, body) = post_json(&app.router, "/report_flood", "[1, 2, 3]").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (status, _) = post_json(&app.router, "/report_flood", "{oops").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(app.state.station().flood_reports().await.is_empty());
}

#[tokio::test]
async fn test_download_reports_not_found_and_read_failures() {
    let app = test_app("http://127.0.0.1:9", None, vec![]);

    let (status, body) = get_json(&app.router, "/download").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "No JSON file available");

    // 讀取失敗但檔案存在時不是 404
    std::fs::create_dir(app._data_dir.path().join("records.json")).unwrap();
    let (status, body) = get_json(&app.router, "/download").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
}
