use crate::api::error::ApiError;
use crate::api::AppState;
use crate::core::mirror::CONSOLIDATED_FILE;
use crate::domain::ports::Storage;
use crate::utils::error::SyncError;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let summary = state.station().summary().await;
    Json(json!({
        "status": "ok",
        "message": "Weather sync API running",
        "station": state.station_id,
        "last_updated": summary.last_updated,
        "total_records": summary.total_records,
        "total_flood_reports": summary.total_flood_reports,
    }))
}

/// Runs a sync cycle immediately. The cycle keeps going if the client
/// disconnects.
pub async fn refresh(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let record = state
        .engine
        .run_cycle_detached()
        .await
        .map_err(|e| ApiError::Internal(format!("Could not obtain valid data: {}", e)))?;

    Ok(Json(json!({
        "status": "success",
        "message": "Data updated",
        "data": record,
    })))
}

pub async fn list_records(State(state): State<AppState>) -> Json<Value> {
    let history = state.station().history().await;
    Json(json!({
        "status": "success",
        "total": history.len(),
        "data": history,
    }))
}

pub async fn latest_record(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let record = state
        .station()
        .latest()
        .await
        .ok_or_else(|| ApiError::NotFound("No records available".to_string()))?;

    Ok(Json(json!({
        "status": "success",
        "data": record,
    })))
}

pub async fn download_records(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let storage = state.engine.pipeline().mirror().storage();
    let data = match storage.read_file(CONSOLIDATED_FILE).await {
        Ok(data) => data,
        Err(SyncError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound("No JSON file available".to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", CONSOLIDATED_FILE),
            ),
        ],
        data,
    ))
}

pub async fn flood_history(State(state): State<AppState>) -> Json<Value> {
    let reports = state.station().flood_reports().await;
    Json(json!({
        "status": "success",
        "total": reports.len(),
        "data": reports,
    }))
}

pub async fn report_flood(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let payload = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            return Err(ApiError::BadRequest(
                "Flood report must be a JSON object".to_string(),
            ))
        }
        Err(e) => return Err(ApiError::BadRequest(format!("Invalid JSON body: {}", e))),
    };

    let report = state.station().add_flood_report(payload).await;
    tracing::info!(id = report.id, "Flood report received");

    // 遠端失敗不影響回應
    state.engine.pipeline().mirror_flood_report(&report).await;

    Ok(Json(json!({
        "status": "success",
        "message": "Flood report registered",
        "data": report,
    })))
}
