use crate::api::error::ApiError;
use crate::auth::mailer::{FloodEmailRequest, SendGridMailer};
use crate::auth::users::verify_password;
use crate::auth::AuthState;
use crate::domain::model::local_timestamp;
use crate::utils::validation::validate_username;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn login(
    State(state): State<AuthState>,
    body: Bytes,
) -> Result<Json<TokenResponse>, ApiError> {
    let req: LoginRequest = parse_body(&body)?;
    validate_username(&req.username)?;

    let user = state
        .users
        .find(&req.username)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !verify_password(&req.password, &user.password_hash) {
        tracing::warn!(username = %user.username, "Login rejected: wrong password");
        return Err(ApiError::Unauthorized("Incorrect password".to_string()));
    }
    if !user.is_active {
        tracing::warn!(username = %user.username, "Login rejected: inactive user");
        return Err(ApiError::Forbidden("User is inactive".to_string()));
    }

    let access_token = state.tokens.issue(&user.username)?;
    tracing::info!(username = %user.username, "Login succeeded");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: state.tokens.expires_in_secs(),
    }))
}

pub async fn send_flood_report(
    State(state): State<AuthState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let claims = state.tokens.verify_header(authorization)?;

    let req: FloodEmailRequest = parse_body(&body)?;
    req.validate()?;

    // 設定不完整時不嘗試寄送
    let mailer = SendGridMailer::from_settings(&state.mail, state.client.clone())?;

    let reported_at = local_timestamp();
    mailer
        .send(&req.subject(), &req.compose(&claims.sub, &reported_at))
        .await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Flood report sent",
        "reported_by": claims.sub,
        "reported_at": reported_at,
    })))
}
