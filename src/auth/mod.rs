//! Sibling service: user login and e-mailed flood reports.

pub mod handlers;
pub mod mailer;
pub mod token;
pub mod users;

use crate::api::cors_layer;
use crate::auth::mailer::MailSettings;
use crate::auth::token::TokenIssuer;
use crate::auth::users::UserStore;
use crate::config::AuthConfig;
use crate::utils::error::Result;
use axum::routing::{get, post};
use axum::Router;
use reqwest::Client;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AuthState {
    pub users: UserStore,
    pub tokens: TokenIssuer,
    pub mail: MailSettings,
    pub client: Client,
}

impl AuthState {
    pub fn new(users: UserStore, config: &AuthConfig) -> Result<Self> {
        Ok(Self {
            users,
            tokens: TokenIssuer::new(config.jwt_secret()?, config.jwt_expiry_minutes),
            mail: MailSettings {
                api_key: config.sendgrid_api_key.clone(),
                from: config.mail_from.clone(),
                recipient: config.flood_report_recipient.clone(),
                base_url: config.sendgrid_base_url.clone(),
            },
            client: Client::new(),
        })
    }
}

pub fn build_router(state: AuthState, allowed_origin: Option<&str>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/login", post(handlers::login))
        .route("/flood-report", post(handlers::send_flood_report))
        .layer(cors_layer(allowed_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
