use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_required_field, validate_url,
    Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

pub const DEFAULT_TOKEN_EXPIRY_MINUTES: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "auth-service")]
#[command(about = "Login and flood report e-mail service")]
pub struct AuthConfig {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://users.db?mode=rwc")]
    pub database_url: String,

    /// 必填；缺少時由 validate 回報
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    #[arg(long, env = "JWT_EXPIRY_MINUTES", default_value_t = DEFAULT_TOKEN_EXPIRY_MINUTES)]
    pub jwt_expiry_minutes: i64,

    #[arg(long, env = "SENDGRID_API_KEY", hide_env_values = true)]
    pub sendgrid_api_key: Option<String>,

    #[arg(long, env = "SENDGRID_BASE_URL", default_value = "https://api.sendgrid.com")]
    pub sendgrid_base_url: String,

    #[arg(long, env = "MAIL_FROM")]
    pub mail_from: Option<String>,

    /// Fixed address every flood report is sent to
    #[arg(long, env = "FLOOD_REPORT_RECIPIENT")]
    pub flood_report_recipient: Option<String>,

    #[arg(long, env = "SEED_USERNAME")]
    pub seed_username: Option<String>,

    #[arg(long, env = "SEED_PASSWORD", hide_env_values = true)]
    pub seed_password: Option<String>,

    #[arg(long, env = "SEED_ACTIVE", default_value_t = true, action = clap::ArgAction::Set)]
    pub seed_active: bool,

    #[arg(long, env = "ALLOWED_ORIGIN")]
    pub allowed_origin: Option<String>,

    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, env = "LOG_JSON", help = "Emit JSON log lines")]
    pub log_json: bool,
}

impl AuthConfig {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn jwt_secret(&self) -> Result<&str> {
        let secret = validate_required_field("JWT_SECRET", &self.jwt_secret)?;
        validate_non_empty_string("JWT_SECRET", secret)?;
        Ok(secret.as_str())
    }
}

impl Validate for AuthConfig {
    fn validate(&self) -> Result<()> {
        self.jwt_secret()?;
        validate_positive_number("jwt_expiry_minutes", self.jwt_expiry_minutes.max(0) as u64, 1)?;
        validate_url("sendgrid_base_url", &self.sendgrid_base_url)?;
        Ok(())
    }
}
