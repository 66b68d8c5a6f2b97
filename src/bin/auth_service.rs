use clap::Parser;
use weather_sync::api;
use weather_sync::auth::{self, users::UserStore, AuthState};
use weather_sync::utils::{logger, validation::Validate};
use weather_sync::AuthConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AuthConfig::parse();

    logger::init(config.verbose, config.log_json);
    tracing::info!("Starting auth-service v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let users = UserStore::connect(&config.database_url).await?;
    users.migrate().await?;

    match (&config.seed_username, &config.seed_password) {
        (Some(username), Some(password)) => {
            if users.seed(username, password, config.seed_active).await? {
                tracing::info!(username = %username, "Seeded user");
            } else {
                tracing::debug!(username = %username, "Seed user already present");
            }
        }
        (Some(_), None) | (None, Some(_)) => {
            tracing::warn!("SEED_USERNAME and SEED_PASSWORD must both be set; skipping seed");
        }
        (None, None) => {}
    }

    if config.sendgrid_api_key.is_none()
        || config.mail_from.is_none()
        || config.flood_report_recipient.is_none()
    {
        tracing::warn!("E-mail settings incomplete; /flood-report will answer 500");
    }

    let state = AuthState::new(users, &config)?;
    let router = auth::build_router(state, config.allowed_origin.as_deref());

    tokio::select! {
        result = api::serve(router, config.listen_addr()) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
