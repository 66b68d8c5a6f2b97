use crate::utils::error::{Result, SyncError};
use crate::utils::validation::validate_required_field;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

pub const SEND_PATH: &str = "/v3/mail/send";

/// Fields a reporter submits with a flood e-mail.
#[derive(Debug, Clone, Deserialize)]
pub struct FloodEmailRequest {
    pub location: String,
    pub description: String,
    #[serde(default)]
    pub water_level: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl FloodEmailRequest {
    pub fn validate(&self) -> Result<()> {
        if self.location.trim().is_empty() {
            return Err(SyncError::validation("location is required"));
        }
        if self.description.trim().is_empty() {
            return Err(SyncError::validation("description is required"));
        }
        Ok(())
    }

    pub fn subject(&self) -> String {
        format!("Flood report: {}", self.location.trim())
    }

    /// Plain-text body. Includes a map link when both coordinates are given.
    pub fn compose(&self, reporter: &str, reported_at: &str) -> String {
        let mut lines = vec![
            format!("Flood report submitted by {}", reporter),
            format!("Reported at: {}", reported_at),
            String::new(),
            format!("Location: {}", self.location.trim()),
            format!("Description: {}", self.description.trim()),
        ];
        if let Some(level) = self.water_level.as_deref().filter(|l| !l.trim().is_empty()) {
            lines.push(format!("Water level: {}", level.trim()));
        }
        if let (Some(lat), Some(lng)) = (self.latitude, self.longitude) {
            lines.push(format!("Coordinates: {}, {}", lat, lng));
            lines.push(format!("Map: https://www.google.com/maps?q={},{}", lat, lng));
        }
        lines.join("\n")
    }
}

/// SendGrid settings as loaded from the environment. Everything is optional
/// at startup and checked when a message is about to be sent.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub api_key: Option<String>,
    pub from: Option<String>,
    pub recipient: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct SendGridMailer {
    api_key: String,
    from: String,
    recipient: String,
    base_url: String,
    client: Client,
}

impl SendGridMailer {
    /// Fails with `MissingConfig` before any network call when a setting is
    /// absent.
    pub fn from_settings(settings: &MailSettings, client: Client) -> Result<Self> {
        let api_key = validate_required_field("SENDGRID_API_KEY", &settings.api_key)?;
        let from = validate_required_field("MAIL_FROM", &settings.from)?;
        let recipient = validate_required_field("FLOOD_REPORT_RECIPIENT", &settings.recipient)?;

        Ok(Self {
            api_key: api_key.clone(),
            from: from.clone(),
            recipient: recipient.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let url = format!("{}{}", self.base_url, SEND_PATH);
        let payload = json!({
            "personalizations": [{"to": [{"email": self.recipient}]}],
            "from": {"email": self.from},
            "subject": subject,
            "content": [{"type": "text/plain", "value": body}],
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!("SendGrid rejected message ({}): {}", status, detail);
            return Err(SyncError::Http {
                status: status.as_u16(),
                url,
            });
        }

        tracing::info!(to = %self.recipient, "Flood report e-mail sent");
        Ok(())
    }
}
